// src/services/store_service.rs

use crate::{
    common::{
        error::AppError,
        spreadsheet::{write_workbook, Cell, ExportFile},
        text::{clean, required},
    },
    db::StoreRepository,
    models::store::{AssignedStore, Store, StoreListEntry, StorePayload},
};

pub const STORE_EXPORT_HEADERS: [&str; 7] =
    ["RAZAO_SOCIAL", "CNPJ", "BANDEIRA", "ENDERECO", "CIDADE", "UF", "GRUPO"];

#[derive(Clone)]
pub struct StoreService {
    repo: StoreRepository,
}

const COMPANY_NAME_REQUIRED: &str = "Informe a razão social.";

fn normalize(payload: StorePayload) -> Result<StorePayload, AppError> {
    Ok(StorePayload {
        company_name: required(&payload.company_name, COMPANY_NAME_REQUIRED)?.to_string(),
        brand: clean(payload.brand),
        cnpj: clean(payload.cnpj),
        address: clean(payload.address),
        city: clean(payload.city),
        state: clean(payload.state),
        group_id: payload.group_id,
    })
}

impl StoreService {
    pub fn new(repo: StoreRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<StoreListEntry>, AppError> {
        self.repo.list_all().await
    }

    pub async fn get(&self, id: i32) -> Result<Store, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Loja não encontrada.".into()))
    }

    pub async fn create(&self, payload: StorePayload) -> Result<Store, AppError> {
        let store = self.repo.create(&normalize(payload)?).await?;
        tracing::info!("🏪 Loja '{}' cadastrada", store.company_name);
        Ok(store)
    }

    pub async fn update(&self, id: i32, payload: StorePayload) -> Result<Store, AppError> {
        self.repo
            .update(id, &normalize(payload)?)
            .await?
            .ok_or_else(|| AppError::NotFound("Loja não encontrada.".into()))
    }

    /// Lojas da promotora logada.
    pub async fn assigned(&self, user_id: i32) -> Result<Vec<AssignedStore>, AppError> {
        self.repo.list_assigned(user_id).await
    }

    /// Mesmo layout da importação (mais a coluna GRUPO).
    pub async fn export(&self) -> Result<ExportFile, AppError> {
        let stores = self.repo.export_stores().await?;

        let headers: Vec<String> = STORE_EXPORT_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Vec<Cell>> = stores
            .into_iter()
            .map(|s| {
                vec![
                    Cell::Text(s.company_name),
                    Cell::from(s.cnpj),
                    Cell::from(s.brand),
                    Cell::from(s.address),
                    Cell::from(s.city),
                    Cell::from(s.state),
                    Cell::from(s.group_name),
                ]
            })
            .collect();

        Ok(ExportFile {
            file_name: "lojas_export.xlsx".into(),
            bytes: write_workbook("Lojas", &headers, &rows)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_become_null() {
        let payload = StorePayload {
            company_name: "  Mercado Central ".into(),
            brand: Some("".into()),
            cnpj: Some(" 123 ".into()),
            address: None,
            city: Some("  ".into()),
            state: Some("SP".into()),
            group_id: Some(1),
        };

        let normalized = normalize(payload).unwrap();

        assert_eq!(normalized.company_name, "Mercado Central");
        assert_eq!(normalized.brand, None);
        assert_eq!(normalized.cnpj.as_deref(), Some("123"));
        assert_eq!(normalized.city, None);
    }

    #[test]
    fn whitespace_company_name_is_rejected() {
        let payload = StorePayload {
            company_name: "   ".into(),
            brand: None,
            cnpj: Some("12345678000190".into()),
            address: None,
            city: None,
            state: None,
            group_id: None,
        };

        let err = normalize(payload).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == COMPANY_NAME_REQUIRED));
    }
}
