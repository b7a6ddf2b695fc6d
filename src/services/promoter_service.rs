// src/services/promoter_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        spreadsheet::{write_workbook, Cell, ExportFile},
        text::{clean, required},
    },
    db::{user_repo::NewUser, StoreRepository, UserRepository},
    models::{
        auth::UserRole,
        promoter::{PromoterDetail, PromoterPayload, PromoterSummary, ToggleActiveResponse},
    },
    services::auth::hash_password,
};

pub const PROMOTER_EXPORT_HEADERS: [&str; 7] =
    ["NOME", "CPF", "TELEFONE", "CIDADE", "UF", "CNPJ_LOJA", "GRUPO"];

const PROMOTER_NOT_FOUND: &str = "Promotora não encontrada.";
const NAME_AND_PHONE_REQUIRED: &str = "Nome e telefone são obrigatórios.";

/// Senha inicial de toda promotora criada pelo sistema.
pub fn default_password(phone: &str) -> String {
    format!("hub@{}", phone)
}

#[derive(Clone)]
pub struct PromoterService {
    user_repo: UserRepository,
    store_repo: StoreRepository,
    pool: PgPool,
}

impl PromoterService {
    pub fn new(user_repo: UserRepository, store_repo: StoreRepository, pool: PgPool) -> Self {
        Self { user_repo, store_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<PromoterSummary>, AppError> {
        self.user_repo.list_promoters().await
    }

    pub async fn get(&self, id: i32) -> Result<PromoterDetail, AppError> {
        let user = self
            .user_repo
            .find_promoter(id)
            .await?
            .ok_or_else(|| AppError::NotFound(PROMOTER_NOT_FOUND.into()))?;
        let store_ids = self.store_repo.assigned_store_ids(id).await?;

        Ok(PromoterDetail {
            id: user.id,
            full_name: user.full_name,
            cpf: user.cpf,
            phone: user.phone,
            city: user.city,
            state: user.state,
            active: user.active,
            store_ids,
        })
    }

    /// Cadastra a promotora (login = telefone, senha padrão) já associada às lojas.
    pub async fn create(&self, payload: PromoterPayload) -> Result<PromoterDetail, AppError> {
        if payload.store_ids.is_empty() {
            return Err(AppError::Warning("Selecione pelo menos uma loja para associar.".into()));
        }

        let full_name = required(&payload.full_name, NAME_AND_PHONE_REQUIRED)?;
        let phone = required(&payload.phone, NAME_AND_PHONE_REQUIRED)?;
        let cpf = clean(payload.cpf);
        let city = clean(payload.city);
        let state = clean(payload.state);

        let password_hash = hash_password(&default_password(phone)).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                NewUser {
                    username: phone,
                    password_hash: &password_hash,
                    role: UserRole::Promoter,
                    full_name: Some(full_name),
                    cpf: cpf.as_deref(),
                    phone: Some(phone),
                    city: city.as_deref(),
                    state: state.as_deref(),
                },
            )
            .await?;

        for store_id in &payload.store_ids {
            self.store_repo.assign(&mut tx, user.id, *store_id).await?;
        }

        tx.commit().await?;

        tracing::info!("👩 Promotora {} cadastrada ({} lojas)", user.id, payload.store_ids.len());
        self.get(user.id).await
    }

    /// Atualiza o perfil e substitui as associações de loja.
    pub async fn update(&self, id: i32, payload: PromoterPayload) -> Result<PromoterDetail, AppError> {
        let full_name = required(&payload.full_name, NAME_AND_PHONE_REQUIRED)?;
        let phone = required(&payload.phone, NAME_AND_PHONE_REQUIRED)?;
        let cpf = clean(payload.cpf);
        let city = clean(payload.city);
        let state = clean(payload.state);

        let mut tx = self.pool.begin().await?;

        let updated = self
            .user_repo
            .update_promoter(
                &mut *tx,
                id,
                full_name,
                cpf.as_deref(),
                phone,
                city.as_deref(),
                state.as_deref(),
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound(PROMOTER_NOT_FOUND.into()));
        }

        self.store_repo.clear_assignments(&mut tx, id).await?;
        for store_id in &payload.store_ids {
            self.store_repo.assign(&mut tx, id, *store_id).await?;
        }

        tx.commit().await?;
        self.get(id).await
    }

    pub async fn toggle_active(&self, id: i32) -> Result<ToggleActiveResponse, AppError> {
        let active = self
            .user_repo
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::NotFound(PROMOTER_NOT_FOUND.into()))?;

        tracing::info!("🔁 Promotora {} agora está {}", id, if active { "ativa" } else { "inativa" });
        Ok(ToggleActiveResponse { id, active })
    }

    /// Uma linha por loja associada; o arquivo pode ser reimportado.
    pub async fn export(&self) -> Result<ExportFile, AppError> {
        let promoters = self.user_repo.export_promoters().await?;

        let headers: Vec<String> = PROMOTER_EXPORT_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Vec<Cell>> = promoters
            .into_iter()
            .map(|p| {
                vec![
                    Cell::from(p.full_name),
                    Cell::from(p.cpf),
                    Cell::from(p.phone),
                    Cell::from(p.city),
                    Cell::from(p.state),
                    Cell::from(p.store_cnpj),
                    Cell::from(p.group_name),
                ]
            })
            .collect();

        Ok(ExportFile {
            file_name: "promotoras_export.xlsx".into(),
            bytes: write_workbook("Promotoras", &headers, &rows)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_password_uses_phone() {
        assert_eq!(default_password("11999998888"), "hub@11999998888");
    }
}
