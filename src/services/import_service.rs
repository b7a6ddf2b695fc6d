// src/services/import_service.rs

use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        spreadsheet::{read_rows, require_columns, SheetRow},
    },
    db::{GroupRepository, StoreRepository, UserRepository},
    models::{
        promoter::{PromoterImportRow, StoreAssignment},
        store::StoreImportRow,
    },
    services::{auth::hash_password, promoter_service::default_password},
};

#[derive(Clone)]
pub struct ImportService {
    store_repo: StoreRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    pool: PgPool,
}

/// Quantas linhas foram gravadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
}

// =============================================================================
//  PARSE (puro, sem banco)
// =============================================================================

/// Linhas sem CNPJ ou sem razão social são puladas.
pub fn parse_store_rows(rows: &[SheetRow]) -> Vec<StoreImportRow> {
    rows.iter()
        .filter_map(|row| {
            let cnpj = row.get("CNPJ")?;
            let company_name = row.get("RAZAO_SOCIAL")?;
            Some(StoreImportRow {
                company_name: company_name.to_string(),
                cnpj: cnpj.to_string(),
                brand: row.get("BANDEIRA").map(str::to_owned),
                address: row.get("ENDERECO").map(str::to_owned),
                city: row.get("CIDADE").map(str::to_owned),
                state: row.get("UF").map(str::to_owned),
            })
        })
        .collect()
}

/// Agrupa as linhas por telefone (na ordem em que aparecem). O perfil vem da primeira linha
/// de cada telefone; cada linha contribui com uma associação: GRUPO tem prioridade sobre CNPJ_LOJA.
pub fn group_promoter_rows(rows: &[SheetRow]) -> Vec<PromoterImportRow> {
    let mut promoters: Vec<PromoterImportRow> = Vec::new();
    let mut index_by_phone: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(phone) = row.get("TELEFONE") else {
            continue;
        };

        let idx = *index_by_phone.entry(phone.to_string()).or_insert_with(|| {
            promoters.push(PromoterImportRow {
                phone: phone.to_string(),
                full_name: row.get("NOME").map(str::to_owned),
                cpf: row.get("CPF").map(str::to_owned),
                city: row.get("CIDADE").map(str::to_owned),
                state: row.get("UF").map(str::to_owned),
                assignments: Vec::new(),
            });
            promoters.len() - 1
        });

        let assignment = match (row.get("GRUPO"), row.get("CNPJ_LOJA")) {
            (Some(group), _) => Some(StoreAssignment::Group(group.to_string())),
            (None, Some(cnpj)) => Some(StoreAssignment::Cnpj(cnpj.to_string())),
            (None, None) => None,
        };
        if let Some(assignment) = assignment {
            promoters[idx].assignments.push(assignment);
        }
    }

    promoters
}

// =============================================================================
//  GRAVAÇÃO
// =============================================================================

impl ImportService {
    pub fn new(
        store_repo: StoreRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        pool: PgPool,
    ) -> Self {
        Self { store_repo, user_repo, group_repo, pool }
    }

    /// Upsert por CNPJ dentro do grupo escolhido. Tudo ou nada.
    pub async fn import_stores(
        &self,
        group_id: i32,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportSummary, AppError> {
        if self.group_repo.find(group_id).await?.is_none() {
            return Err(AppError::NotFound("Grupo não encontrado.".into()));
        }

        let rows = read_rows(bytes, file_name)?;
        require_columns(&rows, &["CNPJ"])?;
        let stores = parse_store_rows(&rows);

        let mut tx = self.pool.begin().await?;
        for store in &stores {
            self.store_repo
                .upsert_by_cnpj(&mut *tx, store, group_id)
                .await
                .map_err(as_spreadsheet_error)?;
        }
        tx.commit().await?;

        tracing::info!("📥 {} lojas importadas para o grupo {}", stores.len(), group_id);
        Ok(ImportSummary { imported: stores.len() })
    }

    /// Upsert por telefone; as associações de loja de cada promotora são substituídas.
    pub async fn import_promoters(&self, file_name: &str, bytes: &[u8]) -> Result<ImportSummary, AppError> {
        let rows = read_rows(bytes, file_name)?;
        require_columns(&rows, &["TELEFONE"])?;
        let promoters = group_promoter_rows(&rows);

        // Hash antes de abrir a transação: bcrypt é lento
        let mut hashes = Vec::with_capacity(promoters.len());
        for promoter in &promoters {
            hashes.push(hash_password(&default_password(&promoter.phone)).await?);
        }

        let mut tx = self.pool.begin().await?;
        for (promoter, password_hash) in promoters.iter().zip(&hashes) {
            let user_id = self
                .user_repo
                .upsert_promoter_by_phone(
                    &mut *tx,
                    &promoter.phone,
                    password_hash,
                    promoter.full_name.as_deref(),
                    promoter.cpf.as_deref(),
                    promoter.city.as_deref(),
                    promoter.state.as_deref(),
                )
                .await
                .map_err(as_spreadsheet_error)?;

            self.store_repo.clear_assignments(&mut tx, user_id).await?;

            for assignment in &promoter.assignments {
                let linked = match assignment {
                    StoreAssignment::Group(name) => {
                        self.store_repo.assign_group_by_name(&mut tx, user_id, name).await?
                    }
                    StoreAssignment::Cnpj(cnpj) => {
                        self.store_repo.assign_by_cnpj(&mut tx, user_id, cnpj).await?
                    }
                };
                if linked == 0 {
                    tracing::warn!("Importação: {:?} não corresponde a nenhuma loja", assignment);
                }
            }
        }
        tx.commit().await?;

        tracing::info!("📥 {} promotoras importadas", promoters.len());
        Ok(ImportSummary { imported: promoters.len() })
    }
}

// Falha de banco durante a importação vira mensagem de planilha com o texto cru do erro
fn as_spreadsheet_error(e: AppError) -> AppError {
    match e {
        AppError::DatabaseError(db_err) => AppError::Spreadsheet(db_err.to_string()),
        AppError::UniqueConstraintViolation(msg) => AppError::Spreadsheet(msg),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> SheetRow {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn store_rows_without_cnpj_are_skipped() {
        let rows = vec![
            row(&[("RAZAO_SOCIAL", "Mercado A"), ("CNPJ", "111"), ("UF", "SP")]),
            row(&[("RAZAO_SOCIAL", "Mercado B"), ("CNPJ", "")]),
            row(&[("RAZAO_SOCIAL", ""), ("CNPJ", "333")]),
        ];

        let stores = parse_store_rows(&rows);

        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].cnpj, "111");
        assert_eq!(stores[0].state.as_deref(), Some("SP"));
        assert_eq!(stores[0].brand, None);
    }

    #[test]
    fn promoter_rows_are_grouped_by_phone() {
        let rows = vec![
            row(&[("NOME", "Ana"), ("TELEFONE", "119"), ("CNPJ_LOJA", "111")]),
            row(&[("NOME", "Bia"), ("TELEFONE", "218"), ("GRUPO", "Norte"), ("CNPJ_LOJA", "222")]),
            row(&[("NOME", "Ana S."), ("TELEFONE", "119"), ("CNPJ_LOJA", "333")]),
            row(&[("NOME", "Sem telefone"), ("CNPJ_LOJA", "444")]),
        ];

        let promoters = group_promoter_rows(&rows);

        assert_eq!(promoters.len(), 2);
        assert_eq!(promoters[0].phone, "119");
        assert_eq!(promoters[0].full_name.as_deref(), Some("Ana"));
        assert_eq!(
            promoters[0].assignments,
            vec![
                StoreAssignment::Cnpj("111".into()),
                StoreAssignment::Cnpj("333".into())
            ]
        );
        assert_eq!(promoters[1].assignments, vec![StoreAssignment::Group("Norte".into())]);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let rows = vec![row(&[("RAZAO_SOCIAL", "Mercado A")])];
        let err = require_columns(&rows, &["CNPJ"]).unwrap_err();
        assert_eq!(err.to_string(), "Erro ao processar a planilha: coluna 'CNPJ' não encontrada");
    }
}
