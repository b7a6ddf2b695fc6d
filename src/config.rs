// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::uploads::UploadStore,
    db::{
        CheckinRepository, DashboardRepository, GroupRepository, InvoiceRepository,
        ReportRepository, StoreRepository, UserRepository,
    },
    services::{
        AuthService, CheckinService, DashboardService, GroupService, ImportService,
        InvoiceService, PromoterService, ReportService, StoreService,
    },
};

// ---
// Variáveis de ambiente
// ---

/// Limite de corpo das rotas multipart (fotos de nota/check-in e planilhas).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub upload_dir: String,
    pub master_password: String,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "static/uploads".into()),
            master_password: env::var("MASTER_PASSWORD").unwrap_or_else(|_| "admin".into()),
            cookie_secure: env::var("COOKIE_SECURE").map(|v| parse_flag(&v)).unwrap_or(false),
            max_upload_bytes: match env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => parse_byte_limit(&raw)?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_byte_limit(raw: &str) -> anyhow::Result<usize> {
    let bytes: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("MAX_UPLOAD_BYTES inválido: {raw}"))?;
    anyhow::ensure!(bytes > 0, "MAX_UPLOAD_BYTES deve ser maior que zero");
    Ok(bytes)
}

// ---
// Estado compartilhado
// ---

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub uploads: UploadStore,
    pub max_upload_bytes: usize,
    pub auth_service: AuthService,
    pub report_service: ReportService,
    pub group_service: GroupService,
    pub store_service: StoreService,
    pub promoter_service: PromoterService,
    pub import_service: ImportService,
    pub invoice_service: InvoiceService,
    pub checkin_service: CheckinService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let mut state = Self::with_pool(db_pool, UploadStore::new(&config.upload_dir));
        state.max_upload_bytes = config.max_upload_bytes;
        Ok(state)
    }

    /// Monta o gráfico de dependências sobre um pool já aberto (usado também nos testes).
    pub fn with_pool(db_pool: PgPool, uploads: UploadStore) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let store_repo = StoreRepository::new(db_pool.clone());
        let group_repo = GroupRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let checkin_repo = CheckinRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        Self {
            auth_service: AuthService::new(user_repo.clone(), db_pool.clone()),
            report_service: ReportService::new(
                report_repo,
                store_repo.clone(),
                group_repo.clone(),
                db_pool.clone(),
            ),
            group_service: GroupService::new(group_repo.clone(), db_pool.clone()),
            store_service: StoreService::new(store_repo.clone()),
            promoter_service: PromoterService::new(
                user_repo.clone(),
                store_repo.clone(),
                db_pool.clone(),
            ),
            import_service: ImportService::new(
                store_repo.clone(),
                user_repo,
                group_repo,
                db_pool.clone(),
            ),
            invoice_service: InvoiceService::new(invoice_repo, store_repo.clone(), uploads.clone()),
            checkin_service: CheckinService::new(checkin_repo, store_repo, uploads.clone()),
            dashboard_service: DashboardService::new(dashboard_repo),
            uploads,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_truthy_values() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn upload_limit_must_be_a_positive_number() {
        assert_eq!(parse_byte_limit(" 5242880 ").unwrap(), 5 * 1024 * 1024);
        assert!(parse_byte_limit("0").is_err());
        assert!(parse_byte_limit("20MB").is_err());
        assert!(DEFAULT_MAX_UPLOAD_BYTES > 2 * 1024 * 1024);
    }
}
