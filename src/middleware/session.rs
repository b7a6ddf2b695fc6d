// src/middleware/session.rs

use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::PostgresStore;

pub const SESSION_COOKIE_NAME: &str = "promo_session";

// 12h sem uso e a sessão expira
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Camada de sessão com o store no Postgres (a tabela é criada por `PostgresStore::migrate`).
pub fn create_session_layer(store: PostgresStore, secure: bool) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
