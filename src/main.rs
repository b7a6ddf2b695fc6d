//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::EnvFilter;

use hub_backend::{
    config::{AppState, Config},
    middleware::session::create_session_layer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG sobrescreve o nível padrão)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    // Se a configuração ou o banco falharem, a aplicação não deve iniciar.
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Tabela de sessões do tower-sessions
    let session_store = PostgresStore::new(app_state.db_pool.clone());
    session_store
        .migrate()
        .await
        .context("Falha ao criar a tabela de sessões.")?;

    app_state
        .auth_service
        .ensure_master_user(&config.master_password)
        .await
        .context("Falha ao garantir o usuário master.")?;
    app_state
        .uploads
        .ensure_dir()
        .await
        .context("Falha ao criar o diretório de uploads.")?;

    let app = hub_backend::router(app_state)
        .layer(create_session_layer(session_store, config.cookie_secure))
        .layer(TraceLayer::new_for_http());

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;

    Ok(())
}
