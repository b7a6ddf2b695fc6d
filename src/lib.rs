// src/lib.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::services::ServeDir;
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc};

/// Monta todas as rotas da API. As camadas de sessão e trace ficam no `main`.
pub fn router(app_state: AppState) -> Router {
    // Rotas multipart: sem isto vale o padrão de 2 MiB do axum
    let upload_limit = DefaultBodyLimit::max(app_state.max_upload_bytes);

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me));

    // Rotas da promotora (RequirePromoter em cada handler)
    let promoter_routes = Router::new()
        .route("/stores", get(handlers::promoter::list_stores))
        .route("/report-form", get(handlers::promoter::report_form))
        .route(
            "/reports",
            post(handlers::promoter::submit_report).get(handlers::promoter::report_history),
        )
        .route(
            "/invoices",
            get(handlers::promoter::list_invoices)
                .post(handlers::promoter::submit_invoice)
                .layer(upload_limit),
        )
        .route(
            "/checkins",
            get(handlers::promoter::list_checkins)
                .post(handlers::promoter::submit_checkin)
                .layer(upload_limit),
        );

    // Rotas do administrador (RequireAdmin em cada handler)
    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::get_summary))
        // Grupos e campos
        .route(
            "/groups",
            get(handlers::groups::list_groups).post(handlers::groups::create_group),
        )
        .route(
            "/groups/{id}",
            get(handlers::groups::get_group).delete(handlers::groups::delete_group),
        )
        .route("/groups/{id}/fields", post(handlers::groups::add_field))
        .route("/fields/{id}", delete(handlers::groups::delete_field))
        // Lojas
        .route(
            "/stores",
            get(handlers::stores::list_stores).post(handlers::stores::create_store),
        )
        .route("/stores/import", post(handlers::stores::import_stores).layer(upload_limit))
        .route("/stores/export", get(handlers::stores::export_stores))
        .route(
            "/stores/{id}",
            get(handlers::stores::get_store).put(handlers::stores::update_store),
        )
        // Promotoras
        .route(
            "/promoters",
            get(handlers::promoters::list_promoters).post(handlers::promoters::create_promoter),
        )
        .route(
            "/promoters/import",
            post(handlers::promoters::import_promoters).layer(upload_limit),
        )
        .route("/promoters/export", get(handlers::promoters::export_promoters))
        .route(
            "/promoters/{id}",
            get(handlers::promoters::get_promoter).put(handlers::promoters::update_promoter),
        )
        .route(
            "/promoters/{id}/toggle-active",
            post(handlers::promoters::toggle_active),
        )
        // Relatórios
        .route("/reports/advanced", post(handlers::reports::advanced_report))
        .route("/reports/advanced/view", get(handlers::reports::advanced_report_view))
        .route("/reports/advanced/export", get(handlers::reports::advanced_report_export))
        .route("/reports/daily", get(handlers::reports::daily_reports))
        .route("/reports/daily/export", get(handlers::reports::daily_reports_export))
        // Check-ins
        .route("/checkins", get(handlers::checkins::checkin_history))
        .route("/checkins/export", get(handlers::checkins::checkin_export));

    let uploads = ServeDir::new(app_state.uploads.dir());

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/api/groups/{id}/fields", get(handlers::groups::group_fields))
        .nest("/api/auth", auth_routes)
        .nest("/api/promoter", promoter_routes)
        .nest("/api/admin", admin_routes)
        .nest_service("/uploads", uploads)
        .with_state(app_state)
}
