// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::RequireAdmin,
    // Importamos os models para referenciar no Swagger
    models::dashboard::DashboardSummary,
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo operacional do dia e da semana", body = DashboardSummary),
        (status = 401, description = "Sessão ausente ou expirada."),
        (status = 403, description = "Não autorizado")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary().await?;

    Ok((StatusCode::OK, Json(summary)))
}
