// src/handlers/checkins.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::RequireAdmin,
    models::checkin::{CheckinFilter, CheckinHistoryEntry},
};

// GET /api/admin/checkins?promoterId=&storeId=&dateFrom=&dateTo=
// Sem datas: últimos 7 dias até hoje.
#[utoipa::path(
    get,
    path = "/api/admin/checkins",
    tag = "Check-ins",
    params(CheckinFilter),
    responses((status = 200, description = "Histórico de check-ins, mais recentes primeiro", body = Vec<CheckinHistoryEntry>)),
    security(("session_cookie" = []))
)]
pub async fn checkin_history(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Query(filter): Query<CheckinFilter>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.checkin_service.history(&filter).await?;
    Ok(Json(entries))
}

// GET /api/admin/checkins/export
#[utoipa::path(
    get,
    path = "/api/admin/checkins/export",
    tag = "Check-ins",
    params(CheckinFilter),
    responses(
        (
            status = 200,
            description = "historico_checkins_<de>_a_<ate>.xlsx",
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ),
        (status = 404, description = "Nenhum dado encontrado para exportar com os filtros selecionados.")
    ),
    security(("session_cookie" = []))
)]
pub async fn checkin_export(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Query(filter): Query<CheckinFilter>,
) -> Result<impl IntoResponse, AppError> {
    app_state.checkin_service.export(&filter).await
}
