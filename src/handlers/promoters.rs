// src/handlers/promoters.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        uploads::{allowed_extension, MultipartForm, SPREADSHEET_EXTENSIONS},
    },
    config::AppState,
    middleware::auth::RequireAdmin,
    models::{
        promoter::{PromoterDetail, PromoterPayload, PromoterSummary, ToggleActiveResponse},
        MessageResponse,
    },
};

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PromoterImportForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

// =============================================================================
//  CADASTRO
// =============================================================================

// GET /api/admin/promoters
#[utoipa::path(
    get,
    path = "/api/admin/promoters",
    tag = "Promotoras",
    responses((status = 200, description = "Promotoras com o total de lojas", body = Vec<PromoterSummary>)),
    security(("session_cookie" = []))
)]
pub async fn list_promoters(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let promoters = app_state.promoter_service.list().await?;
    Ok(Json(promoters))
}

// GET /api/admin/promoters/{id}
#[utoipa::path(
    get,
    path = "/api/admin/promoters/{id}",
    tag = "Promotoras",
    params(("id" = i32, Path, description = "ID da promotora")),
    responses(
        (status = 200, description = "Promotora e lojas associadas", body = PromoterDetail),
        (status = 404, description = "Promotora não encontrada.")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_promoter(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let promoter = app_state.promoter_service.get(id).await?;
    Ok(Json(promoter))
}

// POST /api/admin/promoters
// A senha inicial é "hub@<telefone>".
#[utoipa::path(
    post,
    path = "/api/admin/promoters",
    tag = "Promotoras",
    request_body = PromoterPayload,
    responses(
        (status = 201, description = "Promotora cadastrada", body = PromoterDetail),
        (status = 409, description = "Telefone já cadastrado"),
        (status = 422, description = "Selecione pelo menos uma loja para associar.")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_promoter(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<PromoterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let promoter = app_state.promoter_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(promoter)))
}

// PUT /api/admin/promoters/{id}
#[utoipa::path(
    put,
    path = "/api/admin/promoters/{id}",
    tag = "Promotoras",
    params(("id" = i32, Path, description = "ID da promotora")),
    request_body = PromoterPayload,
    responses(
        (status = 200, description = "Promotora atualizada; lojas substituídas", body = PromoterDetail),
        (status = 404, description = "Promotora não encontrada."),
        (status = 409, description = "Telefone já cadastrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_promoter(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(payload): Json<PromoterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let promoter = app_state.promoter_service.update(id, payload).await?;
    Ok(Json(promoter))
}

// POST /api/admin/promoters/{id}/toggle-active
#[utoipa::path(
    post,
    path = "/api/admin/promoters/{id}/toggle-active",
    tag = "Promotoras",
    params(("id" = i32, Path, description = "ID da promotora")),
    responses(
        (status = 200, description = "Novo estado da promotora", body = ToggleActiveResponse),
        (status = 404, description = "Promotora não encontrada.")
    ),
    security(("session_cookie" = []))
)]
pub async fn toggle_active(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.promoter_service.toggle_active(id).await?;
    Ok(Json(status))
}

// =============================================================================
//  PLANILHAS
// =============================================================================

// POST /api/admin/promoters/import
#[utoipa::path(
    post,
    path = "/api/admin/promoters/import",
    tag = "Promotoras",
    request_body(content = PromoterImportForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Promotoras importadas", body = MessageResponse),
        (status = 400, description = "Arquivo ausente ou planilha inválida")
    ),
    security(("session_cookie" = []))
)]
pub async fn import_promoters(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("Nenhum arquivo selecionado.".into()))?;
    allowed_extension(&file.file_name, SPREADSHEET_EXTENSIONS)?;

    let summary = app_state
        .import_service
        .import_promoters(&file.file_name, &file.bytes)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "{} promotoras importadas/atualizadas com sucesso!",
        summary.imported
    ))))
}

// GET /api/admin/promoters/export
#[utoipa::path(
    get,
    path = "/api/admin/promoters/export",
    tag = "Promotoras",
    responses((
        status = 200,
        description = "promotoras_export.xlsx (uma linha por loja associada)",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    )),
    security(("session_cookie" = []))
)]
pub async fn export_promoters(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    app_state.promoter_service.export().await
}
