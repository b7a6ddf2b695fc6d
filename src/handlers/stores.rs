// src/handlers/stores.rs

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
        store::{Store, StoreListEntry, StorePayload},
        MessageResponse,
    },
};

#[derive(ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct StoreImportForm {
    group_id: i32,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

// GET /api/admin/stores
#[utoipa::path(
    get,
    path = "/api/admin/stores",
    tag = "Lojas",
    responses((status = 200, description = "Lojas ordenadas pela razão social", body = Vec<StoreListEntry>)),
    security(("session_cookie" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let stores = app_state.store_service.list().await?;
    Ok(Json(stores))
}

// GET /api/admin/stores/{id}
#[utoipa::path(
    get,
    path = "/api/admin/stores/{id}",
    tag = "Lojas",
    params(("id" = i32, Path, description = "ID da loja")),
    responses(
        (status = 200, description = "Loja", body = Store),
        (status = 404, description = "Loja não encontrada.")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store_service.get(id).await?;
    Ok(Json(store))
}

// POST /api/admin/stores
#[utoipa::path(
    post,
    path = "/api/admin/stores",
    tag = "Lojas",
    request_body = StorePayload,
    responses(
        (status = 201, description = "Loja cadastrada", body = Store),
        (status = 409, description = "CNPJ já cadastrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<StorePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let store = app_state.store_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

// PUT /api/admin/stores/{id}
#[utoipa::path(
    put,
    path = "/api/admin/stores/{id}",
    tag = "Lojas",
    params(("id" = i32, Path, description = "ID da loja")),
    request_body = StorePayload,
    responses(
        (status = 200, description = "Loja atualizada", body = Store),
        (status = 404, description = "Loja não encontrada."),
        (status = 409, description = "CNPJ já cadastrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_store(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(payload): Json<StorePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let store = app_state.store_service.update(id, payload).await?;
    Ok(Json(store))
}

// POST /api/admin/stores/import
#[utoipa::path(
    post,
    path = "/api/admin/stores/import",
    tag = "Lojas",
    request_body(content = StoreImportForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Lojas importadas", body = MessageResponse),
        (status = 400, description = "Arquivo ausente ou planilha inválida"),
        (status = 404, description = "Grupo não encontrado.")
    ),
    security(("session_cookie" = []))
)]
pub async fn import_stores(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;

    let group_id = form
        .parse::<i32>("groupId")?
        .ok_or_else(|| AppError::BadRequest("Selecione um grupo para as lojas.".into()))?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("Nenhum arquivo selecionado.".into()))?;
    allowed_extension(&file.file_name, SPREADSHEET_EXTENSIONS)?;

    let summary = app_state
        .import_service
        .import_stores(group_id, &file.file_name, &file.bytes)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "{} lojas importadas/atualizadas com sucesso!",
        summary.imported
    ))))
}

// GET /api/admin/stores/export
#[utoipa::path(
    get,
    path = "/api/admin/stores/export",
    tag = "Lojas",
    responses((
        status = 200,
        description = "lojas_export.xlsx",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    )),
    security(("session_cookie" = []))
)]
pub async fn export_stores(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    app_state.store_service.export().await
}
