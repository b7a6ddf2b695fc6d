// src/handlers/groups.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{OptionalUser, RequireAdmin},
    models::{
        auth::UserRole,
        group::{CreateFieldPayload, CreateGroupPayload, FieldOption, Group, GroupDetail, ReportField},
        MessageResponse,
    },
};

// =============================================================================
//  GRUPOS
// =============================================================================

// GET /api/admin/groups
#[utoipa::path(
    get,
    path = "/api/admin/groups",
    tag = "Grupos",
    responses((status = 200, description = "Grupos em ordem alfabética", body = Vec<Group>)),
    security(("session_cookie" = []))
)]
pub async fn list_groups(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state.group_service.list().await?;
    Ok(Json(groups))
}

// POST /api/admin/groups
#[utoipa::path(
    post,
    path = "/api/admin/groups",
    tag = "Grupos",
    request_body = CreateGroupPayload,
    responses(
        (status = 201, description = "Grupo criado", body = Group),
        (status = 409, description = "O grupo já existe")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_group(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let group = app_state.group_service.create(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

// GET /api/admin/groups/{id}
#[utoipa::path(
    get,
    path = "/api/admin/groups/{id}",
    tag = "Grupos",
    params(("id" = i32, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Grupo com seus campos", body = GroupDetail),
        (status = 404, description = "Grupo não encontrado.")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_group(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.group_service.detail(id).await?;
    Ok(Json(detail))
}

// DELETE /api/admin/groups/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/groups/{id}",
    tag = "Grupos",
    params(("id" = i32, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Grupo removido; lojas ficam sem grupo", body = MessageResponse),
        (status = 404, description = "Grupo não encontrado.")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_group(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.group_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Grupo removido com sucesso.")))
}

// =============================================================================
//  CAMPOS DO RELATÓRIO
// =============================================================================

// POST /api/admin/groups/{id}/fields
#[utoipa::path(
    post,
    path = "/api/admin/groups/{id}/fields",
    tag = "Grupos",
    params(("id" = i32, Path, description = "ID do grupo")),
    request_body = CreateFieldPayload,
    responses(
        (status = 201, description = "Campo adicionado", body = ReportField),
        (status = 404, description = "Grupo não encontrado.")
    ),
    security(("session_cookie" = []))
)]
pub async fn add_field(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(group_id): Path<i32>,
    Json(payload): Json<CreateFieldPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let field = app_state.group_service.add_field(group_id, &payload.label).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

// DELETE /api/admin/fields/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/fields/{id}",
    tag = "Grupos",
    params(("id" = i32, Path, description = "ID do campo")),
    responses(
        (status = 200, description = "Campo removido (com os valores enviados)", body = MessageResponse),
        (status = 404, description = "Campo não encontrado.")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_field(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(field_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.group_service.delete_field(field_id).await?;
    Ok(Json(MessageResponse::new("Campo removido.")))
}

// GET /api/groups/{id}/fields
// Usado pela tela de relatórios para popular os campos. Sem admin: 403 {"error": "Não autorizado"}.
#[utoipa::path(
    get,
    path = "/api/groups/{id}/fields",
    tag = "Grupos",
    params(("id" = i32, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Campos do grupo", body = Vec<FieldOption>),
        (status = 403, description = "Não autorizado")
    ),
    security(("session_cookie" = []))
)]
pub async fn group_fields(
    State(app_state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(group_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !user.is_some_and(|u| u.role == UserRole::Master) {
        return Err(AppError::Forbidden);
    }
    let fields = app_state.group_service.field_options(group_id).await?;
    Ok(Json(fields))
}
