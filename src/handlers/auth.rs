// src/handlers/auth.rs

use axum::{extract::State, Json};
use tower_sessions::Session;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{start_session, OptionalUser},
    models::{
        auth::{CurrentUser, LoginPayload, User},
        MessageResponse,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado; cookie de sessão definido", body = CurrentUser),
        (status = 401, description = "Login ou senha inválidos."),
        (status = 403, description = "Este usuário está inativo.")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<CurrentUser>, AppError> {
    payload.validate()?;

    let user = app_state
        .auth_service
        .login(&payload.login, &payload.password)
        .await?;
    start_session(&session, &user).await?;

    Ok(Json(user))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Sessão encerrada", body = MessageResponse))
)]
pub async fn logout(session: Session) -> Result<Json<MessageResponse>, AppError> {
    session.flush().await?;
    Ok(Json(MessageResponse::new("Você foi desconectado com sucesso.")))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão", body = User),
        (status = 401, description = "Sessão ausente ou expirada.")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    OptionalUser(current): OptionalUser,
) -> Result<Json<User>, AppError> {
    let current = current.ok_or(AppError::NotAuthenticated)?;
    let user = app_state.auth_service.current_user(current.id).await?;
    Ok(Json(user))
}
