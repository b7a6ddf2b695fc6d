// src/middleware/auth.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{
    common::error::AppError,
    models::auth::{session_keys, CurrentUser, UserRole},
};

// Lê o usuário gravado na sessão pelo login (a sessão vem do SessionManagerLayer)
async fn session_user(parts: &Parts) -> Result<Option<CurrentUser>, AppError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };
    Ok(session.get::<CurrentUser>(session_keys::CURRENT_USER).await?)
}

/// Grava o usuário na sessão. O id da sessão é trocado para evitar fixation.
pub async fn start_session(session: &Session, user: &CurrentUser) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    Ok(())
}

// ---
// Extratores
// ---

/// Exige uma promotora logada. Sem sessão: 401; outro papel: 403.
pub struct RequirePromoter(pub CurrentUser);

impl<S> FromRequestParts<S> for RequirePromoter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts).await?.ok_or(AppError::NotAuthenticated)?;
        if user.role != UserRole::Promoter {
            return Err(AppError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Exige o administrador (master).
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts).await?.ok_or(AppError::NotAuthenticated)?;
        if user.role != UserRole::Master {
            return Err(AppError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Qualquer usuário logado (ou nenhum). Nunca rejeita.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await.ok().flatten()))
    }
}
