// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Todo erro da aplicação vira uma mensagem curta para o usuário ({"error": "..."}).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Login ou senha inválidos.")]
    InvalidCredentials,

    #[error("Este usuário está inativo.")]
    InactiveUser,

    #[error("Sessão ausente ou expirada.")]
    NotAuthenticated,

    #[error("Não autorizado")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UniqueConstraintViolation(String),

    // Equivalente ao "flash de aviso": a requisição foi entendida mas não pode ser cumprida.
    #[error("{0}")]
    Warning(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Erro ao processar a planilha: {0}")]
    Spreadsheet(String),

    #[error("Tipo de arquivo não permitido: {0}")]
    InvalidFileType(String),

    #[error("Erro no upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de sessão: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Erro ao gerar planilha: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro ao renderizar template: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    /// Mapeia uma violação de unicidade para a mensagem amigável informada.
    pub fn from_unique_violation(e: sqlx::Error, message: impl Into<String>) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(message.into());
            }
        }
        AppError::DatabaseError(e)
    }
}

/// FK violada: a linha referenciada (grupo, loja) não existe.
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotAuthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InactiveUser | AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),
            AppError::Warning(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Spreadsheet(_) | AppError::InvalidFileType(_) | AppError::Multipart(_) => {
                tracing::warn!("Requisição rejeitada: {}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            // O resto (banco, E/S, sessão, bcrypt...) é detalhe interno: loga e devolve 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_map_to_unprocessable_entity() {
        let response = AppError::Warning("Sem grupo".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn credential_errors_are_unauthorized() {
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InactiveUser.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn spreadsheet_errors_keep_raw_message() {
        let err = AppError::Spreadsheet("coluna CNPJ ausente".into());
        assert_eq!(
            err.to_string(),
            "Erro ao processar a planilha: coluna CNPJ ausente"
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool fechado"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_unique_database_errors_are_kept() {
        let err = AppError::from_unique_violation(sqlx::Error::RowNotFound, "duplicado");
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
