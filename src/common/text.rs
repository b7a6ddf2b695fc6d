// src/common/text.rs

use crate::common::error::AppError;

/// Campo opcional de formulário: sem espaços nas pontas, e vazio vira `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Campo obrigatório: espaços nas pontas saem, e o que sobra não pode ser vazio.
pub fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(message.to_string()));
    }
    Ok(value)
}
