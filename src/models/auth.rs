// src/models/auth.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    #[sqlx(rename = "promotora")]
    #[serde(rename = "promotora")]
    Promoter,
    #[sqlx(rename = "master")]
    #[serde(rename = "master")]
    Master,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub active: bool,
}

/// O que fica guardado na sessão depois do login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: i32,
    pub name: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.full_name.clone().unwrap_or_else(|| user.username.clone()),
            role: user.role,
        }
    }
}

pub mod session_keys {
    pub const CURRENT_USER: &str = "current_user";
}

// Dados para login: telefone (promotora) ou usuário (master)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Informe o telefone ou usuário."))]
    #[schema(example = "11999998888")]
    pub login: String,

    #[serde(default)]
    #[schema(example = "hub@11999998888")]
    pub password: String,
}
