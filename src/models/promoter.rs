// src/models/promoter.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Listagem da tela de gerenciamento
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoterSummary {
    pub id: i32,
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub active: bool,
    pub total_stores: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoterDetail {
    pub id: i32,
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub active: bool,
    pub store_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoterPayload {
    #[validate(length(min = 1, message = "Nome e telefone são obrigatórios."))]
    #[schema(example = "Ana Souza")]
    pub full_name: String,
    pub cpf: Option<String>,
    #[validate(length(min = 1, message = "Nome e telefone são obrigatórios."))]
    #[schema(example = "11999998888")]
    pub phone: String,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub store_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleActiveResponse {
    pub id: i32,
    pub active: bool,
}

/// Onde a promotora importada deve ser associada.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAssignment {
    /// Todas as lojas do grupo com este nome.
    Group(String),
    /// A loja com este CNPJ.
    Cnpj(String),
}

/// Promotora lida da planilha, já agrupada por telefone.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoterImportRow {
    pub phone: String,
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub assignments: Vec<StoreAssignment>,
}

// Linha do export de promotoras (uma por loja associada)
#[derive(Debug, Clone, FromRow)]
pub struct PromoterExportRow {
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub store_cnpj: Option<String>,
    pub group_name: Option<String>,
}
