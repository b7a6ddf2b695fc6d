// src/models/store.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i32,
    #[schema(example = "Mercado Bom Preço Ltda")]
    pub company_name: String,
    #[schema(example = "Bom Preço")]
    pub brand: Option<String>,
    #[schema(example = "12345678000190")]
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[schema(example = "SP")]
    pub state: Option<String>,
    pub group_id: Option<i32>,
}

// Linha da listagem administrativa (com o nome do grupo via LEFT JOIN)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreListEntry {
    pub id: i32,
    pub company_name: String,
    pub brand: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub group_id: Option<i32>,
    pub group_name: Option<String>,
}

// Loja vista pela promotora
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedStore {
    pub id: i32,
    pub company_name: String,
    pub cnpj: Option<String>,
    pub group_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorePayload {
    #[validate(length(min = 1, message = "Informe a razão social."))]
    pub company_name: String,
    pub brand: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub group_id: Option<i32>,
}

/// Linha de planilha de lojas já validada (CNPJ e razão social presentes).
#[derive(Debug, Clone, PartialEq)]
pub struct StoreImportRow {
    pub company_name: String,
    pub cnpj: String,
    pub brand: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

// Linha do export de lojas
#[derive(Debug, Clone, FromRow)]
pub struct StoreExportRow {
    pub company_name: String,
    pub cnpj: Option<String>,
    pub brand: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub group_name: Option<String>,
}
