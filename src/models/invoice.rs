// src/models/invoice.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Nota fiscal: só a imagem, quem enviou e para qual loja
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub image_path: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEntry {
    pub id: i32,
    pub image_path: String,
    pub submitted_at: DateTime<Utc>,
    pub store_name: String,
}
