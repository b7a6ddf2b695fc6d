// src/models/group.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// ---
// Grupo: conjunto de lojas que compartilham o mesmo formulário de relatório
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i32,
    #[schema(example = "Supermercados Norte")]
    pub name: String,
}

// ---
// Definição de campo do relatório (o "molde" por grupo)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportField {
    pub id: i32,
    pub group_id: i32,
    #[schema(example = "frentes_de_gondola")]
    pub name: String,
    #[schema(example = "Frentes de Gôndola")]
    pub label: String,
}

/// Formato enxuto usado pelo endpoint JSON que popula a tela de relatórios.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub id: i32,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    pub id: i32,
    pub name: String,
    pub fields: Vec<ReportField>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupPayload {
    #[validate(length(min = 1, message = "Informe o nome do grupo."))]
    #[schema(example = "Supermercados Norte")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFieldPayload {
    #[validate(length(min = 1, message = "Informe o rótulo do campo."))]
    #[schema(example = "Frentes de Gôndola")]
    pub label: String,
}

/// "Frentes de Gôndola" -> "frentes_de_gôndola"
pub fn field_name_from_label(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}
