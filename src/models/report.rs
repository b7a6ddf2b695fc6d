// src/models/report.rs

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::group::ReportField;

// =============================================================================
//  ENVIO (PROMOTORA)
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub report_date: NaiveDate,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportPayload {
    pub store_id: Option<i32>,

    // Chave = id do campo, valor = texto digitado (nada é validado, tudo vira TEXT)
    #[serde(default)]
    #[schema(example = json!({"12": "10", "13": "Sim"}))]
    pub values: HashMap<i32, String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFormQuery {
    pub store_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    pub store_id: Option<i32>,
    pub fields: Vec<ReportField>,
}

// =============================================================================
//  LEITURA (HISTÓRICO / RELATÓRIO DIÁRIO)
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportValueEntry {
    #[serde(skip)]
    #[schema(ignore)]
    pub report_id: i32,
    pub label: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReportHeaderRow {
    pub id: i32,
    pub submitted_at: DateTime<Utc>,
    pub promoter_name: Option<String>,
    pub store_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportWithValues {
    pub id: i32,
    pub submitted_at: DateTime<Utc>,
    pub promoter_name: Option<String>,
    pub store_name: String,
    pub values: Vec<ReportValueEntry>,
}

impl ReportWithValues {
    /// Junta cabeçalhos e valores (vindos de duas queries) preservando a ordem dos cabeçalhos.
    pub fn assemble(headers: Vec<ReportHeaderRow>, values: Vec<ReportValueEntry>) -> Vec<Self> {
        let mut by_report: HashMap<i32, Vec<ReportValueEntry>> = HashMap::new();
        for value in values {
            by_report.entry(value.report_id).or_default().push(value);
        }

        headers
            .into_iter()
            .map(|h| ReportWithValues {
                values: by_report.remove(&h.id).unwrap_or_default(),
                id: h.id,
                submitted_at: h.submitted_at,
                promoter_name: h.promoter_name,
                store_name: h.store_name,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    pub group_id: i32,
    pub date: Option<NaiveDate>,
}

// =============================================================================
//  AGREGAÇÃO (RELATÓRIO AVANÇADO)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AggregationMode {
    #[serde(rename = "total")]
    Sum,
    #[serde(rename = "media")]
    Average,
}

impl AggregationMode {
    pub fn header_suffix(&self) -> &'static str {
        match self {
            AggregationMode::Sum => "Total",
            AggregationMode::Average => "Média",
        }
    }
}

/// Um campo selecionado para o relatório, no formato do formulário: "12_total" / "12_media".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub field_id: i32,
    pub mode: AggregationMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelection(pub String);

impl fmt::Display for InvalidSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seleção de campo inválida: '{}'", self.0)
    }
}

impl FromStr for FieldSelection {
    type Err = InvalidSelection;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSelection(raw.to_string());

        let (id, mode) = raw.trim().split_once('_').ok_or_else(invalid)?;
        let field_id: i32 = id.parse().map_err(|_| invalid())?;
        if field_id <= 0 {
            return Err(invalid());
        }

        let mode = match mode {
            "total" => AggregationMode::Sum,
            "media" => AggregationMode::Average,
            _ => return Err(invalid()),
        };

        Ok(FieldSelection { field_id, mode })
    }
}

/// Filtros do relatório avançado. Vem como JSON (POST) ou query string (view/export).
#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdvancedReportFilter {
    pub group_id: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub promoter_id: Option<i32>,
    pub store_id: Option<i32>,

    /// Ex: ["12_total", "13_media"]
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRow {
    pub promoter_name: Option<String>,
    pub store_name: String,
    pub values: Vec<Option<Decimal>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregationTable {
    pub headers: Vec<String>,
    pub rows: Vec<AggregationRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sum_and_average_selections() {
        assert_eq!(
            "12_total".parse::<FieldSelection>(),
            Ok(FieldSelection { field_id: 12, mode: AggregationMode::Sum })
        );
        assert_eq!(
            " 7_media ".parse::<FieldSelection>(),
            Ok(FieldSelection { field_id: 7, mode: AggregationMode::Average })
        );
    }

    #[test]
    fn rejects_malformed_selections() {
        for raw in ["12", "abc_total", "12_max", "0_total", "-3_media", "1; DROP TABLE users_total", ""] {
            assert!(raw.parse::<FieldSelection>().is_err(), "{raw} deveria falhar");
        }
    }

    #[test]
    fn assemble_keeps_header_order_and_groups_values() {
        let now = Utc::now();
        let headers = vec![
            ReportHeaderRow { id: 2, submitted_at: now, promoter_name: Some("Ana".into()), store_name: "Loja B".into() },
            ReportHeaderRow { id: 1, submitted_at: now, promoter_name: None, store_name: "Loja A".into() },
        ];
        let values = vec![
            ReportValueEntry { report_id: 1, label: "Estoque".into(), value: Some("3".into()) },
            ReportValueEntry { report_id: 2, label: "Estoque".into(), value: Some("5".into()) },
            ReportValueEntry { report_id: 2, label: "Frentes".into(), value: Some("2".into()) },
        ];

        let reports = ReportWithValues::assemble(headers, values);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, 2);
        assert_eq!(reports[0].values.len(), 2);
        assert_eq!(reports[1].values[0].value.as_deref(), Some("3"));
    }
}
