// src/handlers/reports.rs

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::{clock, error::AppError},
    config::AppState,
    middleware::auth::RequireAdmin,
    models::report::{
        AdvancedReportFilter, AggregationRow, AggregationTable, DailyReportQuery, ReportWithValues,
    },
};

// =============================================================================
//  TABELA HTML (askama)
// =============================================================================

struct TableRow {
    promoter: String,
    store: String,
    values: Vec<String>,
}

#[derive(Template)]
#[template(path = "advanced_report.html")]
struct AdvancedReportTemplate {
    date_from: String,
    date_to: String,
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl AdvancedReportTemplate {
    fn new(filter: &AdvancedReportFilter, table: AggregationTable) -> Self {
        Self {
            date_from: filter.date_from.format("%d/%m/%Y").to_string(),
            date_to: filter.date_to.format("%d/%m/%Y").to_string(),
            headers: table.headers,
            rows: table.rows.into_iter().map(TableRow::from).collect(),
        }
    }
}

impl From<AggregationRow> for TableRow {
    fn from(row: AggregationRow) -> Self {
        Self {
            promoter: row.promoter_name.unwrap_or_default(),
            store: row.store_name,
            values: row.values.iter().map(format_value).collect(),
        }
    }
}

// Médias podem vir com muitas casas
fn format_value(value: &Option<Decimal>) -> String {
    value
        .map(|d| d.round_dp(2).normalize().to_string())
        .unwrap_or_default()
}

// =============================================================================
//  RELATÓRIO AVANÇADO
// =============================================================================

// POST /api/admin/reports/advanced
#[utoipa::path(
    post,
    path = "/api/admin/reports/advanced",
    tag = "Relatórios",
    request_body = AdvancedReportFilter,
    responses(
        (status = 200, description = "Soma/média por promotora e loja", body = AggregationTable),
        (status = 400, description = "Seleção de campo inválida ou período invertido")
    ),
    security(("session_cookie" = []))
)]
pub async fn advanced_report(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(filter): Json<AdvancedReportFilter>,
) -> Result<impl IntoResponse, AppError> {
    let table = app_state.report_service.aggregate(&filter).await?;
    Ok(Json(table))
}

// GET /api/admin/reports/advanced/view?groupId=1&dateFrom=...&fields=12_total&fields=13_media
#[utoipa::path(
    get,
    path = "/api/admin/reports/advanced/view",
    tag = "Relatórios",
    params(AdvancedReportFilter),
    responses(
        (status = 200, description = "Tabela HTML", content_type = "text/html"),
        (status = 400, description = "Seleção de campo inválida ou período invertido")
    ),
    security(("session_cookie" = []))
)]
pub async fn advanced_report_view(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    axum_extra::extract::Query(filter): axum_extra::extract::Query<AdvancedReportFilter>,
) -> Result<impl IntoResponse, AppError> {
    let table = app_state.report_service.aggregate(&filter).await?;
    let template = AdvancedReportTemplate::new(&filter, table);
    Ok(Html(template.render()?))
}

// GET /api/admin/reports/advanced/export
#[utoipa::path(
    get,
    path = "/api/admin/reports/advanced/export",
    tag = "Relatórios",
    params(AdvancedReportFilter),
    responses(
        (
            status = 200,
            description = "relatorio_avancado_<de>_a_<ate>.xlsx",
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ),
        (status = 404, description = "Nenhum dado encontrado para exportar com os filtros selecionados.")
    ),
    security(("session_cookie" = []))
)]
pub async fn advanced_report_export(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    axum_extra::extract::Query(filter): axum_extra::extract::Query<AdvancedReportFilter>,
) -> Result<impl IntoResponse, AppError> {
    app_state.report_service.export_aggregate(&filter).await
}

// =============================================================================
//  RELATÓRIO DIÁRIO
// =============================================================================

fn report_date(query: &DailyReportQuery) -> NaiveDate {
    query.date.unwrap_or_else(clock::today)
}

// GET /api/admin/reports/daily?groupId=1&date=2025-03-10
#[utoipa::path(
    get,
    path = "/api/admin/reports/daily",
    tag = "Relatórios",
    params(DailyReportQuery),
    responses((status = 200, description = "Relatórios do dia, mais recentes primeiro", body = Vec<ReportWithValues>)),
    security(("session_cookie" = []))
)]
pub async fn daily_reports(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<DailyReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reports = app_state
        .report_service
        .daily(query.group_id, report_date(&query))
        .await?;
    Ok(Json(reports))
}

// GET /api/admin/reports/daily/export
#[utoipa::path(
    get,
    path = "/api/admin/reports/daily/export",
    tag = "Relatórios",
    params(DailyReportQuery),
    responses(
        (
            status = 200,
            description = "relatorio_diario_<data>.xlsx",
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ),
        (status = 404, description = "Nenhum dado encontrado para exportar com os filtros selecionados.")
    ),
    security(("session_cookie" = []))
)]
pub async fn daily_reports_export(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<DailyReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .report_service
        .export_daily(query.group_id, report_date(&query))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_rounded_and_blank_when_missing() {
        assert_eq!(format_value(&Some(Decimal::new(75, 1))), "7.5");
        assert_eq!(format_value(&Some(Decimal::new(33333, 4))), "3.33");
        assert_eq!(format_value(&Some(Decimal::new(1500, 2))), "15");
        assert_eq!(format_value(&None), "");
    }

    #[test]
    fn template_renders_rows_and_escapes_names() {
        let filter = AdvancedReportFilter {
            group_id: 1,
            date_from: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            promoter_id: None,
            store_id: None,
            fields: vec!["12_total".into()],
        };
        let table = AggregationTable {
            headers: vec!["Promotora".into(), "Loja".into(), "Estoque (Total)".into()],
            rows: vec![AggregationRow {
                promoter_name: Some("Ana <b>".into()),
                store_name: "Loja A".into(),
                values: vec![Some(Decimal::new(15, 0))],
            }],
        };

        let html = AdvancedReportTemplate::new(&filter, table).render().unwrap();

        assert!(html.contains("01/03/2025 a 10/03/2025"));
        assert!(html.contains("Estoque (Total)"));
        assert!(html.contains("Ana &#60;b&#62;") || html.contains("Ana &lt;b&gt;"));
        assert!(html.contains(">15<"));
    }
}
