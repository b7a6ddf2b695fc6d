// src/services/report_service.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Local, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;

use crate::{
    common::{
        clock,
        error::AppError,
        spreadsheet::{write_workbook, Cell, ExportFile},
    },
    db::{GroupRepository, ReportRepository, StoreRepository},
    models::{
        report::{
            AdvancedReportFilter, AggregationTable, FieldSelection, InvalidSelection, Report,
            ReportForm, ReportWithValues, SubmitReportPayload,
        },
        store::AssignedStore,
    },
};

pub const STORE_WITHOUT_GROUP: &str =
    "A loja selecionada não pertence a um grupo com relatório configurado.";
pub const NO_ASSIGNED_STORES: &str =
    "Você não está associada a nenhuma loja. Contacte o administrador.";
pub const NO_DATA_TO_EXPORT: &str =
    "Nenhum dado encontrado para exportar com os filtros selecionados.";

const HISTORY_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    store_repo: StoreRepository,
    group_repo: GroupRepository,
    pool: PgPool,
}

impl ReportService {
    pub fn new(
        report_repo: ReportRepository,
        store_repo: StoreRepository,
        group_repo: GroupRepository,
        pool: PgPool,
    ) -> Self {
        Self { report_repo, store_repo, group_repo, pool }
    }

    // =========================================================================
    //  1. PROMOTORA
    // =========================================================================

    async fn assigned_stores(&self, user_id: i32) -> Result<Vec<AssignedStore>, AppError> {
        let stores = self.store_repo.list_assigned(user_id).await?;
        if stores.is_empty() {
            return Err(AppError::Warning(NO_ASSIGNED_STORES.into()));
        }
        Ok(stores)
    }

    /// Campos do formulário para a loja escolhida (ou a primeira loja da promotora).
    pub async fn form(&self, user_id: i32, store_id: Option<i32>) -> Result<ReportForm, AppError> {
        let stores = self.assigned_stores(user_id).await?;

        let store = match store_id {
            Some(id) => stores.iter().find(|s| s.id == id).ok_or(AppError::Forbidden)?,
            None => &stores[0],
        };

        let fields = match store.group_id {
            Some(group_id) => self.group_repo.list_fields(group_id).await?,
            None => Vec::new(),
        };

        Ok(ReportForm { store_id: Some(store.id), fields })
    }

    /// Grava o relatório e seus valores numa única transação.
    /// Só os campos do grupo da loja são considerados; valores vazios são ignorados.
    pub async fn submit(&self, user_id: i32, payload: SubmitReportPayload) -> Result<Report, AppError> {
        let stores = self.assigned_stores(user_id).await?;

        let store_id = payload.store_id.ok_or_else(|| {
            AppError::BadRequest("É necessário selecionar uma loja para enviar o relatório.".into())
        })?;
        let store = stores.iter().find(|s| s.id == store_id).ok_or(AppError::Forbidden)?;

        let group_id = store
            .group_id
            .ok_or_else(|| AppError::Warning(STORE_WITHOUT_GROUP.into()))?;
        let fields = self.group_repo.list_fields(group_id).await?;

        let mut tx = self.pool.begin().await?;

        let report = self
            .report_repo
            .create_report(&mut tx, user_id, store_id, clock::today())
            .await?;

        let mut saved = 0;
        for field in &fields {
            let Some(value) = payload.values.get(&field.id) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            self.report_repo
                .insert_value(&mut tx, report.id, field.id, value)
                .await?;
            saved += 1;
        }

        tx.commit().await?;

        tracing::info!(
            "📝 Relatório {} enviado (promotora {}, loja {}, {} valores)",
            report.id,
            user_id,
            store_id,
            saved
        );
        Ok(report)
    }

    pub async fn history(&self, user_id: i32) -> Result<Vec<ReportWithValues>, AppError> {
        let headers = self.report_repo.recent_for_promoter(user_id, HISTORY_LIMIT).await?;
        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let values = self.report_repo.values_for_reports(&ids).await?;
        Ok(ReportWithValues::assemble(headers, values))
    }

    // =========================================================================
    //  2. RELATÓRIO DIÁRIO
    // =========================================================================

    pub async fn daily(&self, group_id: i32, date: NaiveDate) -> Result<Vec<ReportWithValues>, AppError> {
        let headers = self.report_repo.daily_reports(group_id, date).await?;
        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let values = self.report_repo.values_for_reports(&ids).await?;
        Ok(ReportWithValues::assemble(headers, values))
    }

    pub async fn export_daily(&self, group_id: i32, date: NaiveDate) -> Result<ExportFile, AppError> {
        let reports = self.daily(group_id, date).await?;
        let (headers, rows) = daily_pivot(&reports);
        if rows.is_empty() {
            return Err(AppError::NotFound(NO_DATA_TO_EXPORT.into()));
        }

        let bytes = write_workbook("Relatorio_Diario", &headers, &rows)?;
        Ok(ExportFile {
            file_name: format!("relatorio_diario_{}.xlsx", date.format("%Y-%m-%d")),
            bytes,
        })
    }

    // =========================================================================
    //  3. RELATÓRIO AVANÇADO
    // =========================================================================

    /// Valida as seleções contra os campos do grupo e roda a agregação.
    pub async fn aggregate(&self, filter: &AdvancedReportFilter) -> Result<AggregationTable, AppError> {
        if filter.date_from > filter.date_to {
            return Err(AppError::BadRequest(
                "A data inicial não pode ser posterior à data final.".into(),
            ));
        }

        let options = self.group_repo.field_options(filter.group_id).await?;
        let labels: HashMap<i32, String> = options.into_iter().map(|f| (f.id, f.label)).collect();

        let selections = resolve_selections(&filter.fields, &labels)?;

        let mut headers = vec!["Promotora".to_string(), "Loja".to_string()];
        for selection in &selections {
            headers.push(format!(
                "{} ({})",
                labels[&selection.field_id],
                selection.mode.header_suffix()
            ));
        }

        let rows = self.report_repo.aggregate(filter, &selections).await?;
        Ok(AggregationTable { headers, rows })
    }

    pub async fn export_aggregate(&self, filter: &AdvancedReportFilter) -> Result<ExportFile, AppError> {
        let table = self.aggregate(filter).await?;
        if table.rows.is_empty() {
            return Err(AppError::NotFound(NO_DATA_TO_EXPORT.into()));
        }

        let rows: Vec<Vec<Cell>> = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    Cell::from(row.promoter_name.clone()),
                    Cell::Text(row.store_name.clone()),
                ];
                cells.extend(row.values.iter().map(|v| {
                    v.and_then(|d| d.to_f64()).map(Cell::Number).unwrap_or(Cell::Empty)
                }));
                cells
            })
            .collect();

        let bytes = write_workbook("Relatorio_Avancado", &table.headers, &rows)?;
        Ok(ExportFile {
            file_name: format!(
                "relatorio_avancado_{}_a_{}.xlsx",
                filter.date_from.format("%Y-%m-%d"),
                filter.date_to.format("%Y-%m-%d")
            ),
            bytes,
        })
    }
}

/// Converte "12_total" etc. e confere cada id contra a allow-list do grupo.
pub fn resolve_selections(
    raw: &[String],
    labels: &HashMap<i32, String>,
) -> Result<Vec<FieldSelection>, AppError> {
    if raw.is_empty() {
        return Err(AppError::BadRequest("Nenhum campo selecionado.".into()));
    }

    raw.iter()
        .map(|item| {
            let selection: FieldSelection = item
                .parse()
                .map_err(|e: InvalidSelection| AppError::BadRequest(e.to_string()))?;
            if !labels.contains_key(&selection.field_id) {
                return Err(AppError::BadRequest(format!(
                    "O campo {} não pertence ao grupo selecionado.",
                    selection.field_id
                )));
            }
            Ok(selection)
        })
        .collect()
}

/// Uma linha por relatório (mais antigo primeiro) e uma coluna por rótulo, em ordem alfabética.
/// Relatórios sem nenhum valor ficam de fora.
pub fn daily_pivot(reports: &[ReportWithValues]) -> (Vec<String>, Vec<Vec<Cell>>) {
    let labels: BTreeSet<&str> = reports
        .iter()
        .flat_map(|r| r.values.iter().map(|v| v.label.as_str()))
        .collect();

    let mut headers = vec!["Data/Hora".to_string(), "Promotora".to_string(), "Loja".to_string()];
    headers.extend(labels.iter().map(|l| l.to_string()));

    let mut ordered: Vec<&ReportWithValues> = reports.iter().filter(|r| !r.values.is_empty()).collect();
    ordered.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.promoter_name.cmp(&b.promoter_name))
    });

    let rows = ordered
        .into_iter()
        .map(|report| {
            // Primeiro valor de cada rótulo vence
            let mut by_label: BTreeMap<&str, &str> = BTreeMap::new();
            for value in &report.values {
                if let Some(v) = value.value.as_deref() {
                    by_label.entry(value.label.as_str()).or_insert(v);
                }
            }

            let mut cells = vec![
                Cell::Text(
                    report
                        .submitted_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                ),
                Cell::from(report.promoter_name.clone()),
                Cell::Text(report.store_name.clone()),
            ];
            cells.extend(labels.iter().map(|label| match by_label.get(label) {
                Some(v) => Cell::Text(v.to_string()),
                None => Cell::Empty,
            }));
            cells
        })
        .collect();

    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{AggregationMode, ReportValueEntry};
    use chrono::{Duration, Utc};

    fn labels() -> HashMap<i32, String> {
        HashMap::from([(12, "Estoque".to_string()), (13, "Frentes".to_string())])
    }

    #[test]
    fn selections_inside_the_group_are_accepted() {
        let raw = vec!["12_total".to_string(), "13_media".to_string()];
        let selections = resolve_selections(&raw, &labels()).unwrap();
        assert_eq!(selections.len(), 2);
        assert_eq!(selections[1].mode, AggregationMode::Average);
    }

    #[test]
    fn selections_outside_the_group_are_rejected() {
        let raw = vec!["99_total".to_string()];
        assert!(matches!(
            resolve_selections(&raw, &labels()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(resolve_selections(&[], &labels()).is_err());
    }

    fn report(id: i32, minutes_ago: i64, values: &[(&str, &str)]) -> ReportWithValues {
        ReportWithValues {
            id,
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
            promoter_name: Some(format!("Promotora {id}")),
            store_name: format!("Loja {id}"),
            values: values
                .iter()
                .map(|(label, value)| ReportValueEntry {
                    report_id: id,
                    label: label.to_string(),
                    value: Some(value.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn daily_pivot_sorts_labels_and_rows() {
        let reports = vec![
            report(2, 5, &[("Preço", "4,99"), ("Estoque", "10")]),
            report(1, 30, &[("Estoque", "3")]),
            report(3, 1, &[]),
        ];

        let (headers, rows) = daily_pivot(&reports);

        assert_eq!(headers, vec!["Data/Hora", "Promotora", "Loja", "Estoque", "Preço"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], Cell::Text("Loja 1".into()));
        assert_eq!(rows[0][4], Cell::Empty);
        assert_eq!(rows[1][3], Cell::Text("10".into()));
        assert_eq!(rows[1][4], Cell::Text("4,99".into()));
    }
}
