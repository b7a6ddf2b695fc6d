// src/db/report_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, PgConnection, PgPool, Postgres, QueryBuilder, Row};

use crate::{
    common::error::AppError,
    models::report::{
        AdvancedReportFilter, AggregationMode, AggregationRow, FieldSelection, Report,
        ReportHeaderRow, ReportValueEntry,
    },
};

// Converte o texto em número só quando ele "parece" número ("10", "-3", "2,5", "2.5").
// Qualquer outra coisa vira NULL: some da média e não soma nada no total.
const NUMERIC_VALUE: &str = "CASE WHEN btrim(rv.value) ~ '^[-+]?[0-9]+([.,][0-9]+)?$' \
     THEN replace(btrim(rv.value), ',', '.')::numeric END";

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ENVIO
    // =========================================================================

    pub async fn create_report(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        store_id: i32,
        report_date: NaiveDate,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (user_id, store_id, report_date, submitted_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .bind(report_date)
        .fetch_one(conn)
        .await?;
        Ok(report)
    }

    pub async fn insert_value(
        &self,
        conn: &mut PgConnection,
        report_id: i32,
        field_id: i32,
        value: &str,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO report_values (report_id, field_id, value) VALUES ($1, $2, $3)")
            .bind(report_id)
            .bind(field_id)
            .bind(value)
            .execute(conn)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn recent_for_promoter(&self, user_id: i32, limit: i64) -> Result<Vec<ReportHeaderRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportHeaderRow>(
            r#"
            SELECT r.id, r.submitted_at, u.full_name AS promoter_name, s.company_name AS store_name
            FROM reports r
            JOIN users u ON r.user_id = u.id
            JOIN stores s ON r.store_id = s.id
            WHERE r.user_id = $1
            ORDER BY r.submitted_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn daily_reports(&self, group_id: i32, date: NaiveDate) -> Result<Vec<ReportHeaderRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportHeaderRow>(
            r#"
            SELECT r.id, r.submitted_at, u.full_name AS promoter_name, s.company_name AS store_name
            FROM reports r
            JOIN users u ON r.user_id = u.id
            JOIN stores s ON r.store_id = s.id
            WHERE s.group_id = $1 AND r.report_date = $2
            ORDER BY r.submitted_at DESC
            "#,
        )
        .bind(group_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn values_for_reports(&self, report_ids: &[i32]) -> Result<Vec<ReportValueEntry>, AppError> {
        if report_ids.is_empty() {
            return Ok(Vec::new());
        }

        let values = sqlx::query_as::<_, ReportValueEntry>(
            r#"
            SELECT rv.report_id, rf.label, rv.value
            FROM report_values rv
            JOIN report_fields rf ON rv.field_id = rf.id
            WHERE rv.report_id = ANY($1)
            ORDER BY rv.report_id, rf.id
            "#,
        )
        .bind(report_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(values)
    }

    // =========================================================================
    //  AGREGAÇÃO
    // =========================================================================

    /// Roda a consulta dinâmica. `selections` já deve ter passado pela allow-list do grupo.
    pub async fn aggregate(
        &self,
        filter: &AdvancedReportFilter,
        selections: &[FieldSelection],
    ) -> Result<Vec<AggregationRow>, AppError> {
        let mut query = build_aggregation_query(filter, selections);
        let rows = query.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| aggregation_row(row, selections.len()))
            .collect()
    }
}

fn aggregation_row(row: &PgRow, columns: usize) -> Result<AggregationRow, AppError> {
    let mut values = Vec::with_capacity(columns);
    for i in 0..columns {
        values.push(row.try_get::<Option<Decimal>, _>(i + 2)?);
    }

    Ok(AggregationRow {
        promoter_name: row.try_get(0)?,
        store_name: row.try_get(1)?,
        values,
    })
}

/// Monta o SELECT com uma coluna agregada por campo, agrupado por promotora e loja.
/// Ids de campo, datas e filtros entram só como parâmetros ($n); nenhum texto do usuário vai para o SQL.
pub fn build_aggregation_query(
    filter: &AdvancedReportFilter,
    selections: &[FieldSelection],
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT u.full_name AS promoter_name, s.company_name AS store_name");

    for selection in selections {
        match selection.mode {
            AggregationMode::Sum => {
                qb.push(", COALESCE(SUM(CASE WHEN rv.field_id = ");
                qb.push_bind(selection.field_id);
                qb.push(" THEN ");
                qb.push(NUMERIC_VALUE);
                qb.push(" END), 0)");
            }
            AggregationMode::Average => {
                qb.push(", AVG(CASE WHEN rv.field_id = ");
                qb.push_bind(selection.field_id);
                qb.push(" THEN ");
                qb.push(NUMERIC_VALUE);
                qb.push(" END)");
            }
        }
    }

    qb.push(
        " FROM reports r \
         JOIN users u ON r.user_id = u.id \
         JOIN stores s ON r.store_id = s.id \
         JOIN report_values rv ON r.id = rv.report_id",
    );

    qb.push(" WHERE s.group_id = ");
    qb.push_bind(filter.group_id);
    qb.push(" AND r.report_date BETWEEN ");
    qb.push_bind(filter.date_from);
    qb.push(" AND ");
    qb.push_bind(filter.date_to);

    if let Some(promoter_id) = filter.promoter_id {
        qb.push(" AND u.id = ");
        qb.push_bind(promoter_id);
    }
    if let Some(store_id) = filter.store_id {
        qb.push(" AND s.id = ");
        qb.push_bind(store_id);
    }

    qb.push(" GROUP BY u.id, u.full_name, s.id, s.company_name ORDER BY u.full_name, s.company_name");
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> AdvancedReportFilter {
        AdvancedReportFilter {
            group_id: 3,
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            promoter_id: None,
            store_id: None,
            fields: Vec::new(),
        }
    }

    fn selections() -> Vec<FieldSelection> {
        vec![
            FieldSelection { field_id: 12, mode: AggregationMode::Sum },
            FieldSelection { field_id: 13, mode: AggregationMode::Average },
        ]
    }

    #[test]
    fn one_aggregate_column_per_selection() {
        let qb = build_aggregation_query(&filter(), &selections());
        let sql = qb.sql();

        assert_eq!(sql.matches("COALESCE(SUM(").count(), 1);
        assert_eq!(sql.matches("AVG(").count(), 1);
        assert!(sql.contains("rv.field_id = $1"));
        assert!(sql.contains("rv.field_id = $2"));
        assert!(sql.contains("s.group_id = $3"));
        assert!(sql.contains("BETWEEN $4 AND $5"));
    }

    #[test]
    fn field_ids_are_bound_not_interpolated() {
        let qb = build_aggregation_query(&filter(), &selections());
        let sql = qb.sql();

        assert!(!sql.contains("12"));
        assert!(!sql.contains("13"));
    }

    #[test]
    fn optional_filters_add_bound_clauses() {
        let mut f = filter();
        f.promoter_id = Some(9);
        f.store_id = Some(4);

        let qb = build_aggregation_query(&f, &selections());
        let sql = qb.sql();

        assert!(sql.contains("AND u.id = $6"));
        assert!(sql.contains("AND s.id = $7"));
    }

    #[test]
    fn grouped_by_promoter_and_store_ordered_by_promoter_name() {
        let qb = build_aggregation_query(&filter(), &selections());
        let sql = qb.sql();

        assert!(sql.contains("GROUP BY u.id, u.full_name, s.id, s.company_name"));
        assert!(sql.trim_end().ends_with("ORDER BY u.full_name, s.company_name"));
    }
}
