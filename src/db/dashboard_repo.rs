// src/db/dashboard_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::dashboard::{DailyCount, DashboardSummary, KindCount},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo Geral
    // `today` e o intervalo [day_start, day_end) vêm do relógio da aplicação.
    pub async fn get_summary(
        &self,
        today: NaiveDate,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<DashboardSummary, AppError> {
        // Snapshot consistente dos números
        let mut tx = self.pool.begin().await?;

        // A. Promotoras ativas
        let active_promoters: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = 'promotora' AND active",
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Lojas cadastradas
        let total_stores: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(&mut *tx)
            .await?;

        // C. Relatórios de hoje
        let reports_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE report_date = $1",
        )
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        // D. Check-ins de hoje (entradas e saídas)
        let checkins_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM checkins WHERE recorded_at >= $1 AND recorded_at < $2",
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&mut *tx)
        .await?;

        // 2. Relatórios por dia nos últimos 7 dias (dias sem envio aparecem com 0)
        let reports_by_day = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT d.day::date AS day, COUNT(r.id) AS total
            FROM generate_series($1::date - 6, $1::date, INTERVAL '1 day') AS d(day)
            LEFT JOIN reports r ON r.report_date = d.day::date
            GROUP BY d.day
            ORDER BY d.day
            "#,
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        // 3. Check-ins de hoje por tipo
        let checkins_by_kind = sqlx::query_as::<_, KindCount>(
            r#"
            SELECT kind, COUNT(*) AS total
            FROM checkins
            WHERE recorded_at >= $1 AND recorded_at < $2
            GROUP BY kind
            ORDER BY kind
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            active_promoters,
            total_stores,
            reports_today,
            checkins_today,
            reports_by_day,
            checkins_by_kind,
        })
    }
}
