// src/db/checkin_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::checkin::{Checkin, CheckinEntry, CheckinHistoryEntry, CheckinKind},
};

#[derive(Clone)]
pub struct CheckinRepository {
    pool: PgPool,
}

/// Dados gravados num check-in/check-out.
#[derive(Debug, Clone, Copy)]
pub struct NewCheckin<'a> {
    pub user_id: i32,
    pub store_id: i32,
    pub kind: CheckinKind,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_path: &'a str,
}

impl CheckinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_checkin: NewCheckin<'_>) -> Result<Checkin, AppError> {
        let checkin = sqlx::query_as::<_, Checkin>(
            r#"
            INSERT INTO checkins (user_id, store_id, kind, recorded_at, latitude, longitude, image_path)
            VALUES ($1, $2, $3, NOW(), $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new_checkin.user_id)
        .bind(new_checkin.store_id)
        .bind(new_checkin.kind)
        .bind(new_checkin.latitude)
        .bind(new_checkin.longitude)
        .bind(new_checkin.image_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(checkin)
    }

    pub async fn recent_for_promoter(&self, user_id: i32, limit: i64) -> Result<Vec<CheckinEntry>, AppError> {
        let entries = sqlx::query_as::<_, CheckinEntry>(
            r#"
            SELECT c.id, c.kind, c.recorded_at, c.latitude, c.longitude, c.image_path,
                   s.company_name AS store_name
            FROM checkins c
            JOIN stores s ON c.store_id = s.id
            WHERE c.user_id = $1
            ORDER BY c.recorded_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Histórico administrativo no intervalo `[from, to)`, mais recentes primeiro.
    pub async fn history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        promoter_id: Option<i32>,
        store_id: Option<i32>,
    ) -> Result<Vec<CheckinHistoryEntry>, AppError> {
        let mut query = build_history_query(from, to, promoter_id, store_id);
        let entries = query
            .build_query_as::<CheckinHistoryEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

fn build_history_query(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    promoter_id: Option<i32>,
    store_id: Option<i32>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT c.recorded_at, c.kind, c.latitude, c.longitude, c.image_path, \
         u.full_name AS promoter_name, s.company_name AS store_name \
         FROM checkins c \
         JOIN users u ON c.user_id = u.id \
         JOIN stores s ON c.store_id = s.id \
         WHERE c.recorded_at >= ",
    );
    qb.push_bind(from);
    qb.push(" AND c.recorded_at < ");
    qb.push_bind(to);

    if let Some(promoter_id) = promoter_id {
        qb.push(" AND c.user_id = ");
        qb.push_bind(promoter_id);
    }
    if let Some(store_id) = store_id {
        qb.push(" AND c.store_id = ");
        qb.push_bind(store_id);
    }

    qb.push(" ORDER BY c.recorded_at DESC");
    qb
}
