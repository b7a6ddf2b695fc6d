// src/db/invoice_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::invoice::{Invoice, InvoiceEntry},
};

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i32, store_id: i32, image_path: &str) -> Result<Invoice, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (user_id, store_id, image_path, submitted_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .bind(image_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(invoice)
    }

    pub async fn recent_for_promoter(&self, user_id: i32, limit: i64) -> Result<Vec<InvoiceEntry>, AppError> {
        let invoices = sqlx::query_as::<_, InvoiceEntry>(
            r#"
            SELECT i.id, i.image_path, i.submitted_at, s.company_name AS store_name
            FROM invoices i
            JOIN stores s ON i.store_id = s.id
            WHERE i.user_id = $1
            ORDER BY i.submitted_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }
}
