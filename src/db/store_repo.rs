// src/db/store_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};

use crate::{
    common::error::{is_foreign_key_violation, AppError},
    models::store::{AssignedStore, Store, StoreExportRow, StoreImportRow, StoreListEntry, StorePayload},
};

const DUPLICATE_STORE: &str = "Uma loja com este nome ou CNPJ já existe.";

// Duplicidade de nome/CNPJ ou grupo inexistente
fn store_write_error(e: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&e) {
        return AppError::NotFound("Grupo não encontrado.".into());
    }
    AppError::from_unique_violation(e, DUPLICATE_STORE)
}

#[derive(Clone)]
pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CADASTRO
    // =========================================================================

    pub async fn list_all(&self) -> Result<Vec<StoreListEntry>, AppError> {
        let stores = sqlx::query_as::<_, StoreListEntry>(
            r#"
            SELECT s.*, g.name AS group_name
            FROM stores s
            LEFT JOIN groups g ON s.group_id = g.id
            ORDER BY s.company_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    pub async fn create(&self, payload: &StorePayload) -> Result<Store, AppError> {
        sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (company_name, brand, cnpj, address, city, state, group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.company_name.trim())
        .bind(payload.brand.as_deref())
        .bind(payload.cnpj.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.state.as_deref())
        .bind(payload.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_write_error)
    }

    pub async fn update(&self, id: i32, payload: &StorePayload) -> Result<Option<Store>, AppError> {
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores
            SET company_name = $1, brand = $2, cnpj = $3, address = $4,
                city = $5, state = $6, group_id = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(payload.company_name.trim())
        .bind(payload.brand.as_deref())
        .bind(payload.cnpj.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.state.as_deref())
        .bind(payload.group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_write_error)
    }

    /// Upsert da importação, chave natural = CNPJ.
    pub async fn upsert_by_cnpj<'e, E>(
        &self,
        executor: E,
        row: &StoreImportRow,
        group_id: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO stores (company_name, cnpj, brand, address, city, state, group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (cnpj) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                brand = EXCLUDED.brand,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                group_id = EXCLUDED.group_id
            RETURNING id
            "#,
        )
        .bind(&row.company_name)
        .bind(&row.cnpj)
        .bind(row.brand.as_deref())
        .bind(row.address.as_deref())
        .bind(row.city.as_deref())
        .bind(row.state.as_deref())
        .bind(group_id)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn export_stores(&self) -> Result<Vec<StoreExportRow>, AppError> {
        let rows = sqlx::query_as::<_, StoreExportRow>(
            r#"
            SELECT s.company_name, s.cnpj, s.brand, s.address, s.city, s.state, g.name AS group_name
            FROM stores s
            LEFT JOIN groups g ON s.group_id = g.id
            ORDER BY s.company_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  ASSOCIAÇÃO PROMOTORA <-> LOJA
    // =========================================================================

    pub async fn list_assigned(&self, user_id: i32) -> Result<Vec<AssignedStore>, AppError> {
        let stores = sqlx::query_as::<_, AssignedStore>(
            r#"
            SELECT s.id, s.company_name, s.cnpj, s.group_id
            FROM stores s
            JOIN promoter_stores ps ON s.id = ps.store_id
            WHERE ps.user_id = $1
            ORDER BY s.company_name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    pub async fn assigned_store_ids(&self, user_id: i32) -> Result<Vec<i32>, AppError> {
        let ids = sqlx::query_scalar::<_, i32>(
            "SELECT store_id FROM promoter_stores WHERE user_id = $1 ORDER BY store_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn clear_assignments(&self, conn: &mut PgConnection, user_id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM promoter_stores WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn assign(&self, conn: &mut PgConnection, user_id: i32, store_id: i32) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO promoter_stores (user_id, store_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(store_id)
        .execute(conn)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound(format!("Loja {} não encontrada.", store_id))
            } else {
                AppError::DatabaseError(e)
            }
        })?;
        Ok(())
    }

    /// Associa a promotora a todas as lojas do grupo (pelo nome). Devolve quantas foram associadas.
    pub async fn assign_group_by_name(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        group_name: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO promoter_stores (user_id, store_id)
            SELECT $1, s.id
            FROM stores s
            JOIN groups g ON s.group_id = g.id
            WHERE g.name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_name)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn assign_by_cnpj(&self, conn: &mut PgConnection, user_id: i32, cnpj: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO promoter_stores (user_id, store_id)
            SELECT $1, id FROM stores WHERE cnpj = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(cnpj)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
