// src/db/group_repo.rs

use sqlx::{PgConnection, PgPool};

use crate::{
    common::error::{is_foreign_key_violation, AppError},
    models::group::{FieldOption, Group, ReportField},
};

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  GRUPOS
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Group>, AppError> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, name FROM groups ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    pub async fn find(&self, id: i32) -> Result<Option<Group>, AppError> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    pub async fn create(&self, name: &str) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>("INSERT INTO groups (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, format!("O grupo '{}' já existe.", name)))
    }

    /// Remove o grupo: as lojas ficam sem grupo e os campos (com seus valores) somem.
    /// Deve rodar dentro de uma transação.
    pub async fn delete(&self, conn: &mut PgConnection, id: i32) -> Result<bool, AppError> {
        sqlx::query("UPDATE stores SET group_id = NULL WHERE group_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM report_fields WHERE group_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CAMPOS DO RELATÓRIO
    // =========================================================================

    /// Campos na ordem de criação (ordem do formulário da promotora).
    pub async fn list_fields(&self, group_id: i32) -> Result<Vec<ReportField>, AppError> {
        let fields = sqlx::query_as::<_, ReportField>(
            "SELECT id, group_id, name, label FROM report_fields WHERE group_id = $1 ORDER BY id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    /// Campos em ordem alfabética de rótulo (telas administrativas).
    pub async fn list_fields_by_label(&self, group_id: i32) -> Result<Vec<ReportField>, AppError> {
        let fields = sqlx::query_as::<_, ReportField>(
            "SELECT id, group_id, name, label FROM report_fields WHERE group_id = $1 ORDER BY label",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    pub async fn field_options(&self, group_id: i32) -> Result<Vec<FieldOption>, AppError> {
        let fields = sqlx::query_as::<_, FieldOption>(
            "SELECT id, label FROM report_fields WHERE group_id = $1 ORDER BY label",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    pub async fn create_field(&self, group_id: i32, name: &str, label: &str) -> Result<ReportField, AppError> {
        sqlx::query_as::<_, ReportField>(
            r#"
            INSERT INTO report_fields (group_id, name, label)
            VALUES ($1, $2, $3)
            RETURNING id, group_id, name, label
            "#,
        )
        .bind(group_id)
        .bind(name)
        .bind(label)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Grupo não encontrado.".into())
            } else {
                AppError::DatabaseError(e)
            }
        })
    }

    /// Apaga o campo (os valores enviados caem junto via FK). Devolve o grupo do campo.
    pub async fn delete_field(&self, field_id: i32) -> Result<Option<i32>, AppError> {
        let group_id = sqlx::query_scalar::<_, i32>(
            "DELETE FROM report_fields WHERE id = $1 RETURNING group_id",
        )
        .bind(field_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group_id)
    }
}
