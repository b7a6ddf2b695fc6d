// src/services/group_service.rs

use sqlx::PgPool;

use crate::{
    common::{error::AppError, text::required},
    db::GroupRepository,
    models::group::{field_name_from_label, FieldOption, Group, GroupDetail, ReportField},
};

const GROUP_NOT_FOUND: &str = "Grupo não encontrado.";

#[derive(Clone)]
pub struct GroupService {
    repo: GroupRepository,
    pool: PgPool,
}

impl GroupService {
    pub fn new(repo: GroupRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<Group>, AppError> {
        self.repo.list().await
    }

    pub async fn create(&self, name: &str) -> Result<Group, AppError> {
        let name = required(name, "Informe o nome do grupo.")?;
        let group = self.repo.create(name).await?;
        tracing::info!("📁 Grupo '{}' criado", group.name);
        Ok(group)
    }

    pub async fn detail(&self, id: i32) -> Result<GroupDetail, AppError> {
        let group = self
            .repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(GROUP_NOT_FOUND.into()))?;
        let fields = self.repo.list_fields_by_label(id).await?;

        Ok(GroupDetail { id: group.id, name: group.name, fields })
    }

    /// As lojas do grupo continuam existindo, só perdem o vínculo.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let deleted = self.repo.delete(&mut tx, id).await?;
        if !deleted {
            return Err(AppError::NotFound(GROUP_NOT_FOUND.into()));
        }
        tx.commit().await?;

        tracing::info!("🗑️ Grupo {} removido", id);
        Ok(())
    }

    // --- Campos ---

    pub async fn add_field(&self, group_id: i32, label: &str) -> Result<ReportField, AppError> {
        let label = required(label, "Informe o rótulo do campo.")?;
        self.repo
            .create_field(group_id, &field_name_from_label(label), label)
            .await
    }

    /// Devolve o grupo do campo removido.
    pub async fn delete_field(&self, field_id: i32) -> Result<i32, AppError> {
        self.repo
            .delete_field(field_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Campo não encontrado.".into()))
    }

    pub async fn field_options(&self, group_id: i32) -> Result<Vec<FieldOption>, AppError> {
        self.repo.field_options(group_id).await
    }
}
