// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserRole},
        promoter::{PromoterExportRow, PromoterSummary},
    },
};

const DUPLICATE_PROMOTER: &str = "Já existe uma promotora com esse telefone ou CPF.";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

/// Campos de perfil gravados junto com o usuário.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub full_name: Option<&'a str>,
    pub cpf: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Login
    // ---

    pub async fn find_promoter_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE phone = $1 AND role = 'promotora'",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_master_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = $1 AND role = 'master'",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn master_exists(&self) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = 'master')")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    // Cria um usuário (promotora ou master) com tratamento de duplicidade
    pub async fn create_user<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, cpf, phone, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new_user.username)
        .bind(new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.full_name)
        .bind(new_user.cpf)
        .bind(new_user.phone)
        .bind(new_user.city)
        .bind(new_user.state)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_PROMOTER))
    }

    // ---
    // Promotoras (área administrativa)
    // ---

    pub async fn list_promoters(&self) -> Result<Vec<PromoterSummary>, AppError> {
        let promoters = sqlx::query_as::<_, PromoterSummary>(
            r#"
            SELECT
                u.id, u.full_name, u.cpf, u.phone, u.city, u.state, u.active,
                COUNT(ps.store_id) AS total_stores
            FROM users u
            LEFT JOIN promoter_stores ps ON u.id = ps.user_id
            WHERE u.role = 'promotora'
            GROUP BY u.id
            ORDER BY u.full_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(promoters)
    }

    pub async fn find_promoter(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND role = 'promotora'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Atualiza o perfil (o username acompanha o telefone). Devolve `false` se a promotora não existe.
    pub async fn update_promoter<'e, E>(
        &self,
        executor: E,
        id: i32,
        full_name: &str,
        cpf: Option<&str>,
        phone: &str,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $1, cpf = $2, phone = $3, username = $3, city = $4, state = $5
            WHERE id = $6 AND role = 'promotora'
            "#,
        )
        .bind(full_name)
        .bind(cpf)
        .bind(phone)
        .bind(city)
        .bind(state)
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_PROMOTER))?;

        Ok(result.rows_affected() > 0)
    }

    /// Inverte o flag `active` e devolve o novo valor.
    pub async fn toggle_active(&self, id: i32) -> Result<Option<bool>, AppError> {
        let active = sqlx::query_scalar::<_, bool>(
            "UPDATE users SET active = NOT active WHERE id = $1 AND role = 'promotora' RETURNING active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active)
    }

    /// Upsert da importação: a chave natural é o telefone (que também vira o username).
    /// A senha só é usada quando a promotora é nova.
    pub async fn upsert_promoter_by_phone<'e, E>(
        &self,
        executor: E,
        phone: &str,
        password_hash: &str,
        full_name: Option<&str>,
        cpf: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, cpf, phone, city, state)
            VALUES ($1, $2, 'promotora', $3, $4, $1, $5, $6)
            ON CONFLICT (phone) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                cpf = EXCLUDED.cpf,
                city = EXCLUDED.city,
                state = EXCLUDED.state
            RETURNING id
            "#,
        )
        .bind(phone)
        .bind(password_hash)
        .bind(full_name)
        .bind(cpf)
        .bind(city)
        .bind(state)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn export_promoters(&self) -> Result<Vec<PromoterExportRow>, AppError> {
        let rows = sqlx::query_as::<_, PromoterExportRow>(
            r#"
            SELECT
                u.full_name, u.cpf, u.phone, u.city, u.state,
                s.cnpj AS store_cnpj, g.name AS group_name
            FROM users u
            JOIN promoter_stores ps ON u.id = ps.user_id
            JOIN stores s ON ps.store_id = s.id
            LEFT JOIN groups g ON s.group_id = g.id
            WHERE u.role = 'promotora'
            ORDER BY u.full_name, s.company_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
