// src/services/auth.rs

use bcrypt::{hash, verify};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, UserRepository},
    models::auth::{CurrentUser, User, UserRole},
};

pub const MASTER_USERNAME: &str = "master";
const MASTER_DISPLAY_NAME: &str = "Administrador Master";

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    pool: PgPool,
}

/// Gera o hash fora do runtime async (bcrypt é CPU-bound).
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    // Executa a verificação em um thread separado
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

impl AuthService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    /// Tenta primeiro como promotora (telefone) e depois como master (usuário).
    /// Qualquer divergência devolve a mesma mensagem, sem dizer qual campo errou.
    pub async fn login(&self, login: &str, password: &str) -> Result<CurrentUser, AppError> {
        let login = login.trim();

        if let Some(promoter) = self.user_repo.find_promoter_by_phone(login).await? {
            if self.password_matches(&promoter, password).await? {
                if !promoter.active {
                    return Err(AppError::InactiveUser);
                }
                tracing::info!("🔑 Login de promotora: {}", promoter.id);
                return Ok(CurrentUser::from_user(&promoter));
            }
        }

        if let Some(master) = self.user_repo.find_master_by_username(login).await? {
            if self.password_matches(&master, password).await? {
                tracing::info!("🔑 Login de administrador: {}", master.id);
                return Ok(CurrentUser::from_user(&master));
            }
        }

        Err(AppError::InvalidCredentials)
    }

    async fn password_matches(&self, user: &User, password: &str) -> Result<bool, AppError> {
        // Hash corrompido no banco conta como senha errada, não como 500
        match verify_password(password, &user.password_hash).await {
            Ok(valid) => Ok(valid),
            Err(AppError::BcryptError(e)) => {
                tracing::warn!("Hash inválido para o usuário {}: {}", user.id, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Recarrega o usuário da sessão (para o /me e para detectar contas removidas).
    pub async fn current_user(&self, id: i32) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotAuthenticated)
    }

    /// Cria a conta master na primeira subida, se ainda não houver administrador.
    pub async fn ensure_master_user(&self, password: &str) -> Result<(), AppError> {
        if self.user_repo.master_exists().await? {
            return Ok(());
        }

        let password_hash = hash_password(password).await?;
        self.user_repo
            .create_user(
                &self.pool,
                NewUser {
                    username: MASTER_USERNAME,
                    password_hash: &password_hash,
                    role: UserRole::Master,
                    full_name: Some(MASTER_DISPLAY_NAME),
                    cpf: None,
                    phone: None,
                    city: None,
                    state: None,
                },
            )
            .await?;

        tracing::info!("👤 Usuário '{}' criado.", MASTER_USERNAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("hub@11999998888").await.unwrap();
        assert!(verify_password("hub@11999998888", &hashed).await.unwrap());
        assert!(!verify_password("outra", &hashed).await.unwrap());
    }
}
