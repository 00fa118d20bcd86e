//! Staff directory service

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, UpdateUser, User},
    repository::Repository,
};

use super::auth::hash_password;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all staff accounts
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Get user by ID
    pub async fn get_user(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Partially update an account.
    ///
    /// A non-empty password is re-hashed; an empty one leaves the stored hash alone.
    pub async fn update_user(&self, id: i64, mut update: UpdateUser) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;

        let role = update
            .role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()?;

        let password_hash = match update.password.take() {
            Some(password) if !password.is_empty() => Some(hash_password(&password)?),
            _ => None,
        };

        if let Some(email) = update.email.as_mut() {
            *email = email.trim().to_lowercase();
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!("Email already exists: {}", email)));
            }
        }

        self.repository.users.update(id, update, role, password_hash).await
    }

    /// Delete an account that never processed a loan
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
