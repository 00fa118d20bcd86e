//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (login identifier)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id != $2)")
                .bind(email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new user; `password_hash` must already be hashed
    pub async fn create(&self, user: &CreateUser, role: Role, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role, phone, address, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(role)
        .bind(&user.phone)
        .bind(&user.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::conflict_on_constraint(e, format!("Email already exists: {}", user.email)))
    }

    /// Apply a partial update under a row lock
    pub async fn update(
        &self,
        id: i64,
        update: UpdateUser,
        role: Option<Role>,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let mut user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        user.apply_update(update, role, password_hash);

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = $2, email = $3, password = $4, role = $5,
                phone = $6, address = $7, is_active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::conflict_on_constraint(e, format!("Email already exists: {}", user.email)))?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a user.
    ///
    /// Accounts that processed any issue are kept for the loan history;
    /// deactivate them instead.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        let processed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE user_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if processed > 0 {
            return Err(AppError::Conflict(format!(
                "User with id {} has processed {} issues; deactivate the account instead",
                id, processed
            )));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::conflict_on_constraint(e, format!("User with id {} is referenced by issues", id))
            })?;

        tx.commit().await?;
        Ok(())
    }

    /// Count all users
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
