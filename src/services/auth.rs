//! Authentication service: login, registration and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, User, UserClaims},
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a plain password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, returning a signed token and the profile
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let email = email.trim().to_lowercase();

        let user = match self.repository.users.get_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login rejected for unknown email {}", email);
                return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&user.password, password)? {
            tracing::warn!("Login rejected for {}: wrong password", email);
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            tracing::warn!("Login rejected for {}: account inactive", email);
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        let token = self.create_token(&user)?;
        tracing::info!("User {} logged in", user.email);
        Ok((token, user))
    }

    /// Register a new staff account; role defaults to LIBRARIAN
    pub async fn register(&self, mut request: CreateUser) -> AppResult<User> {
        request.email = request.email.trim().to_lowercase();

        let role = match request.role.as_deref() {
            Some(role) if !role.trim().is_empty() => role.parse::<Role>()?,
            _ => Role::Librarian,
        };

        if self.repository.users.email_exists(&request.email, None).await? {
            return Err(AppError::Conflict(format!("Email already exists: {}", request.email)));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self.repository.users.create(&request, role, &password_hash).await?;

        tracing::info!("Registered {} account {}", user.role, user.email);
        Ok(user)
    }

    /// Profile of the account a token was issued to
    pub async fn me(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository
            .users
            .get_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with email: {}", claims.sub)))
    }

    /// Sign a time-bound token binding the user's email and role
    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}
