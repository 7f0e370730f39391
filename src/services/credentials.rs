use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::User;

/// User identities and their argon2 password hashes.
#[derive(Clone)]
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = email.trim();
        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))?
            .to_string();

        let user: User = sqlx::query_as(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(email)
        .bind(&password_hash)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.db)
        .await
        .map_err(|e| ServiceError::unique_or(e, || ServiceError::DuplicateIdentity(email.to_string())))?;

        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Check an email and password pair. Unknown emails and wrong passwords
    /// both yield `AuthenticationFailure`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .find_by_email(email.trim())
            .await?
            .ok_or(ServiceError::AuthenticationFailure)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| ServiceError::AuthenticationFailure)?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}
