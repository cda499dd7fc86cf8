use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;

use super::is_unique_violation;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User already exists")]
    AlreadyExists,
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub async fn new() -> Result<Self, UserError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Insert a new password-based account. Uniqueness on email is enforced
    /// by the storage constraint; the handler's pre-check is UX only.
    pub async fn create(
        &self,
        email: &str,
        password_hash: Option<&str>,
        name: Option<&str>,
        verification_token: Option<&str>,
        verification_expires: Option<DateTime<Utc>>,
    ) -> Result<User, UserError> {
        let email_verified = password_hash.is_none(); // federated accounts are verified by policy
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (email, password_hash, name, email_verified,
                 email_verification_token, email_verification_expires)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(email_verified)
        .bind(verification_token)
        .bind(verification_expires)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UserError::AlreadyExists
            } else {
                UserError::Database(e)
            }
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email_verification_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Flip the verified flag and clear the token fields in one statement.
    pub async fn mark_verified(&self, id: i64) -> Result<(), UserError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = TRUE,
                email_verification_token = NULL,
                email_verification_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn rotate_verification_token(
        &self,
        id: i64,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), UserError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verification_token = $2,
                email_verification_expires = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
