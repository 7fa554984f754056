// PostgreSQL credential store

use crate::auth::models::{NewRefreshToken, NewUser, RefreshTokenRecord, User};
use crate::auth::repository::{CredentialStore, ACCOUNT_EXISTS};
use crate::error::ApiError;
use crate::users::models::UpdateUserRequest;
use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, is_email_verified, is_archived, \
     archived_at, title, profile_image, linkedin, is_investor, created_at";

/// Credential store backed by the `users` and `refresh_tokens` tables
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new PgCredentialStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&user.name)
        .bind(user.email.to_lowercase())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Concurrent signups race past the pre-check; the unique index settles it
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return ApiError::Validation(ACCOUNT_EXISTS.to_string());
                }
            }
            ApiError::Database(e)
        })
    }

    async fn mark_email_verified(&self, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("UPDATE users SET is_email_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_password(
        &self,
        id: &str,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<bool, ApiError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2 AND password_hash = $3")
                .bind(new_hash)
                .bind(id)
                .bind(current_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_profile(
        &self,
        id: &str,
        update: &UpdateUserRequest,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                title = COALESCE($2, title),
                profile_image = COALESCE($3, profile_image),
                linkedin = COALESCE($4, linkedin),
                is_investor = COALESCE($5, is_investor)
            WHERE id = $6
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&update.name)
        .bind(&update.title)
        .bind(&update.profile_image)
        .bind(&update.linkedin)
        .bind(update.is_investor)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn archive_user(&self, id: &str, archived_at: DateTime<Utc>) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE users SET is_archived = TRUE, archived_at = $1 WHERE id = $2 AND NOT is_archived",
        )
        .bind(archived_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, ApiError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            INSERT INTO refresh_tokens (id, user_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, ip_address, user_agent, issued_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&token.user_id)
        .bind(&token.ip_address)
        .bind(&token.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_refresh_token(&self, id: &str) -> Result<Option<RefreshTokenRecord>, ApiError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT id, user_id, ip_address, user_agent, issued_at FROM refresh_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_refresh_token(&self, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: &str) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
