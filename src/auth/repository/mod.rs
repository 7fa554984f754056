// Credential storage: users and refresh token records

use crate::auth::models::{NewRefreshToken, NewUser, RefreshTokenRecord, User};
use crate::error::ApiError;
use crate::users::models::UpdateUserRequest;
use axum::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Message returned when an email is already registered
pub const ACCOUNT_EXISTS: &str = "Account already exists";

/// Persistence seam for the authentication core
///
/// Emails are stored case-folded and looked up case-insensitively. Creating
/// a user whose email already exists fails with
/// `ApiError::Validation(ACCOUNT_EXISTS)`; this is the authoritative
/// uniqueness check.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError>;
    async fn mark_email_verified(&self, id: &str) -> Result<bool, ApiError>;
    /// Replace the hash only while it still equals `current_hash`
    async fn update_password(
        &self,
        id: &str,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<bool, ApiError>;
    async fn update_profile(
        &self,
        id: &str,
        update: &UpdateUserRequest,
    ) -> Result<Option<User>, ApiError>;
    async fn archive_user(&self, id: &str, archived_at: DateTime<Utc>) -> Result<bool, ApiError>;

    async fn create_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, ApiError>;
    async fn find_refresh_token(&self, id: &str) -> Result<Option<RefreshTokenRecord>, ApiError>;
    async fn delete_refresh_token(&self, id: &str) -> Result<bool, ApiError>;
    async fn delete_refresh_tokens_for_user(&self, user_id: &str) -> Result<u64, ApiError>;
}

pub type CredentialStoreArc = Arc<dyn CredentialStore>;
