// In-memory credential store for tests and local runs

use crate::auth::models::{NewRefreshToken, NewUser, RefreshTokenRecord, User};
use crate::auth::repository::{CredentialStore, ACCOUNT_EXISTS};
use crate::error::ApiError;
use crate::users::models::UpdateUserRequest;
use axum::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

/// Credential store holding everything in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCredentialStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refresh token records currently stored
    pub async fn refresh_token_count(&self) -> usize {
        self.tables.read().await.refresh_tokens.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.email.to_lowercase() == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let email = user.email.to_lowercase();
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|existing| existing.email == email) {
            return Err(ApiError::Validation(ACCOUNT_EXISTS.to_string()));
        }

        let record = User {
            id: Uuid::new_v4().to_string(),
            name: user.name,
            email,
            password_hash: user.password_hash,
            is_email_verified: false,
            is_archived: false,
            archived_at: None,
            title: None,
            profile_image: None,
            linkedin: None,
            is_investor: false,
            created_at: Utc::now(),
        };
        tables.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn mark_email_verified(&self, id: &str) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(id) {
            Some(user) => {
                user.is_email_verified = true;
                true
            }
            None => false,
        })
    }

    async fn update_password(
        &self,
        id: &str,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(id) {
            Some(user) if user.password_hash == current_hash => {
                user.password_hash = new_hash.to_string();
                true
            }
            _ => false,
        })
    }

    async fn update_profile(
        &self,
        id: &str,
        update: &UpdateUserRequest,
    ) -> Result<Option<User>, ApiError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(title) = &update.title {
            user.title = Some(title.clone());
        }
        if let Some(profile_image) = &update.profile_image {
            user.profile_image = Some(profile_image.clone());
        }
        if let Some(linkedin) = &update.linkedin {
            user.linkedin = Some(linkedin.clone());
        }
        if let Some(is_investor) = update.is_investor {
            user.is_investor = is_investor;
        }
        Ok(Some(user.clone()))
    }

    async fn archive_user(&self, id: &str, archived_at: DateTime<Utc>) -> Result<bool, ApiError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(id) {
            Some(user) if !user.is_archived => {
                user.is_archived = true;
                user.archived_at = Some(archived_at);
                true
            }
            _ => false,
        })
    }

    async fn create_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, ApiError> {
        let record = RefreshTokenRecord {
            id: Uuid::new_v4().to_string(),
            user_id: token.user_id,
            ip_address: token.ip_address,
            user_agent: token.user_agent,
            issued_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .refresh_tokens
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_refresh_token(&self, id: &str) -> Result<Option<RefreshTokenRecord>, ApiError> {
        Ok(self.tables.read().await.refresh_tokens.get(id).cloned())
    }

    async fn delete_refresh_token(&self, id: &str) -> Result<bool, ApiError> {
        Ok(self.tables.write().await.refresh_tokens.remove(id).is_some())
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: &str) -> Result<u64, ApiError> {
        let mut tables = self.tables.write().await;
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|_, record| record.user_id != user_id);
        Ok((before - tables.refresh_tokens.len()) as u64)
    }
}
