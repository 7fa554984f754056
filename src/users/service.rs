use crate::auth::models::{AuthenticatedUser, User};
use crate::auth::refresh::RefreshTokenManager;
use crate::auth::repository::CredentialStoreArc;
use crate::auth::service::ensure_active;
use crate::error::ApiError;
use crate::users::models::UpdateUserRequest;
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

/// Service layer for profile reads, updates and account deletion
#[derive(Clone)]
pub struct UserService {
    store: CredentialStoreArc,
    refresh_tokens: RefreshTokenManager,
}

impl UserService {
    pub fn new(store: CredentialStoreArc, refresh_tokens: RefreshTokenManager) -> Self {
        Self {
            store,
            refresh_tokens,
        }
    }

    /// Load an active user
    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let user = self
            .store
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Validation("User not found".to_string()))?;
        ensure_active(&user)?;
        Ok(user)
    }

    /// Apply an allow-listed profile update
    ///
    /// This method:
    /// 1. Verifies the caller owns the profile
    /// 2. Rejects empty or invalid updates
    /// 3. Checks the account is still active
    /// 4. Stores the changes
    pub async fn update_user(
        &self,
        caller: &AuthenticatedUser,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        require_owner(caller, id)?;

        if request.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        request
            .validate()
            .map_err(|e| ApiError::Validation(format!("Validation failed: {}", e)))?;

        self.get_user(id).await?;

        self.store
            .update_profile(id, &request)
            .await?
            .ok_or_else(|| ApiError::Validation("User not found".to_string()))
    }

    /// Soft-delete the caller's account and end all of its sessions
    pub async fn archive_user(&self, caller: &AuthenticatedUser, id: &str) -> Result<(), ApiError> {
        require_owner(caller, id)?;
        self.get_user(id).await?;

        // Sessions go first so a failed revoke leaves the account untouched
        self.refresh_tokens.revoke_all_for_user(id).await?;
        if !self.store.archive_user(id, Utc::now()).await? {
            return Err(ApiError::Archived("Account already deleted".to_string()));
        }

        info!("User {} archived their account", id);
        Ok(())
    }
}

fn require_owner(caller: &AuthenticatedUser, id: &str) -> Result<(), ApiError> {
    if caller.id != id {
        warn!("User {} attempted to modify user {}", caller.id, id);
        return Err(ApiError::Authorization(
            "Cannot modify another user's account".to_string(),
        ));
    }
    Ok(())
}
