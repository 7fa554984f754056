// Refresh token lifecycle: issue, extract, revoke

use crate::auth::codec::TokenCodec;
use crate::auth::connection::ConnectionMetadata;
use crate::auth::error::TokenError;
use crate::auth::models::{AuthType, NewRefreshToken, RefreshTokenPayload, RefreshTokenRecord, User};
use crate::auth::repository::CredentialStoreArc;
use crate::error::ApiError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Creates, validates and revokes refresh tokens
///
/// A refresh token is only honoured when its record still exists and the
/// caller presents the same IP address and user-agent it was issued to.
#[derive(Clone)]
pub struct RefreshTokenManager {
    codec: Arc<TokenCodec>,
    store: CredentialStoreArc,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(codec: Arc<TokenCodec>, store: CredentialStoreArc, ttl: Duration) -> Self {
        Self { codec, store, ttl }
    }

    /// Persist a record bound to `connection` and return its signed token
    pub async fn issue(&self, user: &User, connection: &ConnectionMetadata) -> Result<String, ApiError> {
        if user.id.is_empty() {
            return Err(ApiError::InvalidArgument("User id not provided".to_string()));
        }
        let (ip_address, user_agent) = connection.binding()?;

        let record = self
            .store
            .create_refresh_token(NewRefreshToken {
                user_id: user.id.clone(),
                ip_address: ip_address.to_string(),
                user_agent: user_agent.to_string(),
            })
            .await?;

        debug!("Issued refresh token {} for user {}", record.id, user.id);

        let payload = RefreshTokenPayload {
            refresh_token_id: record.id,
            auth_type: AuthType::Refresh,
        };
        Ok(self.codec.sign(&payload, self.ttl)?)
    }

    /// Resolve a signed refresh token to its record, checking the connection binding
    pub async fn extract(
        &self,
        signed_token: &str,
        connection: &ConnectionMetadata,
    ) -> Result<RefreshTokenRecord, ApiError> {
        let record = self.lookup(signed_token).await?;

        let (ip_address, user_agent) = connection.binding()?;
        if record.ip_address != ip_address || record.user_agent != user_agent {
            warn!(
                "Refresh token {} presented from a different connection (user {})",
                record.id, record.user_id
            );
            return Err(ApiError::Authentication(
                "User information does not match the refresh token. Sign in again".to_string(),
            ));
        }

        Ok(record)
    }

    /// Delete the record behind a signed refresh token
    ///
    /// Callers on the sign-out path log and drop the error.
    pub async fn revoke(&self, signed_token: &str) -> Result<(), ApiError> {
        let record = self.lookup(signed_token).await?;

        if !self.store.delete_refresh_token(&record.id).await? {
            return Err(ApiError::Authentication("Refresh token not found".to_string()));
        }

        debug!("Revoked refresh token {} for user {}", record.id, record.user_id);
        Ok(())
    }

    /// Delete every refresh token held by a user
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, ApiError> {
        let revoked = self.store.delete_refresh_tokens_for_user(user_id).await?;
        debug!("Revoked {} refresh tokens for user {}", revoked, user_id);
        Ok(revoked)
    }

    async fn lookup(&self, signed_token: &str) -> Result<RefreshTokenRecord, ApiError> {
        if signed_token.is_empty() {
            return Err(ApiError::InvalidArgument("Refresh token not provided".to_string()));
        }

        let payload: RefreshTokenPayload = self.codec.verify(signed_token)?;
        if payload.auth_type != AuthType::Refresh {
            return Err(TokenError::Malformed.into());
        }

        self.store
            .find_refresh_token(&payload.refresh_token_id)
            .await?
            .ok_or_else(|| ApiError::Authentication("Refresh token not found".to_string()))
    }
}
