// Access token issuance and verification

use crate::auth::codec::TokenCodec;
use crate::auth::error::TokenError;
use crate::auth::models::{AccessTokenPayload, AuthType, AuthenticatedUser, User};
use crate::error::ApiError;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why an access token was refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessTokenError {
    /// The token verified but is not an access token
    #[error("invalid token type")]
    InvalidType,

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Issues short-lived access tokens
#[derive(Debug, Clone)]
pub struct AccessTokenIssuer {
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl AccessTokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self { codec, ttl }
    }

    /// Sign `{id, authType: ACCESS}` for the user
    pub fn create_access_token(&self, user: &User) -> Result<String, ApiError> {
        if user.id.is_empty() {
            return Err(ApiError::InvalidArgument("User id not provided".to_string()));
        }

        let payload = AccessTokenPayload {
            id: user.id.clone(),
            auth_type: AuthType::Access,
        };
        Ok(self.codec.sign(&payload, self.ttl)?)
    }

    /// Verify a token and require it to be an access token
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser, AccessTokenError> {
        let data: Map<String, Value> = self.codec.verify(token)?;

        if data.get("authType").and_then(Value::as_str) != Some(AuthType::Access.as_str()) {
            return Err(AccessTokenError::InvalidType);
        }

        let payload: AccessTokenPayload =
            serde_json::from_value(Value::Object(data)).map_err(|_| TokenError::Malformed)?;
        Ok(AuthenticatedUser { id: payload.id })
    }
}
