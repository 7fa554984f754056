// Token-level error types and their mapping onto the API taxonomy

use crate::error::ApiError;
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Failures raised by the token codec
///
/// Callers react differently to each kind: an expired token asks for a new
/// sign-in, a malformed one is rejected outright, a bad signature is treated
/// as tampering.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("jwt malformed")]
    Malformed,

    #[error("jwt expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token signing secret is not configured")]
    Configuration,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Inside the authentication flows a bad token means identity was not established
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::Expired | TokenError::InvalidSignature => {
                ApiError::Authentication(err.to_string())
            }
            TokenError::Configuration => ApiError::Configuration(err.to_string()),
            TokenError::Encoding(msg) => ApiError::Internal(msg),
        }
    }
}
