// Error handling module for the Connect API
// Provides the error taxonomy shared by every handler and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use tracing::{debug, error, warn};

/// Main error type for the API
/// All handlers return Result<T, ApiError>
///
/// Each variant maps to one HTTP status code. Server-side variants keep their
/// detail for the logs and send a generic message to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input
    /// Maps to HTTP 400 Bad Request
    #[error("{0}")]
    Validation(String),

    /// A required argument was not supplied to an auth component
    /// Maps to HTTP 400 Bad Request
    #[error("{0}")]
    InvalidArgument(String),

    /// Identity could not be established
    /// Maps to HTTP 401 Unauthorized
    #[error("{0}")]
    Authentication(String),

    /// Identity established but the token or claim is not acceptable
    /// Maps to HTTP 403 Forbidden
    #[error("{0}")]
    Authorization(String),

    /// Resource was soft-deleted
    /// Maps to HTTP 410 Gone
    #[error("{0}")]
    Archived(String),

    /// The process cannot operate safely with its configuration
    /// Maps to HTTP 500
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Database operation errors
    /// Maps to HTTP 500
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else that went wrong on our side
    /// Maps to HTTP 500
    #[error("internal error: {0}")]
    Internal(String),
}

/// Body of every error response: `{"error": {"message", "statusCode"}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::Archived(_) => StatusCode::GONE,
            ApiError::Configuration(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message that is safe to send to clients
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::InvalidArgument(msg)
            | ApiError::Authentication(msg)
            | ApiError::Authorization(msg)
            | ApiError::Archived(msg) => msg.clone(),
            ApiError::Configuration(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    fn log(&self) {
        match self {
            ApiError::Validation(msg) | ApiError::InvalidArgument(msg) => {
                debug!("Rejected request: {}", msg)
            }
            ApiError::Archived(msg) => debug!("Archived resource requested: {}", msg),
            ApiError::Authentication(msg) => warn!("Authentication failed: {}", msg),
            ApiError::Authorization(msg) => warn!("Authorization failed: {}", msg),
            ApiError::Configuration(msg) => error!("Configuration error: {}", msg),
            ApiError::Database(err) => error!("Database error: {:?}", err),
            ApiError::Internal(msg) => error!("Internal error: {}", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                message: self.client_message(),
                status_code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidArgument("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Authentication("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Authorization("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Archived("x".into()).status_code(), StatusCode::GONE);
        assert_eq!(
            ApiError::Configuration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::Internal("connection string postgres://user:pw@db".into());
        assert_eq!(err.client_message(), "Internal server error");

        let err = ApiError::Configuration("JWT_SECRET missing".into());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::Authentication("Cannot verify login information".into());
        assert_eq!(err.client_message(), "Cannot verify login information");
    }
}
