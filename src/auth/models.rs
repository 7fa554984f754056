// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// User identifier (UUID v4 rendered as a string)
pub type UserId = String;

/// Refresh token record identifier
pub type TokenId = String;

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub profile_image: Option<String>,
    pub linkedin: Option<String>,
    pub is_investor: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Refresh token database model
///
/// The connection metadata captured at issuance is what later requests are
/// checked against.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshTokenRecord {
    pub id: TokenId,
    pub user_id: UserId,
    pub ip_address: String,
    pub user_agent: String,
    pub issued_at: DateTime<Utc>,
}

/// Fields needed to insert a refresh token record
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: UserId,
    pub ip_address: String,
    pub user_agent: String,
}

/// Kind marker carried in every signed token under `data.authType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthType {
    Access,
    Refresh,
    EmailConfirmation,
    PasswordReset,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Access => "ACCESS",
            AuthType::Refresh => "REFRESH",
            AuthType::EmailConfirmation => "EMAIL_CONFIRMATION",
            AuthType::PasswordReset => "PASSWORD_RESET",
        }
    }
}

/// Payload of an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub id: UserId,
    pub auth_type: AuthType,
}

/// Payload of a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenPayload {
    pub refresh_token_id: TokenId,
    pub auth_type: AuthType,
}

/// Identity attached to a request once the auth gate accepted its access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
}

/// Signup request DTO
///
/// Fields are optional so that missing values produce field-specific messages.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "correct horse battery staple")]
    pub password: Option<String>,
}

/// Signin request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signout request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignoutRequest {
    pub refresh_token: Option<String>,
}

/// Token refresh request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Link token carried by confirm-email, in the query string or the body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LinkTokenRequest {
    pub token: Option<String>,
}

/// Forgot password request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Reset password request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// Access + refresh token pair returned by signup and signin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Access token returned by refresh
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
