// HTTP handlers for authentication endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::auth::{
    connection::ConnectionMetadata,
    models::{
        AccessTokenResponse, ForgotPasswordRequest, LinkTokenRequest, MessageResponse,
        RefreshRequest, ResetPasswordRequest, SigninRequest, SignoutRequest, SignupRequest,
        TokenPairResponse,
    },
};
use crate::error::{ApiError, ErrorResponse};
use crate::AppState;

/// A missing or unreadable body behaves like an empty one, so that field
/// checks report which value is missing
fn body_or_default<T: Default>(payload: Option<Json<T>>) -> T {
    payload.map(|Json(body)| body).unwrap_or_default()
}

/// Register a new account
/// POST /auth/signup
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = TokenPairResponse),
        (status = 400, description = "Missing or invalid field, or account already exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    connection: ConnectionMetadata,
    payload: Option<Json<SignupRequest>>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let tokens = state
        .auth_service
        .signup(body_or_default(payload), &connection)
        .await?;
    Ok(Json(tokens))
}

/// Sign in with email and password
/// POST /auth/signin
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPairResponse),
        (status = 400, description = "Missing credentials or unknown account", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 410, description = "Account deleted", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signin_handler(
    State(state): State<AppState>,
    connection: ConnectionMetadata,
    payload: Option<Json<SigninRequest>>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let tokens = state
        .auth_service
        .signin(body_or_default(payload), &connection)
        .await?;
    Ok(Json(tokens))
}

/// Sign out, revoking the refresh token when one is given
/// POST /auth/signout
#[utoipa::path(
    post,
    path = "/auth/signout",
    request_body = SignoutRequest,
    responses(
        (status = 200, description = "Signed out", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn signout_handler(
    State(state): State<AppState>,
    payload: Option<Json<SignoutRequest>>,
) -> Json<MessageResponse> {
    let request = body_or_default(payload);
    state
        .auth_service
        .signout(request.refresh_token.as_deref())
        .await;
    Json(MessageResponse::new("Signed out"))
}

/// Exchange a refresh token for a new access token
/// POST /auth/refresh
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 400, description = "Refresh token or connection details missing", body = ErrorResponse),
        (status = 401, description = "Invalid, revoked or rebound refresh token", body = ErrorResponse),
        (status = 410, description = "Account deleted", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    connection: ConnectionMetadata,
    payload: Option<Json<RefreshRequest>>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let response = state
        .auth_service
        .refresh(body_or_default(payload), &connection)
        .await?;
    Ok(Json(response))
}

/// Confirm an email address from an emailed link
/// POST /auth/confirm-email
#[utoipa::path(
    post,
    path = "/auth/confirm-email",
    params(
        ("token" = Option<String>, Query, description = "Email confirmation token")
    ),
    request_body = LinkTokenRequest,
    responses(
        (status = 200, description = "Email confirmed", body = MessageResponse),
        (status = 400, description = "Missing token or unknown account", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Token is not an email confirmation token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn confirm_email_handler(
    State(state): State<AppState>,
    Query(query): Query<LinkTokenRequest>,
    payload: Option<Json<LinkTokenRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = query.token.or_else(|| body_or_default(payload).token);
    state.auth_service.confirm_email(token).await?;
    Ok(Json(MessageResponse::new("Email confirmed")))
}

/// Confirm an email address by opening the emailed link
/// GET /auth/confirm-email
#[utoipa::path(
    get,
    path = "/auth/confirm-email",
    params(
        ("token" = Option<String>, Query, description = "Email confirmation token")
    ),
    responses(
        (status = 200, description = "Email confirmed", body = MessageResponse),
        (status = 400, description = "Missing token or unknown account", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Token is not an email confirmation token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn confirm_email_link_handler(
    State(state): State<AppState>,
    Query(query): Query<LinkTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.confirm_email(query.token).await?;
    Ok(Json(MessageResponse::new("Email confirmed")))
}

/// Request a password reset link
/// POST /auth/forgot-password
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .forgot_password(body_or_default(payload))
        .await?;
    Ok(Json(MessageResponse::new(
        "If the account exists, a reset link has been sent",
    )))
}

/// Choose a new password with a reset link
/// POST /auth/reset-password
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing token or password", body = ErrorResponse),
        (status = 401, description = "Invalid, expired or used token", body = ErrorResponse),
        (status = 403, description = "Token is not a password reset token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .reset_password(body_or_default(payload))
        .await?;
    Ok(Json(MessageResponse::new("Password changed")))
}
