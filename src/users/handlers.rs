// HTTP handlers for user profile endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::models::{AuthenticatedUser, MessageResponse};
use crate::error::{ApiError, ErrorResponse};
use crate::users::models::{UpdateUserRequest, UserResponse};
use crate::AppState;

/// Get the signed-in user's profile
/// GET /user
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or malformed token", body = ErrorResponse),
        (status = 403, description = "Invalid access token", body = ErrorResponse),
        (status = 410, description = "Account deleted", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_current_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(&user.id).await?;
    Ok(Json(user.into()))
}

/// Get a user's profile
/// GET /user/{id}
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "User not found", body = ErrorResponse),
        (status = 410, description = "Account deleted", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(&id).await?;
    Ok(Json(user.into()))
}

/// Update the caller's own profile
/// PATCH /user/{id}
#[utoipa::path(
    patch,
    path = "/user/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Nothing to update or invalid value", body = ErrorResponse),
        (status = 403, description = "Not the owner of this profile", body = ErrorResponse),
        (status = 410, description = "Account deleted", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Option<Json<UpdateUserRequest>>,
) -> Result<Json<UserResponse>, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let updated = state.user_service.update_user(&user, &id, request).await?;
    Ok(Json(updated.into()))
}

/// Delete (archive) the caller's own account
/// DELETE /user/{id}
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 403, description = "Not the owner of this account", body = ErrorResponse),
        (status = 410, description = "Account already deleted", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.archive_user(&user, &id).await?;
    Ok(Json(MessageResponse::new("Account deleted")))
}
