// Authentication gate for protected routes

use crate::auth::models::AuthenticatedUser;
use crate::auth::token::{AccessTokenError, AccessTokenIssuer};
use crate::config::PublicRoutes;
use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub const MISSING_TOKEN: &str = "Missing token. Check permissions and try again";
pub const MALFORMED_TOKEN: &str = "Token malformed. Fix and try again";
pub const INVALID_TOKEN_TYPE: &str = "Invalid token type. Check permissions and try again";
pub const UNAUTHORIZED_TOKEN: &str = "Unauthorized access token. Check permissions and try again";

/// Decides whether a request needs an access token and checks it
#[derive(Debug, Clone)]
pub struct AuthGate {
    access_tokens: AccessTokenIssuer,
    public_routes: PublicRoutes,
}

impl AuthGate {
    pub fn new(access_tokens: AccessTokenIssuer, public_routes: PublicRoutes) -> Self {
        Self {
            access_tokens,
            public_routes,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes.is_public(path)
    }

    /// Resolve the caller from an `Authorization` header value
    ///
    /// A blank header counts as missing.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<AuthenticatedUser, ApiError> {
        let value = authorization
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ApiError::Authentication(MISSING_TOKEN.to_string()))?;

        let token = value
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Authentication(MALFORMED_TOKEN.to_string()))?;

        self.access_tokens
            .verify_access_token(token)
            .map_err(|err| match err {
                AccessTokenError::InvalidType => ApiError::Authorization(INVALID_TOKEN_TYPE.to_string()),
                AccessTokenError::Token(_) => ApiError::Authorization(UNAUTHORIZED_TOKEN.to_string()),
            })
    }
}

/// Middleware entry point
///
/// Public paths pass straight through. Everything else must carry a valid
/// access token; the resolved identity is stored in the request extensions.
pub async fn auth_gate(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    if gate.is_public(&path) {
        return Ok(next.run(request).await);
    }

    // A non-UTF-8 header is treated like a malformed one
    let authorization = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| ApiError::Authentication(MALFORMED_TOKEN.to_string()))?,
        ),
        None => None,
    };

    let user = gate.authenticate(authorization).map_err(|err| {
        warn!("Rejected request to protected endpoint {}: {}", path, err);
        err
    })?;

    debug!("Authenticated user {} for {}", user.id, path);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Authentication(MISSING_TOKEN.to_string()))
    }
}
