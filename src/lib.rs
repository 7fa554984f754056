pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod users;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    codec::TokenCodec,
    models::{
        AccessTokenResponse, ForgotPasswordRequest, LinkTokenRequest, MessageResponse,
        RefreshRequest, ResetPasswordRequest, SigninRequest, SignoutRequest, SignupRequest,
        TokenPairResponse,
    },
    AccessTokenIssuer, AuthGate, AuthService, CredentialStoreArc, LinkTokenIssuer, MailSettings,
    PasswordService, RefreshTokenManager,
};
use config::AppConfig;
use email::EmailSenderArc;
use error::{ApiError, ErrorBody, ErrorResponse};
use users::{UpdateUserRequest, UserResponse, UserService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::signin_handler,
        auth::handlers::signout_handler,
        auth::handlers::refresh_handler,
        auth::handlers::confirm_email_handler,
        auth::handlers::confirm_email_link_handler,
        auth::handlers::forgot_password_handler,
        auth::handlers::reset_password_handler,
        users::handlers::get_current_user_handler,
        users::handlers::get_user_handler,
        users::handlers::update_user_handler,
        users::handlers::delete_user_handler,
    ),
    components(
        schemas(
            SignupRequest,
            SigninRequest,
            SignoutRequest,
            RefreshRequest,
            LinkTokenRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            TokenPairResponse,
            AccessTokenResponse,
            MessageResponse,
            UpdateUserRequest,
            UserResponse,
            ErrorResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, sign-in, sessions and email links"),
        (name = "users", description = "User profiles")
    ),
    info(
        title = "ConnectOrlando API",
        version = "1.0.0",
        description = "Authentication and session core for the ConnectOrlando platform"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    /// Wire every service from configuration and the injected backends
    ///
    /// Fails when no signing secret is configured outside development and test.
    pub fn new(
        config: &AppConfig,
        store: CredentialStoreArc,
        mailer: EmailSenderArc,
    ) -> Result<Self, ApiError> {
        let auth = &config.auth;
        let codec = Arc::new(TokenCodec::from_config(auth)?);

        let access_tokens = AccessTokenIssuer::new(codec.clone(), auth.access_token_ttl);
        let refresh_tokens =
            RefreshTokenManager::new(codec.clone(), store.clone(), auth.refresh_token_ttl);
        let links = LinkTokenIssuer::new(
            codec,
            auth.email_confirmation_ttl,
            auth.password_reset_ttl,
        );

        let auth_service = AuthService::new(
            store.clone(),
            access_tokens.clone(),
            refresh_tokens.clone(),
            links,
            PasswordService::new(auth.password_hash_timeout),
            mailer,
            MailSettings {
                from: config.email.from.clone(),
                base_url: config.email.base_url.clone(),
                client_url: config.email.client_url.clone(),
                timeout: config.email.timeout,
            },
        );

        Ok(Self {
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(UserService::new(store, refresh_tokens)),
            gate: Arc::new(AuthGate::new(access_tokens, auth.public_routes.clone())),
        })
    }
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<div style="text-align: center"><h1>ConnectOrlando API</h1><p>&copy;2023 ConnectOrlando</p></div>"#,
    )
}

async fn robots() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "User-agent: *\nDisallow: /")
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new("Endpoint does not exist")),
    )
}

/// Creates and configures the application router
///
/// The auth gate wraps the API routes only; the landing page, robots.txt,
/// Swagger UI and the 404 fallback never require a token.
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/signin", post(auth::signin_handler))
        .route("/auth/signout", post(auth::signout_handler))
        .route("/auth/refresh", post(auth::refresh_handler))
        .route(
            "/auth/confirm-email",
            get(auth::confirm_email_link_handler).post(auth::confirm_email_handler),
        )
        .route("/auth/forgot-password", post(auth::forgot_password_handler))
        .route("/auth/reset-password", post(auth::reset_password_handler))
        .route("/user", get(users::get_current_user_handler))
        .route(
            "/user/:id",
            get(users::get_user_handler)
                .patch(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            auth::auth_gate,
        ));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(index))
        .route("/robots.txt", get(robots))
        .merge(api)
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}
