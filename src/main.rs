use std::net::SocketAddr;
use std::sync::Arc;

use connect_api::{
    auth::PgCredentialStore, config::AppConfig, create_router, db, email::LogEmailSender, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber for logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("ConnectOrlando API - Starting...");

    // Load .env and read configuration from the environment
    let config = AppConfig::from_env().expect("Invalid configuration");
    let database_url = config
        .require_database_url()
        .expect("DATABASE_URL must be set in environment");

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = AppState::new(
        &config,
        Arc::new(PgCredentialStore::new(db_pool)),
        Arc::new(LogEmailSender),
    )
    .expect("Failed to initialise application state");

    // Create the application router
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("ConnectOrlando API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    // Peer addresses back the client IP when no x-forwarded-for header is sent
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
