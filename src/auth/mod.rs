// Authentication module
// Signed access/refresh tokens, connection-bound sessions, email links and the request gate

pub mod codec;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod link;
pub mod middleware;
pub mod models;
pub mod password;
pub mod refresh;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use codec::TokenCodec;
pub use connection::ConnectionMetadata;
pub use error::TokenError;
pub use handlers::*;
pub use link::LinkTokenIssuer;
pub use middleware::{auth_gate, AuthGate};
pub use models::{AuthType, AuthenticatedUser, User};
pub use password::PasswordService;
pub use refresh::RefreshTokenManager;
pub use repository::{CredentialStore, CredentialStoreArc, MemoryCredentialStore, PgCredentialStore};
pub use service::{AuthService, MailSettings};
pub use token::AccessTokenIssuer;
