// User profile module
// Read, update and soft-delete accounts behind the auth gate

pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::*;
pub use models::{UpdateUserRequest, UserResponse};
pub use service::UserService;
