// Password hashing and verification service

use crate::error::ApiError;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::time::Duration;
use tokio::task;
use tracing::error;

/// Password service for hashing and verification
///
/// Argon2id is deliberately slow, so every call runs on the blocking pool
/// and is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct PasswordService {
    timeout: Duration,
}

impl PasswordService {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Hash a password using Argon2id with a random salt
    pub async fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let password = password.to_owned();
        self.run_blocking(move || Self::hash_blocking(&password)).await?
    }

    /// Verify a password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch and also when the stored hash cannot be
    /// parsed, so a corrupt row never authenticates.
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        self.run_blocking(move || Self::verify_blocking(&password, &hash)).await
    }

    fn hash_blocking(password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    }

    fn verify_blocking(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                error!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(self.timeout, task::spawn_blocking(work)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join_err)) => Err(ApiError::Internal(format!(
                "password worker failed: {join_err}"
            ))),
            Err(_) => Err(ApiError::Internal(format!(
                "password hashing exceeded {:?}",
                self.timeout
            ))),
        }
    }
}
