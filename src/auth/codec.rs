// JWT signing and verification keyed by the process secret

use crate::auth::error::TokenError;
use crate::config::AuthConfig;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Well-known secret used only when no secret is configured in a
/// development or test environment. Tokens signed with it are forgeable.
pub const INSECURE_DEFAULT_SECRET: &str = "REPLACE_WITH_RANDOM_SECRETKEY";

/// Registered claims around the wrapped payload
#[derive(Debug, Serialize, Deserialize)]
struct Claims<T> {
    data: T,
    iat: i64,
    exp: i64,
}

/// Signs payloads into compact tokens and verifies them back
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from an explicit secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Resolve the signing secret from configuration
    ///
    /// Without a secret, only development and test environments may start,
    /// and they fall back to [`INSECURE_DEFAULT_SECRET`].
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        match config.jwt_secret.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(secret) => Ok(Self::new(secret)),
            None if config.environment.allows_insecure_secret() => {
                warn!(
                    "!!! JWT_SECRET is not set. Signing tokens with the built-in insecure secret ({:?} mode). \
                     Never run like this in production !!!",
                    config.environment
                );
                Ok(Self::new(INSECURE_DEFAULT_SECRET))
            }
            None => Err(TokenError::Configuration),
        }
    }

    /// Wrap `payload` under `data` and sign it, expiring after `expires_in`
    pub fn sign<T: Serialize>(&self, payload: &T, expires_in: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);

        let claims = Claims {
            data: payload,
            iat: now,
            exp: now.saturating_add(lifetime),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Check signature and expiry and return the unwrapped `data` payload
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        decode::<Claims<T>>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.data)
            .map_err(TokenError::from)
    }
}
