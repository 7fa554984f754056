// Signed single-purpose links: email confirmation and password reset

use crate::auth::codec::TokenCodec;
use crate::auth::models::{AuthType, User};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Payload of a link token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTokenPayload {
    pub email: String,
    pub auth_type: AuthType,
    /// Digest of the password hash at issuance; reset links die once the password changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Issues and checks link tokens on the shared codec
#[derive(Debug, Clone)]
pub struct LinkTokenIssuer {
    codec: Arc<TokenCodec>,
    email_confirmation_ttl: Duration,
    password_reset_ttl: Duration,
}

impl LinkTokenIssuer {
    pub fn new(
        codec: Arc<TokenCodec>,
        email_confirmation_ttl: Duration,
        password_reset_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            email_confirmation_ttl,
            password_reset_ttl,
        }
    }

    pub fn email_confirmation_token(&self, user: &User) -> Result<String, ApiError> {
        let payload = LinkTokenPayload {
            email: user.email.clone(),
            auth_type: AuthType::EmailConfirmation,
            fingerprint: None,
        };
        Ok(self.codec.sign(&payload, self.email_confirmation_ttl)?)
    }

    pub fn password_reset_token(&self, user: &User) -> Result<String, ApiError> {
        let payload = LinkTokenPayload {
            email: user.email.clone(),
            auth_type: AuthType::PasswordReset,
            fingerprint: Some(password_fingerprint(&user.password_hash)),
        };
        Ok(self.codec.sign(&payload, self.password_reset_ttl)?)
    }

    /// Verify a link token and require the expected purpose
    pub fn verify(&self, token: &str, purpose: AuthType) -> Result<LinkTokenPayload, ApiError> {
        if token.is_empty() {
            return Err(ApiError::Validation("Must provide a valid token".to_string()));
        }

        let payload: LinkTokenPayload = self.codec.verify(token)?;
        if payload.auth_type != purpose {
            return Err(ApiError::Authorization(
                "Invalid token type. Check permissions and try again".to_string(),
            ));
        }
        Ok(payload)
    }
}

/// Whether a reset link was issued against the user's current password
pub fn fingerprint_matches(payload: &LinkTokenPayload, user: &User) -> bool {
    payload.fingerprint.as_deref() == Some(password_fingerprint(&user.password_hash).as_str())
}

fn password_fingerprint(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::codec::tests::TEST_SECRET;
    use crate::auth::token::tests::test_user;

    fn issuer() -> LinkTokenIssuer {
        LinkTokenIssuer::new(
            Arc::new(TokenCodec::new(TEST_SECRET)),
            Duration::from_secs(86_400),
            Duration::from_secs(3_600),
        )
    }

    #[test]
    fn test_confirmation_link_round_trip() {
        let issuer = issuer();
        let user = test_user("user-1");
        let token = issuer.email_confirmation_token(&user).unwrap();

        let payload = issuer.verify(&token, AuthType::EmailConfirmation).unwrap();
        assert_eq!(payload.email, user.email);
        assert_eq!(payload.fingerprint, None);
    }

    #[test]
    fn test_purpose_is_enforced() {
        let issuer = issuer();
        let token = issuer.email_confirmation_token(&test_user("user-1")).unwrap();

        let err = issuer.verify(&token, AuthType::PasswordReset).unwrap_err();
        assert!(matches!(err, ApiError::Authorization(_)));
    }

    #[test]
    fn test_reset_link_is_tied_to_current_password() {
        let issuer = issuer();
        let mut user = test_user("user-1");
        user.password_hash = "$argon2id$old".to_string();

        let token = issuer.password_reset_token(&user).unwrap();
        let payload = issuer.verify(&token, AuthType::PasswordReset).unwrap();
        assert!(fingerprint_matches(&payload, &user));

        user.password_hash = "$argon2id$new".to_string();
        assert!(!fingerprint_matches(&payload, &user));
    }

    #[test]
    fn test_empty_token() {
        let err = issuer().verify("", AuthType::EmailConfirmation).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
