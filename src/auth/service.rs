// Authentication service - business logic layer

use crate::auth::{
    connection::ConnectionMetadata,
    link::{fingerprint_matches, LinkTokenIssuer},
    models::{
        AccessTokenResponse, AuthType, ForgotPasswordRequest, NewUser, RefreshRequest,
        ResetPasswordRequest, SigninRequest, SignupRequest, TokenPairResponse, User,
    },
    password::PasswordService,
    refresh::RefreshTokenManager,
    repository::{CredentialStoreArc, ACCOUNT_EXISTS},
    token::AccessTokenIssuer,
};
use crate::email::{EmailError, EmailMessage, EmailSenderArc};
use crate::error::ApiError;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outbound mail settings used by the flows
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from: String,
    /// Public URL of this API; confirmation links open `GET /auth/confirm-email` here
    pub base_url: String,
    /// Public URL of the client app that hosts the password reset form
    pub client_url: String,
    pub timeout: Duration,
}

/// Authentication service coordinating all auth operations
#[derive(Clone)]
pub struct AuthService {
    store: CredentialStoreArc,
    access_tokens: AccessTokenIssuer,
    refresh_tokens: RefreshTokenManager,
    links: LinkTokenIssuer,
    passwords: PasswordService,
    mailer: EmailSenderArc,
    mail: MailSettings,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: CredentialStoreArc,
        access_tokens: AccessTokenIssuer,
        refresh_tokens: RefreshTokenManager,
        links: LinkTokenIssuer,
        passwords: PasswordService,
        mailer: EmailSenderArc,
        mail: MailSettings,
    ) -> Self {
        Self {
            store,
            access_tokens,
            refresh_tokens,
            links,
            passwords,
            mailer,
            mail,
        }
    }

    pub fn access_tokens(&self) -> &AccessTokenIssuer {
        &self.access_tokens
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenManager {
        &self.refresh_tokens
    }

    /// Register a new user and sign them in
    pub async fn signup(
        &self,
        request: SignupRequest,
        connection: &ConnectionMetadata,
    ) -> Result<TokenPairResponse, ApiError> {
        let name = required(request.name, "Must provide a valid name")?;
        let password = required(request.password, "Must provide a valid password")?;
        let email = required(request.email, "Must provide a valid email")?;
        if !validator::validate_email(email.as_str()) {
            return Err(ApiError::Validation("Must provide a valid email".to_string()));
        }
        connection.binding()?;

        let email = email.to_lowercase();

        // Only short-circuits the common case; create_user enforces uniqueness
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::Validation(ACCOUNT_EXISTS.to_string()));
        }

        let password_hash = self.passwords.hash_password(&password).await?;
        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        info!("User {} signed up", user.id);

        let tokens = self.issue_token_pair(&user, connection).await?;
        self.send_email_confirmation(&user).await;
        Ok(tokens)
    }

    /// Check credentials and issue a token pair
    pub async fn signin(
        &self,
        request: SigninRequest,
        connection: &ConnectionMetadata,
    ) -> Result<TokenPairResponse, ApiError> {
        let (Some(email), Some(password)) = (non_empty(request.email), non_empty(request.password))
        else {
            return Err(ApiError::Validation(
                "Must provide a valid email and password".to_string(),
            ));
        };

        // Same message whether or not the account exists
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::Validation("Cannot verify user information".to_string()))?;

        if !self.passwords.verify_password(&password, &user.password_hash).await? {
            return Err(ApiError::Authentication(
                "Cannot verify login information".to_string(),
            ));
        }
        ensure_active(&user)?;

        debug!("User {} signed in", user.id);
        self.issue_token_pair(&user, connection).await
    }

    /// Revoke the refresh token if one was given; never fails
    pub async fn signout(&self, refresh_token: Option<&str>) {
        let Some(token) = refresh_token.filter(|token| !token.is_empty()) else {
            debug!("Sign-out without a refresh token");
            return;
        };

        if let Err(err) = self.refresh_tokens.revoke(token).await {
            warn!("Refresh token revocation during sign-out failed: {}", err);
        }
    }

    /// Exchange a bound refresh token for a new access token
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh(
        &self,
        request: RefreshRequest,
        connection: &ConnectionMetadata,
    ) -> Result<AccessTokenResponse, ApiError> {
        let token = request.refresh_token.unwrap_or_default();
        let record = self.refresh_tokens.extract(&token, connection).await?;

        let user = self
            .store
            .find_user_by_id(&record.user_id)
            .await?
            .ok_or_else(|| ApiError::Authentication("Invalid refresh token".to_string()))?;
        ensure_active(&user)?;

        Ok(AccessTokenResponse {
            access_token: self.access_tokens.create_access_token(&user)?,
        })
    }

    /// Mark the account behind an email confirmation link as verified
    pub async fn confirm_email(&self, token: Option<String>) -> Result<(), ApiError> {
        let payload = self
            .links
            .verify(&token.unwrap_or_default(), AuthType::EmailConfirmation)?;

        let user = self
            .store
            .find_user_by_email(&payload.email)
            .await?
            .ok_or_else(|| ApiError::Validation("Cannot verify user information".to_string()))?;
        ensure_active(&user)?;

        self.store.mark_email_verified(&user.id).await?;
        info!("User {} verified their email", user.id);
        Ok(())
    }

    /// Email a reset link if the account exists; the caller always reports success
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), ApiError> {
        let Some(email) = non_empty(request.email) else {
            debug!("Password reset requested without an email");
            return Ok(());
        };

        match self.store.find_user_by_email(&email).await? {
            Some(user) if !user.is_archived => {
                let token = match self.links.password_reset_token(&user) {
                    Ok(token) => token,
                    Err(err) => {
                        warn!("Could not create reset link for user {}: {}", user.id, err);
                        return Ok(());
                    }
                };
                // The reset form lives in the client app; it posts to /auth/reset-password
                let link = format!("{}/reset-password?token={}", self.mail.client_url, token);
                self.send(EmailMessage {
                    from: self.mail.from.clone(),
                    to: user.email.clone(),
                    subject: "Reset your password".to_string(),
                    text: Some(format!(
                        "Someone asked to reset the password for this account. \
                         Use this link within the hour to choose a new one: {link}"
                    )),
                    html: Some(format!(
                        "<p>Someone asked to reset the password for this account.</p>\
                         <p><a href=\"{link}\">Choose a new password</a></p>"
                    )),
                })
                .await;
            }
            _ => debug!("Password reset requested for an unknown or archived account"),
        }
        Ok(())
    }

    /// Apply a new password from a reset link and sign the user out everywhere
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), ApiError> {
        let password = required(request.password, "Must provide a valid password")?;
        let payload = self
            .links
            .verify(&request.token.unwrap_or_default(), AuthType::PasswordReset)?;

        let user = self
            .store
            .find_user_by_email(&payload.email)
            .await?
            .ok_or_else(|| ApiError::Validation("Cannot verify user information".to_string()))?;
        ensure_active(&user)?;

        if !fingerprint_matches(&payload, &user) {
            return Err(link_already_used());
        }

        // The write is conditional on the hash the link was checked against,
        // so only one of several concurrent resets with the same link lands
        let password_hash = self.passwords.hash_password(&password).await?;
        if !self
            .store
            .update_password(&user.id, &user.password_hash, &password_hash)
            .await?
        {
            return Err(link_already_used());
        }
        self.refresh_tokens.revoke_all_for_user(&user.id).await?;

        info!("User {} reset their password", user.id);
        Ok(())
    }

    async fn issue_token_pair(
        &self,
        user: &User,
        connection: &ConnectionMetadata,
    ) -> Result<TokenPairResponse, ApiError> {
        Ok(TokenPairResponse {
            access_token: self.access_tokens.create_access_token(user)?,
            refresh_token: self.refresh_tokens.issue(user, connection).await?,
        })
    }

    async fn send_email_confirmation(&self, user: &User) {
        let token = match self.links.email_confirmation_token(user) {
            Ok(token) => token,
            Err(err) => {
                warn!("Could not create confirmation link for user {}: {}", user.id, err);
                return;
            }
        };

        let link = format!("{}/auth/confirm-email?token={}", self.mail.base_url, token);
        self.send(EmailMessage {
            from: self.mail.from.clone(),
            to: user.email.clone(),
            subject: "Confirm your email".to_string(),
            text: Some(format!("Welcome, {}! Confirm your email address: {link}", user.name)),
            html: Some(format!(
                "<p>Welcome, {}!</p><p><a href=\"{link}\">Confirm your email address</a></p>",
                user.name
            )),
        })
        .await;
    }

    /// Deliver with a deadline; failures are logged, never returned
    async fn send(&self, message: EmailMessage) {
        let to = message.to.clone();
        let result = match tokio::time::timeout(self.mail.timeout, self.mailer.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(EmailError::Timeout),
        };

        if let Err(err) = result {
            warn!("Email to {} was not sent: {}", to, err);
        }
    }
}

/// Reject archived accounts
pub fn ensure_active(user: &User) -> Result<(), ApiError> {
    if user.is_archived {
        return Err(ApiError::Archived("Account already deleted".to_string()));
    }
    Ok(())
}

fn link_already_used() -> ApiError {
    ApiError::Authentication("Password reset link has already been used".to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    non_empty(value).ok_or_else(|| ApiError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::codec::tests::{tamper, TEST_SECRET};
    use crate::auth::codec::TokenCodec;
    use crate::auth::link::LinkTokenPayload;
    use crate::auth::models::{AccessTokenPayload, RefreshTokenPayload};
    use crate::auth::repository::{CredentialStore, MemoryCredentialStore};
    use crate::email::MemoryEmailSender;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct Fixture {
        store: MemoryCredentialStore,
        mailer: MemoryEmailSender,
        codec: Arc<TokenCodec>,
        service: AuthService,
    }

    fn fixture_with_mailer(mailer: MemoryEmailSender) -> Fixture {
        let store = MemoryCredentialStore::new();
        let codec = Arc::new(TokenCodec::new(TEST_SECRET));
        let store_arc: CredentialStoreArc = Arc::new(store.clone());

        let service = AuthService::new(
            store_arc.clone(),
            AccessTokenIssuer::new(codec.clone(), Duration::from_secs(900)),
            RefreshTokenManager::new(codec.clone(), store_arc, Duration::from_secs(31_536_000)),
            LinkTokenIssuer::new(codec.clone(), Duration::from_secs(86_400), Duration::from_secs(3_600)),
            PasswordService::new(Duration::from_secs(30)),
            Arc::new(mailer.clone()),
            MailSettings {
                from: "no-reply@example.com".to_string(),
                base_url: "http://localhost:3001".to_string(),
                client_url: "http://localhost:3000".to_string(),
                timeout: Duration::from_secs(5),
            },
        );

        Fixture {
            store,
            mailer,
            codec,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_mailer(MemoryEmailSender::new())
    }

    fn connection() -> ConnectionMetadata {
        ConnectionMetadata::new("forward-test", "agent-test")
    }

    fn signup_request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn signin_request(email: &str, password: &str) -> SigninRequest {
        SigninRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    /// Pull the token query parameter out of the last email's text body
    fn link_token(message: &EmailMessage) -> String {
        let text = message.text.as_deref().unwrap();
        let start = text.find("token=").unwrap() + "token=".len();
        text[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_signup_returns_tokens_for_new_user() {
        let f = fixture();
        let tokens = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        let user = f.store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        let access: AccessTokenPayload = f.codec.verify(&tokens.access_token).unwrap();
        assert_eq!(access.id, user.id);
        assert_eq!(access.auth_type, AuthType::Access);

        let refresh: RefreshTokenPayload = f.codec.verify(&tokens.refresh_token).unwrap();
        let record = f.store.find_refresh_token(&refresh.refresh_token_id).await.unwrap().unwrap();
        assert_eq!(record.user_id, user.id);

        assert_ne!(user.password_hash, "x");
        assert!(!user.is_email_verified);
    }

    #[tokio::test]
    async fn test_signup_validation_order() {
        let f = fixture();
        let cases = [
            (SignupRequest::default(), "Must provide a valid name"),
            (
                SignupRequest {
                    name: Some("A".into()),
                    ..Default::default()
                },
                "Must provide a valid password",
            ),
            (
                SignupRequest {
                    name: Some("A".into()),
                    password: Some("x".into()),
                    ..Default::default()
                },
                "Must provide a valid email",
            ),
            (signup_request("A", "not-an-email", "x"), "Must provide a valid email"),
            (signup_request("  ", "a@b.com", "x"), "Must provide a valid name"),
        ];

        for (request, message) in cases {
            let err = f.service.signup(request, &connection()).await.unwrap_err();
            assert!(matches!(&err, ApiError::Validation(msg) if msg == message), "{err:?}");
        }
    }

    #[tokio::test]
    async fn test_signup_is_case_insensitive_on_email() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "Test@Example.com", "x"), &connection())
            .await
            .unwrap();

        let err = f
            .service
            .signup(signup_request("B", "test@example.com", "y"), &connection())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == ACCOUNT_EXISTS));
    }

    #[tokio::test]
    async fn test_signup_sends_confirmation_email() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        let sent = f.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert!(sent[0].text.as_deref().unwrap().contains("/auth/confirm-email?token="));
    }

    #[tokio::test]
    async fn test_signup_survives_email_failure() {
        let f = fixture_with_mailer(MemoryEmailSender::failing());
        let result = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_signup_requires_connection_metadata_before_creating_user() {
        let f = fixture();
        let err = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &ConnectionMetadata::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert!(f.store.find_user_by_email("a@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_signin() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        let tokens = f.service.signin(signin_request("A@B.com", "x"), &connection()).await.unwrap();
        assert!(f.service.access_tokens().verify_access_token(&tokens.access_token).is_ok());

        let err = f
            .service
            .signin(signin_request("a@b.com", "wrong"), &connection())
            .await
            .unwrap_err();
        assert!(matches!(&err, ApiError::Authentication(msg) if msg == "Cannot verify login information"));

        let err = f
            .service
            .signin(signin_request("nobody@b.com", "x"), &connection())
            .await
            .unwrap_err();
        assert!(matches!(&err, ApiError::Validation(msg) if msg == "Cannot verify user information"));

        let err = f
            .service
            .signin(SigninRequest { email: Some("a@b.com".into()), password: None }, &connection())
            .await
            .unwrap_err();
        assert!(matches!(&err, ApiError::Validation(msg) if msg == "Must provide a valid email and password"));
    }

    #[tokio::test]
    async fn test_archived_user_cannot_sign_in_or_refresh() {
        let f = fixture();
        let tokens = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();
        let user = f.store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        f.store.archive_user(&user.id, Utc::now()).await.unwrap();

        let err = f.service.signin(signin_request("a@b.com", "x"), &connection()).await.unwrap_err();
        assert!(matches!(err, ApiError::Archived(_)));

        let err = f
            .service
            .refresh(
                RefreshRequest { refresh_token: Some(tokens.refresh_token) },
                &connection(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Archived(_)));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let f = fixture();
        let tokens = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        let response = f
            .service
            .refresh(
                RefreshRequest { refresh_token: Some(tokens.refresh_token.clone()) },
                &connection(),
            )
            .await
            .unwrap();
        let identity = f.service.access_tokens().verify_access_token(&response.access_token).unwrap();
        let user = f.store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(identity.id, user.id);

        // Not rotated: the same refresh token keeps working
        assert!(f
            .service
            .refresh(RefreshRequest { refresh_token: Some(tokens.refresh_token) }, &connection())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_refresh_failures() {
        let f = fixture();
        let tokens = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        let err = f
            .service
            .refresh(
                RefreshRequest { refresh_token: Some(tamper(&tokens.refresh_token)) },
                &connection(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication(msg) if msg == "invalid signature"));

        let err = f
            .service
            .refresh(
                RefreshRequest { refresh_token: Some(tokens.refresh_token.clone()) },
                &ConnectionMetadata::new("203.0.113.9", "agent-test"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));

        let err = f
            .service
            .refresh(RefreshRequest::default(), &connection())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_refresh_for_missing_user() {
        let f = fixture();
        let token = f
            .service
            .refresh_tokens()
            .issue(&crate::auth::token::tests::test_user("ghost"), &connection())
            .await
            .unwrap();

        let err = f
            .service
            .refresh(RefreshRequest { refresh_token: Some(token) }, &connection())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication(msg) if msg == "Invalid refresh token"));
    }

    #[tokio::test]
    async fn test_signout_is_idempotent() {
        let f = fixture();
        let tokens = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        f.service.signout(Some(&tokens.refresh_token)).await;
        assert_eq!(f.store.refresh_token_count().await, 0);

        f.service.signout(Some(&tokens.refresh_token)).await;
        f.service.signout(Some("garbage")).await;
        f.service.signout(None).await;

        let err = f
            .service
            .refresh(RefreshRequest { refresh_token: Some(tokens.refresh_token) }, &connection())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication(msg) if msg == "Refresh token not found"));
    }

    #[tokio::test]
    async fn test_confirm_email_flow() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();
        let token = link_token(&f.mailer.sent().await[0]);

        f.service.confirm_email(Some(token)).await.unwrap();

        let user = f.store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        assert!(user.is_email_verified);
    }

    #[tokio::test]
    async fn test_confirm_email_rejects_other_tokens() {
        let f = fixture();
        let tokens = f
            .service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();

        assert!(f.service.confirm_email(None).await.is_err());
        assert!(f.service.confirm_email(Some("garbage".into())).await.is_err());
        // An access token is not a confirmation link
        assert!(f.service.confirm_email(Some(tokens.access_token)).await.is_err());
    }

    #[tokio::test]
    async fn test_forgot_password_for_unknown_email_is_silent() {
        let f = fixture();
        f.service
            .forgot_password(ForgotPasswordRequest { email: Some("nobody@b.com".into()) })
            .await
            .unwrap();

        assert!(f.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_without_email_is_silent() {
        let f = fixture();
        for email in [None, Some("".to_string()), Some("   ".to_string())] {
            f.service
                .forgot_password(ForgotPasswordRequest { email })
                .await
                .unwrap();
        }

        assert!(f.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_link_points_at_client_app() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();
        f.service
            .forgot_password(ForgotPasswordRequest { email: Some("a@b.com".into()) })
            .await
            .unwrap();

        let sent = f.mailer.sent().await;
        assert!(sent[0].text.as_deref().unwrap().contains("http://localhost:3001/auth/confirm-email?token="));
        assert!(sent[1].text.as_deref().unwrap().contains("http://localhost:3000/reset-password?token="));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_resets_with_one_link_apply_once() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "old"), &connection())
            .await
            .unwrap();
        f.service
            .forgot_password(ForgotPasswordRequest { email: Some("a@b.com".into()) })
            .await
            .unwrap();
        let token = link_token(&f.mailer.sent().await[1]);

        let reset = |password: &str| {
            f.service.reset_password(ResetPasswordRequest {
                token: Some(token.clone()),
                password: Some(password.to_string()),
            })
        };
        let (first, second) = tokio::join!(reset("first"), reset("second"));

        let (winner, loser) = match (&first, &second) {
            (Ok(()), Err(err)) => ("first", err),
            (Err(err), Ok(())) => ("second", err),
            _ => panic!("expected exactly one reset to land: {first:?} {second:?}"),
        };
        assert!(
            matches!(loser, ApiError::Authentication(msg) if msg == "Password reset link has already been used")
        );
        assert!(f.service.signin(signin_request("a@b.com", winner), &connection()).await.is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_flow_is_single_use() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "old"), &connection())
            .await
            .unwrap();
        f.service
            .forgot_password(ForgotPasswordRequest { email: Some("A@b.com".into()) })
            .await
            .unwrap();

        let sent = f.mailer.sent().await;
        assert_eq!(sent.len(), 2);
        let token = link_token(&sent[1]);
        let payload: LinkTokenPayload = f.codec.verify(&token).unwrap();
        assert_eq!(payload.auth_type, AuthType::PasswordReset);

        f.service
            .reset_password(ResetPasswordRequest {
                token: Some(token.clone()),
                password: Some("new".into()),
            })
            .await
            .unwrap();

        // Existing sessions were revoked
        assert_eq!(f.store.refresh_token_count().await, 0);

        assert!(f.service.signin(signin_request("a@b.com", "new"), &connection()).await.is_ok());
        assert!(f.service.signin(signin_request("a@b.com", "old"), &connection()).await.is_err());

        let err = f
            .service
            .reset_password(ResetPasswordRequest {
                token: Some(token),
                password: Some("another".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_link_tokens_embed_purpose() {
        let f = fixture();
        f.service
            .signup(signup_request("A", "a@b.com", "x"), &connection())
            .await
            .unwrap();
        let token = link_token(&f.mailer.sent().await[0]);

        let payload: Value = f.codec.verify(&token).unwrap();
        assert_eq!(payload, json!({ "email": "a@b.com", "authType": "EMAIL_CONFIRMATION" }));
    }
}
