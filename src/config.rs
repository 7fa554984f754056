// Application configuration
// Built once at startup from the environment and handed to every component

use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Routes reachable without an access token when `PUBLIC_ROUTES` is unset
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &[
    "/auth/signup",
    "/auth/signin",
    "/auth/refresh",
    "/auth/signout",
    "/auth/confirm-email",
    "/auth/forgot-password",
    "/auth/reset-password",
];

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Deployment mode. Only the non-production modes may run with the
/// built-in insecure signing secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    /// Whether the insecure fallback secret is allowed in this mode
    pub fn allows_insecure_secret(self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "local" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: value.to_string(),
            }),
        }
    }
}

/// Allow-list of routes that bypass the auth gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicRoutes {
    /// `*`: every route is public (local setups)
    All,
    Listed(Vec<String>),
}

impl PublicRoutes {
    /// Parse a comma-separated list. A `*` entry anywhere makes every route public.
    pub fn parse(raw: &str) -> Self {
        let entries: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect();

        if entries.iter().any(|entry| entry == "*") {
            PublicRoutes::All
        } else {
            PublicRoutes::Listed(entries)
        }
    }

    /// Whether the request path is public. One trailing slash is ignored.
    pub fn is_public(&self, path: &str) -> bool {
        match self {
            PublicRoutes::All => true,
            PublicRoutes::Listed(routes) => {
                let route = match path.strip_suffix('/') {
                    Some(stripped) if !stripped.is_empty() => stripped,
                    _ => path,
                };
                routes.iter().any(|entry| entry == route)
            }
        }
    }
}

impl Default for PublicRoutes {
    fn default() -> Self {
        PublicRoutes::Listed(DEFAULT_PUBLIC_ROUTES.iter().map(ToString::to_string).collect())
    }
}

/// Token and credential settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub environment: Environment,
    pub jwt_secret: Option<String>,
    pub public_routes: PublicRoutes,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub email_confirmation_ttl: Duration,
    pub password_reset_ttl: Duration,
    pub password_hash_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            jwt_secret: None,
            public_routes: PublicRoutes::default(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(365 * 24 * 60 * 60),
            email_confirmation_ttl: Duration::from_secs(24 * 60 * 60),
            password_reset_ttl: Duration::from_secs(60 * 60),
            password_hash_timeout: Duration::from_secs(5),
        }
    }
}

/// Outbound email settings
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: String,
    /// `BASE_URL`: public URL of this API, used for email confirmation links
    pub base_url: String,
    /// `CLIENT_URL`: public URL of the client app, used for password reset links
    pub client_url: String,
    pub timeout: Duration,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: "ConnectOrlando <no-reply@connectorlando.tech>".to_string(),
            base_url: "http://localhost:3001".to_string(),
            client_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from any key/value source
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();

        let defaults = AuthConfig::default();
        let environment = match vars.get("APP_ENV") {
            Some(value) => Environment::parse(value)?,
            None => Environment::Production,
        };

        let auth = AuthConfig {
            environment,
            jwt_secret: vars.get("JWT_SECRET").cloned(),
            public_routes: vars
                .get("PUBLIC_ROUTES")
                .map(|raw| PublicRoutes::parse(raw))
                .unwrap_or_default(),
            access_token_ttl: seconds(&vars, "ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: seconds(&vars, "REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl)?,
            email_confirmation_ttl: seconds(
                &vars,
                "EMAIL_CONFIRMATION_TTL_SECS",
                defaults.email_confirmation_ttl,
            )?,
            password_reset_ttl: seconds(&vars, "PASSWORD_RESET_TTL_SECS", defaults.password_reset_ttl)?,
            password_hash_timeout: seconds(
                &vars,
                "PASSWORD_HASH_TIMEOUT_SECS",
                defaults.password_hash_timeout,
            )?,
        };

        let email_defaults = EmailConfig::default();
        let email = EmailConfig {
            from: vars.get("EMAIL_FROM").cloned().unwrap_or(email_defaults.from),
            base_url: vars
                .get("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(email_defaults.base_url),
            client_url: vars
                .get("CLIENT_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(email_defaults.client_url),
            timeout: seconds(&vars, "EMAIL_TIMEOUT_SECS", email_defaults.timeout)?,
        };

        let port = match vars.get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 8080,
        };

        Ok(Self {
            database_url: vars.get("DATABASE_URL").cloned(),
            host: vars.get("HOST").cloned().unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            auth,
            email,
        })
    }

    /// Database URL, required by the server binary
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn seconds(
    vars: &HashMap<String, String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid {
                key,
                value: raw.clone(),
            }),
        None => Ok(default),
    }
}
