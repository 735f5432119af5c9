//! Event service configuration.
//!
//! Configuration is loaded from environment variables. Sensitive fields are
//! redacted in Debug output.

use base64::{engine::general_purpose, Engine as _};
use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default session lifetime (24 hours).
pub const DEFAULT_JWT_EXPIRATION_SECONDS: i64 = 86_400;

/// Shortest session lifetime accepted.
pub const MIN_JWT_EXPIRATION_SECONDS: i64 = 60;

/// Longest session lifetime accepted (7 days).
pub const MAX_JWT_EXPIRATION_SECONDS: i64 = 604_800;

/// Default session cookie name.
pub const DEFAULT_JWT_COOKIE_NAME: &str = "event_session";

/// Minimum decoded length of the HS256 signing secret.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Minimum bcrypt cost factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum bcrypt cost factor.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default browser origin allowed by CORS.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Event service configuration.
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Decoded HS256 signing secret.
    pub jwt_secret: SecretBox<Vec<u8>>,

    /// Session token lifetime in seconds; also the cookie Max-Age.
    pub jwt_expiration_seconds: i64,

    /// Tolerance for `iat` values ahead of the local clock.
    pub jwt_clock_skew_seconds: i64,

    /// Name of the session cookie.
    pub jwt_cookie_name: String,

    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,

    /// Cost factor for password hashing.
    pub bcrypt_cost: u32,

    /// Origin allowed to make credentialed cross-origin requests.
    pub cors_allowed_origin: String,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            database_url: self.database_url.clone(),
            bind_address: self.bind_address.clone(),
            jwt_secret: SecretBox::new(Box::new(self.jwt_secret.expose_secret().clone())),
            jwt_expiration_seconds: self.jwt_expiration_seconds,
            jwt_clock_skew_seconds: self.jwt_clock_skew_seconds,
            jwt_cookie_name: self.jwt_cookie_name.clone(),
            cookie_secure: self.cookie_secure,
            bcrypt_cost: self.bcrypt_cost,
            cors_allowed_origin: self.cors_allowed_origin.clone(),
        }
    }
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_seconds", &self.jwt_expiration_seconds)
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("jwt_cookie_name", &self.jwt_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT expiration configuration: {0}")]
    InvalidJwtExpiration(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret_base64 = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let jwt_secret = general_purpose::STANDARD
            .decode(jwt_secret_base64)
            .map_err(|e| {
                ConfigError::InvalidJwtSecret(format!("JWT_SECRET must be valid base64: {}", e))
            })?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        // Parse session lifetime with validation
        let jwt_expiration_seconds = if let Some(value_str) = vars.get("JWT_EXPIRATION_SECONDS")
        {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtExpiration(format!(
                    "JWT_EXPIRATION_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if !(MIN_JWT_EXPIRATION_SECONDS..=MAX_JWT_EXPIRATION_SECONDS).contains(&value) {
                return Err(ConfigError::InvalidJwtExpiration(format!(
                    "JWT_EXPIRATION_SECONDS must be between {} and {}, got {}",
                    MIN_JWT_EXPIRATION_SECONDS, MAX_JWT_EXPIRATION_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_JWT_EXPIRATION_SECONDS
        };

        // Parse JWT clock skew tolerance with validation
        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_CLOCK_SKEW.as_secs() as i64 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs() as i64
        };

        let jwt_cookie_name = vars
            .get("JWT_COOKIE_NAME")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JWT_COOKIE_NAME.to_string());

        if jwt_cookie_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "JWT_COOKIE_NAME must not be empty".to_string(),
            ));
        }

        let cookie_secure = match vars.get("COOKIE_SECURE") {
            Some(value_str) => value_str.parse::<bool>().map_err(|e| {
                ConfigError::InvalidValue(format!(
                    "COOKIE_SECURE must be 'true' or 'false', got '{}': {}",
                    value_str, e
                ))
            })?,
            None => false,
        };

        // Parse bcrypt cost with validation
        let bcrypt_cost = if let Some(value_str) = vars.get("BCRYPT_COST") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&value) {
                return Err(ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, value
                )));
            }

            value
        } else {
            DEFAULT_BCRYPT_COST
        };

        let cors_allowed_origin = vars
            .get("CORS_ALLOWED_ORIGIN")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string());

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret: SecretBox::new(Box::new(jwt_secret)),
            jwt_expiration_seconds,
            jwt_clock_skew_seconds,
            jwt_cookie_name,
            cookie_secure,
            bcrypt_cost,
            cors_allowed_origin,
        })
    }
}
