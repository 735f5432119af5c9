//! HS256 session tokens.
//!
//! Tokens are size- and shape-checked before signature verification. All
//! failures surface to clients as one generic message; the specific
//! [`TokenError`] kind is logged at debug level and counted in metrics.

use crate::auth::claims::{Claims, Identity};
use crate::config::Config;
use crate::errors::ApiError;
use crate::observability::metrics::{record_token_issuance, record_token_validation};
use axum_extra::extract::cookie::{Cookie, SameSite};
use common::jwt::{check_structure, validate_iat};
use common::secret::ExposeSecret;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// Path scope of the session cookie.
pub const SESSION_COOKIE_PATH: &str = "/api";

/// Why a session token was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, or `iat` too far in the future.
    #[error("token is invalid")]
    Invalid,

    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,

    /// Oversized or not a compact JWS.
    #[error("token is malformed")]
    Malformed,
}

impl TokenError {
    /// Label used for the `error_type` metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Invalid => "invalid",
            TokenError::Expired => "expired",
            TokenError::Malformed => "malformed",
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        ApiError::InvalidToken
    }
}

/// Issues and validates session tokens and builds the session cookies.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_seconds: i64,
    clock_skew: Duration,
    cookie_name: String,
    cookie_secure: bool,
}

impl TokenService {
    /// Build from configuration. The secret is copied into the keys once.
    pub fn new(config: &Config) -> Self {
        let secret = config.jwt_secret.expose_secret();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_seconds: config.jwt_expiration_seconds,
            clock_skew: Duration::from_secs(config.jwt_clock_skew_seconds.unsigned_abs()),
            cookie_name: config.jwt_cookie_name.clone(),
            cookie_secure: config.cookie_secure,
        }
    }

    /// Session lifetime in seconds.
    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_seconds
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a session token for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Crypto` if signing fails.
    #[instrument(skip_all, name = "event.auth.issue_token")]
    pub fn issue(&self, identity: &Identity) -> Result<String, ApiError> {
        self.issue_at(identity, chrono::Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, identity: &Identity, now: i64) -> Result<String, ApiError> {
        let claims = Claims {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            roles: identity.role_names(),
            iat: now,
            exp: now + self.expiration_seconds,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                record_token_issuance("error");
                ApiError::Crypto(format!("Token signing failed: {}", e))
            })?;

        record_token_issuance("success");
        Ok(token)
    }

    /// Verify a session token and return its claims.
    ///
    /// # Checks
    ///
    /// 1. Size and compact-JWS shape (before any crypto)
    /// 2. HS256 signature
    /// 3. `exp` not in the past
    /// 4. `iat` not beyond the clock skew
    #[instrument(skip_all, name = "event.auth.validate_token")]
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let result = self.validate_inner(token);
        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(e) => {
                tracing::debug!(target: "event.auth.jwt", error_kind = e.as_str(), "Token rejected");
                record_token_validation("error", Some(e.as_str()));
            }
        }
        result
    }

    fn validate_inner(&self, token: &str) -> Result<Claims, TokenError> {
        check_structure(token).map_err(|e| {
            tracing::debug!(target: "event.auth.jwt", error = ?e, "Token structure check failed");
            TokenError::Malformed
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(target: "event.auth.jwt", error = %e, "Token verification failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            }
        })?;

        validate_iat(token_data.claims.iat, self.clock_skew).map_err(|e| {
            tracing::debug!(target: "event.auth.jwt", error = ?e, "Token iat validation failed");
            TokenError::Invalid
        })?;

        Ok(token_data.claims)
    }

    /// HttpOnly session cookie carrying `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path(SESSION_COOKIE_PATH)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.expiration_seconds))
            .build()
    }

    /// Cookie that clears the session in the browser.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), String::new()))
            .path(SESSION_COOKIE_PATH)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::ZERO)
            .build()
    }
}
