//! Session authentication and per-route role policies.
//!
//! Provides two middleware functions:
//! - `authenticate` - reads the session cookie, validates it, and injects an
//!   [`Identity`] into request extensions. Requests without a cookie pass
//!   through unauthenticated.
//! - `require_roles` - enforces a [`RolePolicy`] declared on a route.

use crate::auth::{Identity, TokenService};
use crate::errors::ApiError;
use crate::models::Role;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub token_service: Arc<TokenService>,
}

/// Authentication gate applied to every route that carries a [`RolePolicy`].
///
/// # Response
///
/// - No session cookie: continues without an `Identity`
/// - Valid cookie: continues with `Identity` in extensions
/// - Invalid, expired or malformed cookie: 401 with a generic message
#[instrument(skip_all, name = "event.middleware.authenticate")]
pub async fn authenticate(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(cookie) = jar.get(state.token_service.cookie_name()) else {
        return Ok(next.run(req).await);
    };

    let claims = state.token_service.validate(cookie.value())?;

    let identity = Identity::from_claims(&claims).ok_or_else(|| {
        tracing::debug!(target: "event.middleware.auth", "Token subject is not a user id");
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Roles allowed on a route. Any one of them is sufficient.
#[derive(Debug, Clone, Copy)]
pub struct RolePolicy(pub &'static [Role]);

impl RolePolicy {
    pub const ANY: RolePolicy = RolePolicy(&Role::ALL);
    pub const ORGANIZER: RolePolicy = RolePolicy(&[Role::Organizer]);
    pub const ORGANIZER_OR_ADMIN: RolePolicy = RolePolicy(&[Role::Organizer, Role::Admin]);

    /// Check an optional identity against this policy.
    pub fn check(&self, identity: Option<&Identity>) -> Result<(), ApiError> {
        let identity = identity.ok_or_else(|| {
            ApiError::Unauthenticated("Full authentication is required".to_string())
        })?;

        if !identity.has_any_role(self.0) {
            tracing::debug!(
                target: "event.middleware.auth",
                user_id = identity.user_id,
                "Role policy denied request"
            );
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }
}

/// Enforce a [`RolePolicy`] installed with `route_layer`.
///
/// Must run inside [`authenticate`].
#[instrument(skip_all, name = "event.middleware.require_roles")]
pub async fn require_roles(
    State(policy): State<RolePolicy>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    policy.check(req.extensions().get::<Identity>())?;
    Ok(next.run(req).await)
}
