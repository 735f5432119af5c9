//! Session token claims and the authenticated identity derived from them.

use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Claims carried in the session token.
///
/// The `email` field is redacted in Debug output.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user id, as a decimal string.
    pub sub: String,

    pub username: String,

    /// Email address - redacted in Debug output.
    pub email: String,

    /// Role names in `ROLE_*` form.
    pub roles: Vec<String>,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &self.sub)
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// The authenticated caller, inserted into request extensions by the
/// authentication gate.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("roles", &self.roles)
            .finish()
    }
}

impl Identity {
    /// Build an identity from verified claims.
    ///
    /// Returns `None` when `sub` is not a user id. Role names that do not
    /// map to a [`Role`] are dropped.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let user_id = claims.sub.parse::<i64>().ok()?;

        let roles = claims
            .roles
            .iter()
            .filter_map(|name| match Role::from_str(name) {
                Ok(role) => Some(role),
                Err(_) => {
                    tracing::debug!(
                        target: "event.auth.claims",
                        role = %name,
                        "Dropping unknown role from token claims"
                    );
                    None
                }
            })
            .collect();

        Some(Self {
            user_id,
            username: claims.username.clone(),
            email: claims.email.clone(),
            roles,
        })
    }

    /// True when the identity holds at least one of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|r| roles.contains(r))
    }

    /// Role names in `ROLE_*` form.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.as_db_name().to_string()).collect()
    }
}
