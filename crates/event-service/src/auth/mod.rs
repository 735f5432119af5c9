//! Session tokens.
//!
//! - `claims` - token claims and the authenticated `Identity`
//! - `jwt` - HS256 issuance, validation and session cookies

pub mod claims;
pub mod jwt;

pub use claims::{Claims, Identity};
pub use jwt::{TokenError, TokenService};
