//! HTTP middleware layers.
//!
//! - `auth` - session gate and per-route role policies
//! - `http_metrics` - request metrics, outermost layer

pub mod auth;
pub mod http_metrics;

pub use auth::{authenticate, require_roles, AuthState, RolePolicy};
pub use http_metrics::http_metrics_middleware;
