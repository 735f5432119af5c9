//! HTTP request handlers.

pub mod auth_handler;
pub mod career_handler;
pub mod department_handler;
pub mod event_handler;
pub mod health;
pub mod metrics;

pub use auth_handler::{signin, signout, signup};
pub use career_handler::list_careers;
pub use department_handler::list_departments;
pub use event_handler::{create_event, delete_event, get_event, list_events, update_event};
pub use health::health_check;
pub use metrics::metrics_handler;

use crate::errors::ApiError;
use axum::body::Bytes;
use serde::de::DeserializeOwned;

/// Parse a JSON request body, mapping any failure to `ApiError::BadRequest`.
///
/// Used instead of the `Json` extractor so malformed bodies get the same
/// `{"error": ...}` envelope as every other failure.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "event.handlers", error = %e, "Rejected request body");
        ApiError::BadRequest("Error: Invalid request body.".to_string())
    })
}

/// Parse an event id path segment, mapping any failure to
/// `ApiError::BadRequest` with the standard envelope.
pub(crate) fn parse_event_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|e| {
        tracing::debug!(target: "event.handlers", error = %e, "Rejected event id");
        ApiError::BadRequest("Error: Invalid event id.".to_string())
    })
}
