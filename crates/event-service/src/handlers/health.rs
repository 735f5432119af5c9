//! Health check handler.

use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

/// GET /health
///
/// Returns 200 "OK" when the database answers, 503 otherwise. The database
/// error is logged, never returned.
#[tracing::instrument(skip_all, name = "event.health")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(target: "event.health", error = %e, "Health check failed: database error");
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
        }
    }
}
