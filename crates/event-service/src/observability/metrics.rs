//! Metrics definitions for the event service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `event_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: route templates (ids replaced by `{id}`)
//! - `status`: success, error, timeout
//! - `operation`: fixed names in code
//! - `error_type`: bounded by error variants

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("event_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("event_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `event_http_requests_total`, `event_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("event_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("event_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/health" | "/metrics" | "/api/auth/signin" | "/api/auth/signup"
        | "/api/auth/signout" | "/api/department/all" | "/api/career/all"
        | "/api/events/all" | "/api/events/add" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Replace event ids with `{id}`.
fn normalize_dynamic_endpoint(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/api/events/") {
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [id] if is_id(id) => return "/api/events/{id}".to_string(),
            ["update", id] if is_id(id) => return "/api/events/update/{id}".to_string(),
            ["delete", id] if is_id(id) => return "/api/events/delete/{id}".to_string(),
            _ => {}
        }
    }

    // Unknown paths normalized to "/other" to bound cardinality
    "/other".to_string()
}

fn is_id(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record session token issuance.
///
/// Metric: `event_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str) {
    counter!("event_token_issuance_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record session token validation outcome.
///
/// Metric: `event_token_validations_total`
/// Labels: `status`, `error_type` ("none" on success)
pub fn record_token_validation(status: &str, error_type: Option<&str>) {
    counter!("event_token_validations_total",
        "status" => status.to_string(),
        "error_type" => error_type.unwrap_or("none").to_string()
    )
    .increment(1);
}

/// Record a signin or signup attempt.
///
/// Metric: `event_auth_attempts_total`
/// Labels: `operation`, `status`
pub fn record_auth_attempt(operation: &str, status: &str) {
    counter!("event_auth_attempts_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `event_db_query_duration_seconds`, `event_db_queries_total`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &str, status: &str, duration: Duration) {
    histogram!("event_db_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("event_db_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Event Workflow Metrics
// ============================================================================

/// Record an event workflow operation.
///
/// Metric: `event_operations_total`
/// Labels: `operation` (create, update, delete), `status`
pub fn record_event_operation(operation: &str, status: &str) {
    counter!("event_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record groups created by an event creation fan-out.
///
/// Metric: `event_groups_created_total`
pub fn record_groups_created(count: u64) {
    counter!("event_groups_created_total").increment(count);
}
