//! Inscriptions: which users signed up for which events.

use crate::errors::ApiError;
use crate::observability::metrics::record_db_query;
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;

/// Names of the events a user is inscribed in, in inscription order.
#[instrument(skip_all, name = "event.repo.inscribed_event_names")]
pub async fn event_names_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<String>, ApiError> {
    let start = Instant::now();

    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT e.name
        FROM inscriptions i
        JOIN events e ON e.id = i.event_id
        WHERE i.user_id = $1
        ORDER BY i.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        record_db_query("inscribed_event_names", "error", start.elapsed());
        ApiError::Database(format!("Failed to fetch inscriptions: {}", e))
    })?;

    record_db_query("inscribed_event_names", "success", start.elapsed());
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Delete every inscription to an event.
#[instrument(skip_all, name = "event.repo.delete_inscriptions_for_event")]
pub async fn delete_for_event(conn: &mut PgConnection, event_id: i64) -> Result<u64, ApiError> {
    let start = Instant::now();

    let result = sqlx::query("DELETE FROM inscriptions WHERE event_id = $1")
        .bind(event_id)
        .execute(conn)
        .await
        .map_err(|e| {
            record_db_query("delete_inscriptions_for_event", "error", start.elapsed());
            ApiError::Database(format!("Failed to delete inscriptions for event: {}", e))
        })?;

    record_db_query("delete_inscriptions_for_event", "success", start.elapsed());
    Ok(result.rows_affected())
}
