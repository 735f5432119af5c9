//! Group events: one group per department per event.

use crate::errors::ApiError;
use crate::observability::metrics::record_db_query;
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;

/// Group event model (maps to group_events table)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GroupEvent {
    pub id: i64,
    pub name: String,
    pub event_id: i64,
    pub department_id: i64,
}

/// Create one group per existing department, named after it.
///
/// Runs as a single `INSERT ... SELECT` so the set of departments is read
/// and written in one statement. Returns the number of groups created.
#[instrument(skip_all, name = "event.repo.create_groups_for_event")]
pub async fn create_for_all_departments(
    conn: &mut PgConnection,
    event_id: i64,
) -> Result<u64, ApiError> {
    let start = Instant::now();

    let result = sqlx::query(
        r#"
        INSERT INTO group_events (name, event_id, department_id)
        SELECT name, $1, id
        FROM departments
        ORDER BY id
        "#,
    )
    .bind(event_id)
    .execute(conn)
    .await
    .map_err(|e| {
        record_db_query("create_groups_for_event", "error", start.elapsed());
        ApiError::Database(format!("Failed to create groups for event: {}", e))
    })?;

    record_db_query("create_groups_for_event", "success", start.elapsed());
    Ok(result.rows_affected())
}

/// Groups of one event, ordered by id.
#[instrument(skip_all, name = "event.repo.list_groups_for_event")]
pub async fn list_for_event(pool: &PgPool, event_id: i64) -> Result<Vec<GroupEvent>, ApiError> {
    let start = Instant::now();

    let groups = sqlx::query_as::<_, GroupEvent>(
        r#"
        SELECT id, name, event_id, department_id
        FROM group_events
        WHERE event_id = $1
        ORDER BY id
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        record_db_query("list_groups_for_event", "error", start.elapsed());
        ApiError::Database(format!("Failed to list groups for event: {}", e))
    })?;

    record_db_query("list_groups_for_event", "success", start.elapsed());
    Ok(groups)
}

/// Delete every group of an event.
#[instrument(skip_all, name = "event.repo.delete_groups_for_event")]
pub async fn delete_for_event(conn: &mut PgConnection, event_id: i64) -> Result<u64, ApiError> {
    let start = Instant::now();

    let result = sqlx::query("DELETE FROM group_events WHERE event_id = $1")
        .bind(event_id)
        .execute(conn)
        .await
        .map_err(|e| {
            record_db_query("delete_groups_for_event", "error", start.elapsed());
            ApiError::Database(format!("Failed to delete groups for event: {}", e))
        })?;

    record_db_query("delete_groups_for_event", "success", start.elapsed());
    Ok(result.rows_affected())
}
