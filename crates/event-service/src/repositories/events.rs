//! Events repository.
//!
//! Writes that belong to a multi-row workflow take a `&mut PgConnection` so
//! the caller can run them inside one transaction.

use crate::errors::ApiError;
use crate::models::EventDraft;
use crate::observability::metrics::record_db_query;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;

/// Event row joined with the organizer's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub place: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_participants_group: i32,
    pub status_event: bool,
    pub img_event: Option<String>,
    pub organizer_id: Option<i64>,
    pub organizer_username: Option<String>,
}

/// Insert an active event owned by `organizer_id`. Returns the new id.
#[instrument(skip_all, name = "event.repo.insert_event")]
pub async fn insert_event(
    conn: &mut PgConnection,
    draft: &EventDraft,
    organizer_id: i64,
) -> Result<i64, ApiError> {
    let start = Instant::now();

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO events (
            name, description, place, start_date, end_date,
            max_participants_group, status_event, img_event, organizer_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
        RETURNING id
        "#,
    )
    .bind(&draft.name)
    .bind(draft.description.as_deref())
    .bind(draft.place.as_deref())
    .bind(draft.start_date)
    .bind(draft.end_date)
    .bind(draft.max_participants_group)
    .bind(draft.img_event.as_deref())
    .bind(organizer_id)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        record_db_query("insert_event", "error", start.elapsed());
        ApiError::Database(format!("Failed to insert event: {}", e))
    })?;

    record_db_query("insert_event", "success", start.elapsed());
    Ok(id)
}

/// Overwrite the mutable fields of an event.
///
/// Returns `false` when no event has this id. Status and organizer are left
/// unchanged.
#[instrument(skip_all, name = "event.repo.update_event")]
pub async fn update_event(pool: &PgPool, event_id: i64, draft: &EventDraft) -> Result<bool, ApiError> {
    let start = Instant::now();

    let result = sqlx::query(
        r#"
        UPDATE events
        SET name = $2,
            description = $3,
            place = $4,
            start_date = $5,
            end_date = $6,
            max_participants_group = $7,
            img_event = $8
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .bind(&draft.name)
    .bind(draft.description.as_deref())
    .bind(draft.place.as_deref())
    .bind(draft.start_date)
    .bind(draft.end_date)
    .bind(draft.max_participants_group)
    .bind(draft.img_event.as_deref())
    .execute(pool)
    .await
    .map_err(|e| {
        record_db_query("update_event", "error", start.elapsed());
        ApiError::Database(format!("Failed to update event: {}", e))
    })?;

    record_db_query("update_event", "success", start.elapsed());
    Ok(result.rows_affected() > 0)
}

/// Fetch one event with its organizer's username.
#[instrument(skip_all, name = "event.repo.get_event")]
pub async fn get_event(pool: &PgPool, event_id: i64) -> Result<Option<EventRow>, ApiError> {
    let start = Instant::now();

    let row = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT
            e.id, e.name, e.description, e.place, e.start_date, e.end_date,
            e.max_participants_group, e.status_event, e.img_event, e.organizer_id,
            u.username AS organizer_username
        FROM events e
        LEFT JOIN users u ON u.id = e.organizer_id
        WHERE e.id = $1
        "#,
    )
    .bind(event_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        record_db_query("get_event", "error", start.elapsed());
        ApiError::Database(format!("Failed to fetch event: {}", e))
    })?;

    record_db_query("get_event", "success", start.elapsed());
    Ok(row)
}

/// List every event, oldest first.
#[instrument(skip_all, name = "event.repo.list_events")]
pub async fn list_events(pool: &PgPool) -> Result<Vec<EventRow>, ApiError> {
    let start = Instant::now();

    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT
            e.id, e.name, e.description, e.place, e.start_date, e.end_date,
            e.max_participants_group, e.status_event, e.img_event, e.organizer_id,
            u.username AS organizer_username
        FROM events e
        LEFT JOIN users u ON u.id = e.organizer_id
        ORDER BY e.id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        record_db_query("list_events", "error", start.elapsed());
        ApiError::Database(format!("Failed to list events: {}", e))
    })?;

    record_db_query("list_events", "success", start.elapsed());
    Ok(rows)
}

/// Lock an event row for the rest of the transaction.
///
/// Returns `false` when no event has this id.
#[instrument(skip_all, name = "event.repo.lock_event")]
pub async fn lock_event(conn: &mut PgConnection, event_id: i64) -> Result<bool, ApiError> {
    let start = Instant::now();

    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
        .bind(event_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            record_db_query("lock_event", "error", start.elapsed());
            ApiError::Database(format!("Failed to lock event: {}", e))
        })?;

    record_db_query("lock_event", "success", start.elapsed());
    Ok(row.is_some())
}

/// Delete the event row itself. Dependents must already be gone.
#[instrument(skip_all, name = "event.repo.delete_event")]
pub async fn delete_event(conn: &mut PgConnection, event_id: i64) -> Result<u64, ApiError> {
    let start = Instant::now();

    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(conn)
        .await
        .map_err(|e| {
            record_db_query("delete_event", "error", start.elapsed());
            ApiError::Database(format!("Failed to delete event: {}", e))
        })?;

    record_db_query("delete_event", "success", start.elapsed());
    Ok(result.rows_affected())
}
