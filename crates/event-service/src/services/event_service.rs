//! Event workflow: create with per-department group fan-out, update, delete
//! with dependents, and read projections.

use crate::auth::Identity;
use crate::errors::ApiError;
use crate::models::{
    EventCreatedResponse, EventDraft, EventRequest, EventResponse, MessageResponse, NO_ORGANIZER,
};
use crate::observability::metrics::{record_event_operation, record_groups_created};
use crate::repositories::events::{self, EventRow};
use crate::repositories::{group_events, inscriptions, users};
use sqlx::PgPool;
use tracing::instrument;

pub const EVENT_NOT_FOUND: &str = "Error: Evento no encontrado.";
pub const CALLER_NOT_FOUND: &str = "Error: Usuario autenticado no encontrado.";
pub const MISSING_NAME: &str = "Error: El nombre del evento es obligatorio.";
pub const MISSING_DATES: &str = "Error: Las fechas de inicio y fin son obligatorias.";
pub const START_AFTER_END: &str = "Error: La fecha de inicio no puede ser posterior a la fecha de fin.";
pub const NEGATIVE_MAX_PARTICIPANTS: &str =
    "Error: El máximo de participantes por grupo no puede ser negativo.";
pub const NAME_TOO_LONG: &str = "Error: El nombre del evento no puede superar los 200 caracteres.";
pub const PLACE_TOO_LONG: &str = "Error: El lugar del evento no puede superar los 200 caracteres.";
pub const IMAGE_TOO_LONG: &str = "Error: La imagen del evento no puede superar los 500 caracteres.";
pub const EVENT_UPDATED: &str = "Evento actualizado exitosamente.";
pub const EVENT_DELETED: &str = "Evento y sus grupos asociados eliminados exitosamente.";

/// Column limits of `events.name`, `events.place` and `events.img_event`.
const MAX_NAME_CHARS: usize = 200;
const MAX_PLACE_CHARS: usize = 200;
const MAX_IMAGE_CHARS: usize = 500;

/// Validate an event payload into a draft ready to persist.
///
/// Blank optional text fields are stored as NULL. A missing
/// `max_participants_group` defaults to 0. Text longer than its column is
/// rejected here rather than by the database.
pub fn validate_event_request(request: EventRequest) -> Result<EventDraft, ApiError> {
    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation(MISSING_NAME.to_string()))?;

    let (start_date, end_date) = match (request.start_date, request.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(ApiError::Validation(MISSING_DATES.to_string())),
    };

    if start_date > end_date {
        return Err(ApiError::Validation(START_AFTER_END.to_string()));
    }

    let max_participants_group = request.max_participants_group.unwrap_or(0);
    if max_participants_group < 0 {
        return Err(ApiError::Validation(NEGATIVE_MAX_PARTICIPANTS.to_string()));
    }

    let place = non_blank(request.place);
    let img_event = non_blank(request.img_event);

    check_length(Some(name.as_str()), MAX_NAME_CHARS, NAME_TOO_LONG)?;
    check_length(place.as_deref(), MAX_PLACE_CHARS, PLACE_TOO_LONG)?;
    check_length(img_event.as_deref(), MAX_IMAGE_CHARS, IMAGE_TOO_LONG)?;

    Ok(EventDraft {
        name,
        description: non_blank(request.description),
        place,
        start_date,
        end_date,
        max_participants_group,
        img_event,
    })
}

fn check_length(value: Option<&str>, max_chars: usize, message: &str) -> Result<(), ApiError> {
    match value {
        Some(v) if v.chars().count() > max_chars => Err(ApiError::Validation(message.to_string())),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn project(row: EventRow) -> EventResponse {
    EventResponse {
        id: row.id,
        name: row.name,
        description: row.description,
        place: row.place,
        img_event: row.img_event,
        organizer: row
            .organizer_username
            .unwrap_or_else(|| NO_ORGANIZER.to_string()),
    }
}

fn record<T>(operation: &str, result: &Result<T, ApiError>) {
    let status = match result {
        Ok(_) => "success",
        Err(e) if e.status_code() < 500 => "rejected",
        Err(_) => "error",
    };
    record_event_operation(operation, status);
}

/// Create an event owned by the caller and one group per department.
///
/// The event and its groups are written in one transaction; nothing is
/// persisted if any step fails.
#[instrument(skip_all, name = "event.service.create_event", fields(user_id = identity.user_id))]
pub async fn create_event(
    pool: &PgPool,
    identity: &Identity,
    request: EventRequest,
) -> Result<EventCreatedResponse, ApiError> {
    let result = create_event_inner(pool, identity, request).await;
    record("create", &result);
    result
}

async fn create_event_inner(
    pool: &PgPool,
    identity: &Identity,
    request: EventRequest,
) -> Result<EventCreatedResponse, ApiError> {
    let draft = validate_event_request(request)?;

    let organizer = users::get_by_id(pool, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated(CALLER_NOT_FOUND.to_string()))?;

    let mut tx = pool.begin().await?;
    let event_id = events::insert_event(&mut tx, &draft, organizer.id).await?;
    let groups_created = group_events::create_for_all_departments(&mut tx, event_id).await?;
    tx.commit().await?;

    record_groups_created(groups_created);
    tracing::info!(
        target: "event.service.events",
        event_id,
        groups_created,
        organizer_id = organizer.id,
        "Event created"
    );

    Ok(EventCreatedResponse {
        message: format!("Evento creado exitosamente con {} grupos.", groups_created),
        event_id,
        groups_created,
    })
}

/// Overwrite an existing event's fields. Groups are not touched.
#[instrument(skip_all, name = "event.service.update_event", fields(event_id = event_id))]
pub async fn update_event(
    pool: &PgPool,
    event_id: i64,
    request: EventRequest,
) -> Result<MessageResponse, ApiError> {
    let result = update_event_inner(pool, event_id, request).await;
    record("update", &result);
    result
}

async fn update_event_inner(
    pool: &PgPool,
    event_id: i64,
    request: EventRequest,
) -> Result<MessageResponse, ApiError> {
    if events::get_event(pool, event_id).await?.is_none() {
        return Err(ApiError::NotFound(EVENT_NOT_FOUND.to_string()));
    }

    let draft = validate_event_request(request)?;

    if !events::update_event(pool, event_id, &draft).await? {
        return Err(ApiError::NotFound(EVENT_NOT_FOUND.to_string()));
    }

    tracing::info!(target: "event.service.events", event_id, "Event updated");
    Ok(MessageResponse::new(EVENT_UPDATED))
}

/// Delete an event with its groups and inscriptions in one transaction.
#[instrument(skip_all, name = "event.service.delete_event", fields(event_id = event_id))]
pub async fn delete_event(pool: &PgPool, event_id: i64) -> Result<MessageResponse, ApiError> {
    let result = delete_event_inner(pool, event_id).await;
    record("delete", &result);
    result
}

async fn delete_event_inner(pool: &PgPool, event_id: i64) -> Result<MessageResponse, ApiError> {
    let mut tx = pool.begin().await?;

    if !events::lock_event(&mut tx, event_id).await? {
        return Err(ApiError::NotFound(EVENT_NOT_FOUND.to_string()));
    }

    let groups = group_events::delete_for_event(&mut tx, event_id).await?;
    let inscriptions = inscriptions::delete_for_event(&mut tx, event_id).await?;
    events::delete_event(&mut tx, event_id).await?;
    tx.commit().await?;

    tracing::info!(
        target: "event.service.events",
        event_id,
        groups,
        inscriptions,
        "Event deleted"
    );
    Ok(MessageResponse::new(EVENT_DELETED))
}

/// Fetch one event projection.
#[instrument(skip_all, name = "event.service.get_event", fields(event_id = event_id))]
pub async fn get_event(pool: &PgPool, event_id: i64) -> Result<EventResponse, ApiError> {
    events::get_event(pool, event_id)
        .await?
        .map(project)
        .ok_or_else(|| ApiError::NotFound(EVENT_NOT_FOUND.to_string()))
}

/// List every event projection.
#[instrument(skip_all, name = "event.service.list_events")]
pub async fn list_events(pool: &PgPool) -> Result<Vec<EventResponse>, ApiError> {
    Ok(events::list_events(pool)
        .await?
        .into_iter()
        .map(project)
        .collect())
}
