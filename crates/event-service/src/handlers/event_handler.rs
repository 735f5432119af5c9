//! `/api/events` handlers.
//!
//! Role checks happen in the route's `RolePolicy`; handlers receive the
//! caller's [`Identity`] only where the workflow needs it. Event ids arrive
//! as raw path segments and are parsed here.

use crate::auth::Identity;
use crate::errors::ApiError;
use crate::handlers::{parse_event_id, parse_json};
use crate::models::{EventCreatedResponse, EventRequest, EventResponse, MessageResponse};
use crate::routes::AppState;
use crate::services::event_service;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// GET /api/events/all
#[instrument(skip_all, name = "event.handler.list_events")]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    Ok(Json(event_service::list_events(&state.pool).await?))
}

/// GET /api/events/{id}
#[instrument(skip_all, name = "event.handler.get_event", fields(event_id = %id))]
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    Ok(Json(event_service::get_event(&state.pool, event_id).await?))
}

/// POST /api/events/add
#[instrument(skip_all, name = "event.handler.create_event")]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<EventCreatedResponse>, ApiError> {
    let request: EventRequest = parse_json(&body)?;
    Ok(Json(
        event_service::create_event(&state.pool, &identity, request).await?,
    ))
}

/// PUT /api/events/update/{id}
#[instrument(skip_all, name = "event.handler.update_event", fields(event_id = %id))]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    let request: EventRequest = parse_json(&body)?;
    Ok(Json(
        event_service::update_event(&state.pool, event_id, request).await?,
    ))
}

/// DELETE /api/events/delete/{id}
#[instrument(skip_all, name = "event.handler.delete_event", fields(event_id = %id))]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    Ok(Json(event_service::delete_event(&state.pool, event_id).await?))
}
