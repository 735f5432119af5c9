//! `/api/career` handlers.

use crate::errors::ApiError;
use crate::models::CareerResponse;
use crate::repositories::careers;
use crate::routes::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /api/career/all
///
/// Public: the signup form needs the career list before the user has a
/// session.
#[tracing::instrument(skip_all, name = "event.handler.list_careers")]
pub async fn list_careers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CareerResponse>>, ApiError> {
    Ok(Json(careers::list_careers(&state.pool).await?))
}
