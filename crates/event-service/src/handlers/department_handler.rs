//! `/api/department` handlers.

use crate::errors::ApiError;
use crate::models::DepartmentResponse;
use crate::repositories::departments;
use crate::routes::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /api/department/all
#[tracing::instrument(skip_all, name = "event.handler.list_departments")]
pub async fn list_departments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    Ok(Json(departments::list_departments(&state.pool).await?))
}
