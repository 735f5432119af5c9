//! Department reference data.

use crate::errors::ApiError;
use crate::models::DepartmentResponse;
use crate::observability::metrics::record_db_query;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// List all departments ordered by id.
#[instrument(skip_all, name = "event.repo.list_departments")]
pub async fn list_departments(pool: &PgPool) -> Result<Vec<DepartmentResponse>, ApiError> {
    let start = Instant::now();

    let departments =
        sqlx::query_as::<_, DepartmentResponse>("SELECT id, name FROM departments ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                record_db_query("list_departments", "error", start.elapsed());
                ApiError::Database(format!("Failed to list departments: {}", e))
            })?;

    record_db_query("list_departments", "success", start.elapsed());
    Ok(departments)
}
