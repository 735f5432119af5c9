//! Career reference data.

use crate::errors::ApiError;
use crate::models::CareerResponse;
use crate::observability::metrics::record_db_query;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// List all careers with their department name.
#[instrument(skip_all, name = "event.repo.list_careers")]
pub async fn list_careers(pool: &PgPool) -> Result<Vec<CareerResponse>, ApiError> {
    let start = Instant::now();

    let careers = sqlx::query_as::<_, CareerResponse>(
        r#"
        SELECT c.id, c.name, c.department_id, d.name AS department_name
        FROM careers c
        JOIN departments d ON d.id = c.department_id
        ORDER BY c.id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        record_db_query("list_careers", "error", start.elapsed());
        ApiError::Database(format!("Failed to list careers: {}", e))
    })?;

    record_db_query("list_careers", "success", start.elapsed());
    Ok(careers)
}

/// True if a career with this id exists.
#[instrument(skip_all, name = "event.repo.career_exists")]
pub async fn exists(pool: &PgPool, career_id: i64) -> Result<bool, ApiError> {
    let start = Instant::now();

    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM careers WHERE id = $1)")
        .bind(career_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            record_db_query("career_exists", "error", start.elapsed());
            ApiError::Database(format!("Failed to check career: {}", e))
        })?;

    record_db_query("career_exists", "success", start.elapsed());
    Ok(exists)
}
