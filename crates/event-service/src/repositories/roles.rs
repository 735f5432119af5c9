//! Role seeding.

use crate::errors::ApiError;
use crate::models::Role;
use crate::observability::metrics::record_db_query;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// Insert every [`Role`] that is not yet present.
///
/// Idempotent. Returns the number of rows inserted.
#[instrument(skip_all, name = "event.repo.seed_roles")]
pub async fn seed_roles(pool: &PgPool) -> Result<u64, ApiError> {
    let start = Instant::now();
    let names: Vec<String> = Role::ALL
        .iter()
        .map(|r| r.as_db_name().to_string())
        .collect();

    let result = sqlx::query(
        r#"
        INSERT INTO roles (name)
        SELECT UNNEST($1::text[])
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(&names)
    .execute(pool)
    .await
    .map_err(|e| {
        record_db_query("seed_roles", "error", start.elapsed());
        ApiError::Database(format!("Failed to seed roles: {}", e))
    })?;

    record_db_query("seed_roles", "success", start.elapsed());
    Ok(result.rows_affected())
}
