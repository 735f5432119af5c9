//! Database fixtures.
//!
//! Fixtures write directly through the service's repositories so that test
//! data goes through the same constraints as production data.

use crate::test_ids::TEST_PASSWORD;
use event_service::config::MIN_BCRYPT_COST;
use event_service::crypto;
use event_service::models::Role;
use event_service::repositories::{roles, users};
use sqlx::PgPool;

/// Insert a department and return its id.
pub async fn create_department(pool: &PgPool, name: &str) -> Result<i64, anyhow::Error> {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO departments (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Insert a career under `department_id` and return its id.
pub async fn create_career(
    pool: &PgPool,
    name: &str,
    department_id: i64,
) -> Result<i64, anyhow::Error> {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO careers (name, department_id) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(department_id)
            .fetch_one(pool)
            .await?;
    Ok(id)
}

/// Create a user with [`TEST_PASSWORD`] and the given roles.
///
/// Seeds roles first, so it can be called on a fresh database.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    user_roles: &[Role],
) -> Result<i64, anyhow::Error> {
    roles::seed_roles(pool).await?;

    let hash = crypto::hash_password(TEST_PASSWORD, MIN_BCRYPT_COST)?;
    let email = format!("{}@example.org", username);

    let mut tx = pool.begin().await?;
    let user = users::create_user(&mut tx, username, &email, &hash, None).await?;
    for role in user_roles {
        users::add_user_role(&mut tx, user.id, *role).await?;
    }
    tx.commit().await?;

    Ok(user.id)
}

/// Inscribe a user in an event.
pub async fn inscribe(pool: &PgPool, user_id: i64, event_id: i64) -> Result<(), anyhow::Error> {
    sqlx::query("INSERT INTO inscriptions (user_id, event_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Count rows of a table.
pub async fn count_rows(pool: &PgPool, table: &str) -> Result<i64, anyhow::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}
