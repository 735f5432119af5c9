//! User repository: accounts, role links and profile lookups.

use crate::errors::ApiError;
use crate::models::Role;
use crate::observability::metrics::record_db_query;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;
use std::time::Instant;
use tracing::instrument;

/// Message returned when a username is already registered.
pub const USERNAME_TAKEN: &str = "Error: Username is already taken!";

/// Message returned when an email is already registered.
pub const EMAIL_TAKEN: &str = "Error: Email is already in use!";

/// User model (maps to users table)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub career_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Career and department names attached to a user, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Affiliation {
    pub career: Option<String>,
    pub department: Option<String>,
}

/// Get user by username.
#[instrument(skip_all, name = "event.repo.get_user_by_username")]
pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, ApiError> {
    let start = Instant::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, career_id, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        record_db_query("get_user_by_username", "error", start.elapsed());
        ApiError::Database(format!("Failed to fetch user by username: {}", e))
    })?;

    record_db_query("get_user_by_username", "success", start.elapsed());
    Ok(user)
}

/// Get user by id.
#[instrument(skip_all, name = "event.repo.get_user_by_id")]
pub async fn get_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, ApiError> {
    let start = Instant::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, career_id, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        record_db_query("get_user_by_id", "error", start.elapsed());
        ApiError::Database(format!("Failed to fetch user by id: {}", e))
    })?;

    record_db_query("get_user_by_id", "success", start.elapsed());
    Ok(user)
}

/// True if a user with this username exists.
#[instrument(skip_all, name = "event.repo.username_exists")]
pub async fn exists_by_username(pool: &PgPool, username: &str) -> Result<bool, ApiError> {
    let start = Instant::now();

    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                record_db_query("username_exists", "error", start.elapsed());
                ApiError::Database(format!("Failed to check username: {}", e))
            })?;

    record_db_query("username_exists", "success", start.elapsed());
    Ok(exists)
}

/// True if a user with this email exists.
#[instrument(skip_all, name = "event.repo.email_exists")]
pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, ApiError> {
    let start = Instant::now();

    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            record_db_query("email_exists", "error", start.elapsed());
            ApiError::Database(format!("Failed to check email: {}", e))
        })?;

    record_db_query("email_exists", "success", start.elapsed());
    Ok(exists)
}

/// Insert a user.
///
/// Unique violations that slip past the pre-checks (concurrent signups)
/// surface as the same `Conflict` messages.
#[instrument(skip_all, name = "event.repo.create_user")]
pub async fn create_user(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password_hash: &str,
    career_id: Option<i64>,
) -> Result<User, ApiError> {
    let start = Instant::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, career_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, email, password_hash, career_id, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(career_id)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        record_db_query("create_user", "error", start.elapsed());
        let constraint = e
            .as_database_error()
            .and_then(|db| db.constraint())
            .map(str::to_string);
        match constraint.as_deref() {
            Some("users_username_unique") => ApiError::Conflict(USERNAME_TAKEN.to_string()),
            Some("users_email_unique") => ApiError::Conflict(EMAIL_TAKEN.to_string()),
            _ => ApiError::Database(format!("Failed to create user: {}", e)),
        }
    })?;

    record_db_query("create_user", "success", start.elapsed());
    Ok(user)
}

/// Link a user to a seeded role.
///
/// # Errors
///
/// `ApiError::Internal` if the role row is missing (roles not seeded).
#[instrument(skip_all, name = "event.repo.add_user_role")]
pub async fn add_user_role(
    conn: &mut PgConnection,
    user_id: i64,
    role: Role,
) -> Result<(), ApiError> {
    let start = Instant::now();

    let result = sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_id)
        SELECT $1, id FROM roles WHERE name = $2
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role.as_db_name())
    .execute(conn)
    .await
    .map_err(|e| {
        record_db_query("add_user_role", "error", start.elapsed());
        ApiError::Database(format!("Failed to add user role: {}", e))
    })?;

    record_db_query("add_user_role", "success", start.elapsed());

    if result.rows_affected() == 0 {
        return Err(ApiError::Internal(format!(
            "Role {} is not seeded",
            role.as_db_name()
        )));
    }

    Ok(())
}

/// Roles held by a user, sorted.
///
/// Unknown role names in the table are skipped and logged.
#[instrument(skip_all, name = "event.repo.get_user_roles")]
pub async fn get_user_roles(pool: &PgPool, user_id: i64) -> Result<Vec<Role>, ApiError> {
    let start = Instant::now();

    let names: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT r.name
        FROM user_roles ur
        JOIN roles r ON r.id = ur.role_id
        WHERE ur.user_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        record_db_query("get_user_roles", "error", start.elapsed());
        ApiError::Database(format!("Failed to fetch user roles: {}", e))
    })?;

    record_db_query("get_user_roles", "success", start.elapsed());

    let roles = names
        .into_iter()
        .filter_map(|(name,)| match Role::from_str(&name) {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(target: "event.repo.users", error = %e, "Skipping unknown role");
                None
            }
        })
        .collect();

    Ok(roles)
}

/// Career and owning department of a user.
#[instrument(skip_all, name = "event.repo.get_affiliation")]
pub async fn get_affiliation(pool: &PgPool, user_id: i64) -> Result<Affiliation, ApiError> {
    let start = Instant::now();

    let affiliation = sqlx::query_as::<_, Affiliation>(
        r#"
        SELECT c.name AS career, d.name AS department
        FROM users u
        LEFT JOIN careers c ON c.id = u.career_id
        LEFT JOIN departments d ON d.id = c.department_id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        record_db_query("get_affiliation", "error", start.elapsed());
        ApiError::Database(format!("Failed to fetch user affiliation: {}", e))
    })?;

    record_db_query("get_affiliation", "success", start.elapsed());
    Ok(affiliation.unwrap_or_default())
}
