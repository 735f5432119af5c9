//! Request/response payloads and the closed role set.

use chrono::{DateTime, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organizer name reported for events whose organizer no longer exists.
pub const NO_ORGANIZER: &str = "No organizer";

/// Authorization role.
///
/// Persisted in the `roles` table under its `ROLE_*` name and carried in
/// session tokens under the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    User,
    Admin,
    Organizer,
    Juror,
}

impl Role {
    /// Every role, in seeding order.
    pub const ALL: [Role; 4] = [Role::User, Role::Admin, Role::Organizer, Role::Juror];

    /// Name stored in the database and in token claims.
    pub fn as_db_name(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
            Role::Organizer => "ROLE_ORGANIZER",
            Role::Juror => "ROLE_JUROR",
        }
    }

    /// Map a role name from a signup payload.
    ///
    /// Accepts the English names and the Spanish aliases the web client
    /// sends (`organizador`, `jurado`). Returns `None` for anything else.
    pub fn from_request_name(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "organizer" | "organizador" => Some(Role::Organizer),
            "juror" | "jurado" => Some(Role::Juror),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            "ROLE_ORGANIZER" => Ok(Role::Organizer),
            "ROLE_JUROR" => Ok(Role::Juror),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// ============================================================================
// Auth payloads
// ============================================================================

/// Signin request body.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: SecretString,
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    /// Requested role names; absent or empty means `USER`.
    #[serde(default, alias = "roles")]
    pub role: Option<Vec<String>>,
    #[serde(default, rename = "careerId", alias = "career_id")]
    pub career_id: Option<i64>,
}

/// Profile returned by signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub career: Option<String>,
    pub department: Option<String>,
    /// Names of the events the user is inscribed in.
    pub inscriptions: Vec<String>,
    pub roles: Vec<String>,
}

/// Plain `{"message": ...}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Reference data
// ============================================================================

/// Department as listed by `/api/department/all`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DepartmentResponse {
    pub id: i64,
    pub name: String,
}

/// Career as listed by `/api/career/all`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CareerResponse {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub department_name: String,
}

// ============================================================================
// Event payloads
// ============================================================================

/// Create/update request body for events.
///
/// Every field is optional at the JSON level so that missing values surface
/// as validation errors rather than body parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default, rename = "startDate", alias = "start_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "endDate", alias = "end_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "maxParticipantsGroup")]
    pub max_participants_group: Option<i32>,
    #[serde(default, rename = "imgEvent", alias = "img_event")]
    pub img_event: Option<String>,
}

/// Event fields after validation, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub description: Option<String>,
    pub place: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_participants_group: i32,
    pub img_event: Option<String>,
}

/// Response for a successful event creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreatedResponse {
    pub message: String,
    pub event_id: i64,
    pub groups_created: u64,
}

/// Event projection returned by the read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub place: Option<String>,
    #[serde(rename = "imgEvent")]
    pub img_event: Option<String>,
    /// Organizer username, or [`NO_ORGANIZER`].
    pub organizer: String,
}
