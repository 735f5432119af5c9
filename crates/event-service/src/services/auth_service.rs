//! Signup and signin.
//!
//! Signup validates the payload, checks uniqueness before writing, and
//! persists the user and its role links in one transaction. Signin verifies
//! the password and issues a session token.

use crate::auth::{Identity, TokenService};
use crate::crypto;
use crate::errors::ApiError;
use crate::models::{Role, SigninRequest, SignupRequest, UserInfoResponse};
use crate::observability::metrics::record_auth_attempt;
use crate::repositories::users::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::repositories::{careers, inscriptions, users};
use common::secret::ExposeSecret;
use sqlx::PgPool;
use tracing::instrument;

/// Message returned by a successful signup.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "User registered successfully!";

/// Message returned by signout.
pub const SIGNOUT_MESSAGE: &str = "You've been signed out!";

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 20;
const MAX_EMAIL_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 40;

/// Result of a successful signin: the token for the cookie and the profile
/// for the body.
#[derive(Debug)]
pub struct SigninOutcome {
    pub token: String,
    pub user: UserInfoResponse,
}

/// Register a new account.
///
/// # Steps
///
/// 1. Validate username, email and password shape
/// 2. Reject a taken username, then a taken email
/// 3. Check the optional career exists
/// 4. Map requested role names (none means `USER`)
/// 5. Hash the password
/// 6. Insert user and role links in one transaction
///
/// Returns the new user id.
#[instrument(skip_all, name = "event.service.signup")]
pub async fn signup(pool: &PgPool, bcrypt_cost: u32, request: SignupRequest) -> Result<i64, ApiError> {
    let result = signup_inner(pool, bcrypt_cost, request).await;
    record_auth_attempt("signup", if result.is_ok() { "success" } else { "error" });
    result
}

async fn signup_inner(
    pool: &PgPool,
    bcrypt_cost: u32,
    request: SignupRequest,
) -> Result<i64, ApiError> {
    let username = request.username.trim();
    let email = request.email.trim();
    let password = request.password.expose_secret();

    validate_username(username)?;
    validate_email(email)?;
    validate_password(password)?;

    if users::exists_by_username(pool, username).await? {
        return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
    }
    if users::exists_by_email(pool, email).await? {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    if let Some(career_id) = request.career_id {
        if !careers::exists(pool, career_id).await? {
            return Err(ApiError::Validation(
                "Error: Career is not found.".to_string(),
            ));
        }
    }

    let roles = map_requested_roles(request.role.as_deref())?;
    let password_hash = crypto::hash_password(password, bcrypt_cost)?;

    let mut tx = pool.begin().await?;
    let user = users::create_user(&mut tx, username, email, &password_hash, request.career_id).await?;
    for role in &roles {
        users::add_user_role(&mut tx, user.id, *role).await?;
    }
    tx.commit().await?;

    tracing::info!(
        target: "event.service.auth",
        user_id = user.id,
        roles = ?roles,
        "User registered"
    );

    Ok(user.id)
}

/// Verify credentials and issue a session token.
///
/// Unknown usernames and wrong passwords produce the same error. A dummy
/// hash is verified for unknown usernames so both paths cost one bcrypt
/// verification.
#[instrument(skip_all, name = "event.service.signin")]
pub async fn signin(
    pool: &PgPool,
    token_service: &TokenService,
    request: SigninRequest,
) -> Result<SigninOutcome, ApiError> {
    let result = signin_inner(pool, token_service, request).await;
    record_auth_attempt("signin", if result.is_ok() { "success" } else { "error" });
    result
}

async fn signin_inner(
    pool: &PgPool,
    token_service: &TokenService,
    request: SigninRequest,
) -> Result<SigninOutcome, ApiError> {
    let password = request.password.expose_secret();
    let user = users::get_by_username(pool, request.username.trim()).await?;

    let user = match user {
        Some(user) => {
            if !crypto::verify_password(password, &user.password_hash)? {
                tracing::debug!(target: "event.service.auth", "Signin rejected: wrong password");
                return Err(ApiError::InvalidCredentials);
            }
            user
        }
        None => {
            let _ = crypto::verify_password(password, crypto::DUMMY_PASSWORD_HASH);
            tracing::debug!(target: "event.service.auth", "Signin rejected: unknown user");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let roles = users::get_user_roles(pool, user.id).await?;
    let affiliation = users::get_affiliation(pool, user.id).await?;
    let inscriptions = inscriptions::event_names_for_user(pool, user.id).await?;

    let identity = Identity {
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        roles,
    };
    let token = token_service.issue(&identity)?;

    Ok(SigninOutcome {
        token,
        user: UserInfoResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            career: affiliation.career,
            department: affiliation.department,
            inscriptions,
            roles: identity.role_names(),
        },
    })
}

/// Map signup role names to roles. Absent or empty means `[User]`.
///
/// # Errors
///
/// `ApiError::Validation` naming the first unknown role.
pub fn map_requested_roles(names: Option<&[String]>) -> Result<Vec<Role>, ApiError> {
    let names = match names {
        Some(names) if !names.is_empty() => names,
        _ => return Ok(vec![Role::User]),
    };

    let mut roles = Vec::with_capacity(names.len());
    for name in names {
        let role = Role::from_request_name(name)
            .ok_or_else(|| ApiError::Validation(format!("Error: Unknown role '{}'.", name)))?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ApiError::Validation(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ApiError::Validation(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(ApiError::Validation(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Basic `local@domain.tld` check.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
