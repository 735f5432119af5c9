//! `/api/auth` handlers.

use crate::errors::ApiError;
use crate::handlers::parse_json;
use crate::models::{MessageResponse, SigninRequest, SignupRequest, UserInfoResponse};
use crate::routes::AppState;
use crate::services::auth_service::{self, SIGNOUT_MESSAGE, SIGNUP_SUCCESS_MESSAGE};
use axum::{body::Bytes, extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::instrument;

/// Handle signin
///
/// POST /api/auth/signin
///
/// Sets the session cookie and returns the user's profile.
#[instrument(skip_all, name = "event.handler.signin")]
pub async fn signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<UserInfoResponse>), ApiError> {
    let request: SigninRequest = parse_json(&body)?;
    let outcome = auth_service::signin(&state.pool, &state.token_service, request).await?;

    let jar = jar.add(state.token_service.session_cookie(outcome.token));
    Ok((jar, Json(outcome.user)))
}

/// Handle signup
///
/// POST /api/auth/signup
#[instrument(skip_all, name = "event.handler.signup")]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: SignupRequest = parse_json(&body)?;
    auth_service::signup(&state.pool, state.config.bcrypt_cost, request).await?;

    Ok(Json(MessageResponse::new(SIGNUP_SUCCESS_MESSAGE)))
}

/// Handle signout
///
/// POST /api/auth/signout
///
/// Tokens are stateless; signout only clears the cookie.
#[instrument(skip_all, name = "event.handler.signout")]
pub async fn signout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(state.token_service.removal_cookie());
    (jar, Json(MessageResponse::new(SIGNOUT_MESSAGE)))
}
