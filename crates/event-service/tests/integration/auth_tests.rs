//! E2E tests for signup, signin and signout.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use event_service::models::Role;
use event_test_utils::{
    create_career, create_department, create_user, inscribe, server_harness::TestEventServer,
    session_cookie, set_cookie_header, CAREER_SOFTWARE, DEPT_COMPUTING, TEST_PASSWORD,
};
use reqwest::{header, StatusCode};
use serde_json::json;
use sqlx::PgPool;

// ============================================================================
// Signup
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_happy_path(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let department = create_department(server.pool(), DEPT_COMPUTING).await?;
    let career = create_career(server.pool(), CAREER_SOFTWARE, department).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signup", server.url()))
        .json(&json!({
            "username": "ana",
            "email": "ana@example.org",
            "password": "secret-pw",
            "role": ["organizador"],
            "careerId": career
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "User registered successfully!");

    // The new account can sign in and carries the requested role.
    let response = server
        .client()
        .post(format!("{}/api/auth/signin", server.url()))
        .json(&json!({ "username": "ana", "password": "secret-pw" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["roles"], json!(["ROLE_ORGANIZER"]));
    assert_eq!(body["career"], CAREER_SOFTWARE);
    assert_eq!(body["department"], DEPT_COMPUTING);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_duplicate_username_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "ana", &[Role::User]).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signup", server.url()))
        .json(&json!({
            "username": "ana",
            "email": "fresh@example.org",
            "password": "secret-pw"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Error: Username is already taken!");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_duplicate_email_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "ana", &[Role::User]).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signup", server.url()))
        .json(&json!({
            "username": "other",
            "email": "ana@example.org",
            "password": "secret-pw"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Error: Email is already in use!");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_invalid_fields_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    for payload in [
        json!({ "username": "ab", "email": "ab@example.org", "password": "secret-pw" }),
        json!({ "username": "abc", "email": "not-an-email", "password": "secret-pw" }),
        json!({ "username": "abc", "email": "abc@example.org", "password": "123" }),
        json!({ "username": "abc", "email": "abc@example.org", "password": "secret-pw", "role": ["root"] }),
    ] {
        let response = server
            .client()
            .post(format!("{}/api/auth/signup", server.url()))
            .json(&payload)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {payload}");
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_malformed_json_is_bad_request(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signup", server.url()))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{\"username\": ")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    Ok(())
}

// ============================================================================
// Signin
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_signin_sets_session_cookie(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let user_id = create_user(server.pool(), "org", &[Role::User, Role::Organizer]).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signin", server.url()))
        .json(&json!({ "username": "org", "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = set_cookie_header(&response).expect("session cookie should be set");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/api"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=3600"));
    assert!(!set_cookie.contains("Secure"));

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["id"], user_id);
    assert_eq!(body["username"], "org");
    assert_eq!(body["email"], "org@example.org");
    assert_eq!(body["roles"], json!(["ROLE_USER", "ROLE_ORGANIZER"]));
    assert_eq!(body["inscriptions"], json!([]));
    assert!(body["career"].is_null());
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_signin_lists_inscriptions(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let user_id = create_user(server.pool(), "ana", &[Role::User]).await?;
    let (event_id,): (i64,) = sqlx::query_as(
        "INSERT INTO events (name, start_date, end_date) VALUES ('Feria', NOW(), NOW()) RETURNING id",
    )
    .fetch_one(server.pool())
    .await?;
    inscribe(server.pool(), user_id, event_id).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signin", server.url()))
        .json(&json!({ "username": "ana", "password": TEST_PASSWORD }))
        .send()
        .await?;

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["inscriptions"], json!(["Feria"]));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_signin_bad_credentials_are_indistinguishable(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "ana", &[Role::User]).await?;

    let wrong_password = server
        .client()
        .post(format!("{}/api/auth/signin", server.url()))
        .json(&json!({ "username": "ana", "password": "wrong-password" }))
        .send()
        .await?;
    let unknown_user = server
        .client()
        .post(format!("{}/api/auth/signin", server.url()))
        .json(&json!({ "username": "nobody", "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&wrong_password).is_none());

    let first: serde_json::Value = wrong_password.json().await?;
    let second: serde_json::Value = unknown_user.json().await?;
    assert_eq!(first, second);
    assert_eq!(first["error"]["code"], "INVALID_CREDENTIALS");
    Ok(())
}

// ============================================================================
// Signout and session handling
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_signout_clears_cookie(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signout", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = set_cookie_header(&response).expect("removal cookie should be set");
    assert!(set_cookie.starts_with("event_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "You've been signed out!");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_tampered_cookie_is_rejected_with_generic_error(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "ana", &[Role::User]).await?;
    let cookie = server.signin("ana", TEST_PASSWORD).await?;

    // Replace the first character of the signature.
    let dot = cookie.rfind('.').expect("token has a signature part");
    let (head, signature) = cookie.split_at(dot + 1);
    let mut chars = signature.chars();
    let first = chars.next().expect("signature is not empty");
    let replacement = if first == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}{}{}", head, replacement, chars.as_str());

    let response = server
        .client()
        .get(format!("{}/api/events/all", server.url()))
        .header(header::COOKIE, tampered)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert_eq!(
        body["error"]["message"],
        "The session token is invalid or expired"
    );
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_public_routes_ignore_missing_cookie(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/api/career/all", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_stale_cookie_does_not_block_signin(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "ana", &[Role::User]).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/signin", server.url()))
        .header(header::COOKIE, "event_session=expired.or.garbage")
        .json(&json!({ "username": "ana", "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
    Ok(())
}
