//! E2E tests for the event workflow.
//!
//! ## Test Categories
//!
//! - **Create**: group fan-out, validation, role policy
//! - **Update**: field overwrite, not found, admin access
//! - **Delete**: dependents removed, not found
//! - **Read**: projections and the organizer sentinel

use event_service::models::Role;
use event_test_utils::{
    count_rows, create_department, create_user, inscribe, server_harness::TestEventServer,
    DEPT_COMPUTING, DEPT_ELECTRONICS, DEPT_MECHANICS, TEST_PASSWORD,
};
use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

fn hackathon() -> Value {
    json!({
        "name": "Hackathon",
        "description": "48 horas de código",
        "place": "Aula Magna",
        "startDate": "2025-03-01T09:00:00Z",
        "endDate": "2025-03-03T18:00:00Z",
        "max_participants_group": 5,
        "imgEvent": "hackathon.png"
    })
}

async fn organizer_session(server: &TestEventServer) -> Result<String, anyhow::Error> {
    create_user(server.pool(), "org", &[Role::User, Role::Organizer]).await?;
    server.signin("org", TEST_PASSWORD).await
}

async fn create(
    server: &TestEventServer,
    cookie: &str,
    payload: &Value,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .post(format!("{}/api/events/add", server.url()))
        .header(header::COOKIE, cookie)
        .json(payload)
        .send()
        .await?)
}

// ============================================================================
// Create
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_fans_out_groups(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_department(server.pool(), DEPT_COMPUTING).await?;
    create_department(server.pool(), DEPT_ELECTRONICS).await?;
    let cookie = organizer_session(&server).await?;

    let response = create(&server, &cookie, &hackathon()).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Evento creado exitosamente con 2 grupos.");
    assert_eq!(body["groups_created"], 2);

    let event_id = body["event_id"].as_i64().expect("event_id is a number");
    let groups: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM group_events WHERE event_id = $1 ORDER BY id")
            .bind(event_id)
            .fetch_all(server.pool())
            .await?;
    let names: Vec<String> = groups.into_iter().map(|(n,)| n).collect();
    assert_eq!(names, vec![DEPT_COMPUTING, DEPT_ELECTRONICS]);

    let response = server
        .client()
        .get(format!("{}/api/events/{}", server.url(), event_id))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let event: Value = response.json().await?;
    assert_eq!(event["name"], "Hackathon");
    assert_eq!(event["organizer"], "org");
    assert_eq!(event["imgEvent"], "hackathon.png");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_start_after_end_persists_nothing(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_department(server.pool(), DEPT_COMPUTING).await?;
    let cookie = organizer_session(&server).await?;

    let mut payload = hackathon();
    payload["startDate"] = json!("2025-03-05T09:00:00Z");

    let response = create(&server, &cookie, &payload).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        "Error: La fecha de inicio no puede ser posterior a la fecha de fin."
    );
    assert_eq!(count_rows(server.pool(), "events").await?, 0);
    assert_eq!(count_rows(server.pool(), "group_events").await?, 0);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_missing_dates_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let cookie = organizer_session(&server).await?;

    let response = create(&server, &cookie, &json!({ "name": "Sin fechas" })).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(
        body["error"]["message"],
        "Error: Las fechas de inicio y fin son obligatorias."
    );
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_malformed_body_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let cookie = organizer_session(&server).await?;

    let response = server
        .client()
        .post(format!("{}/api/events/add", server.url()))
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body("not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_requires_organizer(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "admin", &[Role::Admin]).await?;
    let cookie = server.signin("admin", TEST_PASSWORD).await?;

    let response = create(&server, &cookie, &hackathon()).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(count_rows(server.pool(), "events").await?, 0);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_without_session_is_unauthenticated(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/events/add", server.url()))
        .json(&hackathon())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

// ============================================================================
// Update
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_event_by_admin(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_department(server.pool(), DEPT_COMPUTING).await?;
    let organizer = organizer_session(&server).await?;
    let body: Value = create(&server, &organizer, &hackathon()).await?.json().await?;
    let event_id = body["event_id"].as_i64().expect("event_id is a number");

    create_user(server.pool(), "admin", &[Role::Admin]).await?;
    let admin = server.signin("admin", TEST_PASSWORD).await?;

    let mut payload = hackathon();
    payload["name"] = json!("Hackathon 2025");
    payload["place"] = json!("Laboratorio 3");

    let response = server
        .client()
        .put(format!("{}/api/events/update/{}", server.url(), event_id))
        .header(header::COOKIE, &admin)
        .json(&payload)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Evento actualizado exitosamente.");

    let event: Value = server
        .client()
        .get(format!("{}/api/events/{}", server.url(), event_id))
        .header(header::COOKIE, &admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(event["name"], "Hackathon 2025");
    assert_eq!(event["place"], "Laboratorio 3");
    // Organizer is unchanged by an admin edit.
    assert_eq!(event["organizer"], "org");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_missing_event_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let cookie = organizer_session(&server).await?;

    let response = server
        .client()
        .put(format!("{}/api/events/update/9999", server.url()))
        .header(header::COOKIE, &cookie)
        .json(&hackathon())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Error: Evento no encontrado.");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_event_forbidden_for_juror(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let organizer = organizer_session(&server).await?;
    let body: Value = create(&server, &organizer, &hackathon()).await?.json().await?;
    let event_id = body["event_id"].as_i64().expect("event_id is a number");

    create_user(server.pool(), "jurado", &[Role::Juror]).await?;
    let juror = server.signin("jurado", TEST_PASSWORD).await?;

    let response = server
        .client()
        .put(format!("{}/api/events/update/{}", server.url(), event_id))
        .header(header::COOKIE, &juror)
        .json(&hackathon())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

// ============================================================================
// Delete
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_event_removes_dependents(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_department(server.pool(), DEPT_COMPUTING).await?;
    create_department(server.pool(), DEPT_ELECTRONICS).await?;
    create_department(server.pool(), DEPT_MECHANICS).await?;
    let cookie = organizer_session(&server).await?;
    let body: Value = create(&server, &cookie, &hackathon()).await?.json().await?;
    let event_id = body["event_id"].as_i64().expect("event_id is a number");

    let student = create_user(server.pool(), "ana", &[Role::User]).await?;
    inscribe(server.pool(), student, event_id).await?;

    let response = server
        .client()
        .delete(format!("{}/api/events/delete/{}", server.url(), event_id))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(
        body["message"],
        "Evento y sus grupos asociados eliminados exitosamente."
    );
    assert_eq!(count_rows(server.pool(), "group_events").await?, 0);
    assert_eq!(count_rows(server.pool(), "inscriptions").await?, 0);

    let response = server
        .client()
        .get(format!("{}/api/events/{}", server.url(), event_id))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_missing_event_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_department(server.pool(), DEPT_COMPUTING).await?;
    let cookie = organizer_session(&server).await?;
    create(&server, &cookie, &hackathon()).await?;

    let response = server
        .client()
        .delete(format!("{}/api/events/delete/9999", server.url()))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(count_rows(server.pool(), "events").await?, 1);
    assert_eq!(count_rows(server.pool(), "group_events").await?, 1);
    Ok(())
}

// ============================================================================
// Read
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_events_reports_missing_organizer(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let organizer = organizer_session(&server).await?;
    create(&server, &organizer, &hackathon()).await?;

    sqlx::query("DELETE FROM users WHERE username = 'org'")
        .execute(server.pool())
        .await?;

    create_user(server.pool(), "ana", &[Role::User]).await?;
    let student = server.signin("ana", TEST_PASSWORD).await?;

    let response = server
        .client()
        .get(format!("{}/api/events/all", server.url()))
        .header(header::COOKIE, &student)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let events: Vec<Value> = response.json().await?;
    assert_eq!(events.len(), 1);
    let event = events.first().expect("one event");
    assert_eq!(event["organizer"], "No organizer");
    assert_eq!(event["name"], "Hackathon");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_unknown_event_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_user(server.pool(), "ana", &[Role::User]).await?;
    let cookie = server.signin("ana", TEST_PASSWORD).await?;

    let response = server
        .client()
        .get(format!("{}/api/events/424242", server.url()))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

// ============================================================================
// Input limits
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_event_overlong_name_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    create_department(server.pool(), DEPT_COMPUTING).await?;
    let cookie = organizer_session(&server).await?;

    let mut payload = hackathon();
    payload["name"] = json!("x".repeat(201));

    let response = create(&server, &cookie, &payload).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        "Error: El nombre del evento no puede superar los 200 caracteres."
    );
    assert_eq!(count_rows(server.pool(), "events").await?, 0);
    assert_eq!(count_rows(server.pool(), "group_events").await?, 0);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_event_overlong_name_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let cookie = organizer_session(&server).await?;
    let body: Value = create(&server, &cookie, &hackathon()).await?.json().await?;
    let event_id = body["event_id"].as_i64().expect("event_id is a number");

    let mut payload = hackathon();
    payload["name"] = json!("x".repeat(201));

    let response = server
        .client()
        .put(format!("{}/api/events/update/{}", server.url(), event_id))
        .header(header::COOKIE, &cookie)
        .json(&payload)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let event: Value = server
        .client()
        .get(format!("{}/api/events/{}", server.url(), event_id))
        .header(header::COOKIE, &cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(event["name"], "Hackathon");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_numeric_event_id_uses_error_envelope(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;
    let cookie = organizer_session(&server).await?;

    let requests = [
        server
            .client()
            .get(format!("{}/api/events/abc", server.url())),
        server
            .client()
            .put(format!("{}/api/events/update/abc", server.url()))
            .json(&hackathon()),
        server
            .client()
            .delete(format!("{}/api/events/delete/abc", server.url())),
    ];

    for request in requests {
        let response = request.header(header::COOKIE, &cookie).send().await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await?;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "Error: Invalid event id.");
    }
    Ok(())
}
