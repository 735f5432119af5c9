//! E2E tests for the operational endpoints.

use event_test_utils::server_harness::TestEventServer;
use reqwest::StatusCode;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_returns_ok_with_database(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_needs_no_session(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    // A garbage cookie only matters under /api.
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .header(reqwest::header::COOKIE, "event_session=garbage")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_metrics_endpoint_is_public(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_route_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestEventServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/api/nowhere", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
