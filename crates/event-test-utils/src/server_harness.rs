//! Test server harness for E2E testing
//!
//! Provides `TestEventServer` for spawning real event-service instances in
//! tests.

use crate::test_ids::{
    TEST_COOKIE_NAME, TEST_JWT_EXPIRATION_SECONDS, TEST_JWT_SECRET,
};
use common::jwt::DEFAULT_CLOCK_SKEW;
use common::secret::SecretBox;
use event_service::config::{Config, DEFAULT_CORS_ALLOWED_ORIGIN, MIN_BCRYPT_COST};
use event_service::observability::metrics::init_metrics_recorder;
use event_service::routes::{self, AppState};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the event service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_events_e2e(pool: PgPool) -> Result<()> {
///     let server = TestEventServer::spawn(pool).await?;
///
///     let response = server
///         .client()
///         .get(format!("{}/api/events/all", server.url()))
///         .header(reqwest::header::COOKIE, server.signin("org", TEST_PASSWORD).await?)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestEventServer {
    addr: SocketAddr,
    pool: PgPool,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

/// Configuration used by the test server.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(), // Not used after connection established
        bind_address: "127.0.0.1:0".to_string(),
        jwt_secret: SecretBox::new(Box::new(TEST_JWT_SECRET.to_vec())),
        jwt_expiration_seconds: TEST_JWT_EXPIRATION_SECONDS,
        jwt_clock_skew_seconds: DEFAULT_CLOCK_SKEW.as_secs() as i64,
        jwt_cookie_name: TEST_COOKIE_NAME.to_string(),
        cookie_secure: false,
        bcrypt_cost: MIN_BCRYPT_COST,
        cors_allowed_origin: DEFAULT_CORS_ALLOWED_ORIGIN.to_string(),
    }
}

impl TestEventServer {
    /// Spawn a new test server instance with isolated database
    ///
    /// The server will:
    /// - Seed roles
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        event_service::repositories::roles::seed_roles(&pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed roles: {}", e))?;

        let config = test_config();
        let state = Arc::new(AppState::new(pool.clone(), config.clone()));

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get reference to the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// HTTP client without a cookie store; tests attach cookies explicitly.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Sign in and return the `Cookie` header value for the session.
    pub async fn signin(&self, username: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/auth/signin", self.url()))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Signin for '{}' failed: {}", username, response.status());
        }

        session_cookie(&response)
            .ok_or_else(|| anyhow::anyhow!("Signin response carried no session cookie"))
    }
}

/// Extract `name=value` of the session cookie from a response's
/// `Set-Cookie` headers.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    set_cookie_header(response).and_then(|header| {
        header
            .split(';')
            .next()
            .map(|pair| pair.trim().to_string())
    })
}

/// The full `Set-Cookie` header for the session cookie, attributes included.
pub fn set_cookie_header(response: &reqwest::Response) -> Option<String> {
    let prefix = format!("{}=", TEST_COOKIE_NAME);
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_string)
}

impl Drop for TestEventServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so each test releases its port.
        self._handle.abort();
    }
}
