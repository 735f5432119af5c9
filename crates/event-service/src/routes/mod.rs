//! HTTP routes for the event service.
//!
//! Defines the Axum router, the role policy of every route, and the
//! application state.

use crate::auth::TokenService;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{
    authenticate, http_metrics_middleware, require_roles, AuthState, RolePolicy,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Session token issuer and validator.
    pub token_service: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let token_service = Arc::new(TokenService::new(&config));
        Self {
            pool,
            config,
            token_service,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - DB ping - public, unprefixed
/// - `/metrics` - Prometheus metrics - public, unprefixed
/// - `/api/auth/{signin,signup,signout}` and `/api/career/all` - no policy
/// - `/api/department/all`, `/api/events/all`, `/api/events/:id` - any role
/// - `/api/events/add`, `/api/events/delete/:id` - ORGANIZER
/// - `/api/events/update/:id` - ORGANIZER or ADMIN
///
/// Routes with a policy pass through the session gate first; the open routes
/// never read the cookie, so a stale session cannot block signin or signout.
/// Global layers: CORS, TraceLayer, 30 second timeout, HTTP metrics.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        token_service: state.token_service.clone(),
    });
    let cors = cors_layer(&state.config.cors_allowed_origin);

    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let open_routes = Router::new()
        .route("/api/auth/signin", post(handlers::signin))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/signout", post(handlers::signout))
        .route("/api/career/all", get(handlers::list_careers));

    let any_role_routes = Router::new()
        .route("/api/department/all", get(handlers::list_departments))
        .route("/api/events/all", get(handlers::list_events))
        .route("/api/events/:id", get(handlers::get_event))
        .route_layer(middleware::from_fn_with_state(
            RolePolicy::ANY,
            require_roles,
        ));

    let organizer_routes = Router::new()
        .route("/api/events/add", post(handlers::create_event))
        .route("/api/events/delete/:id", delete(handlers::delete_event))
        .route_layer(middleware::from_fn_with_state(
            RolePolicy::ORGANIZER,
            require_roles,
        ));

    let organizer_or_admin_routes = Router::new()
        .route("/api/events/update/:id", put(handlers::update_event))
        .route_layer(middleware::from_fn_with_state(
            RolePolicy::ORGANIZER_OR_ADMIN,
            require_roles,
        ));

    let protected_routes = any_role_routes
        .merge(organizer_routes)
        .merge(organizer_or_admin_routes)
        .route_layer(middleware::from_fn_with_state(auth_state, authenticate));

    let api_routes = open_routes.merge(protected_routes).with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer
    // 4. http_metrics_middleware (outermost)
    health_routes
        .merge(metrics_routes)
        .merge(api_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// CORS for the web client: one origin, credentials allowed.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!(
                target: "event.routes",
                error = %e,
                "CORS_ALLOWED_ORIGIN is not a valid header value, cross-origin requests disabled"
            );
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}
