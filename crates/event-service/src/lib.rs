//! Event Service Library
//!
//! Backend for university event management:
//!
//! - Signup and signin with an HttpOnly session cookie (HS256 JWT)
//! - Role policies per route (`USER`, `ADMIN`, `ORGANIZER`, `JUROR`)
//! - Event CRUD; creating an event opens one group per department
//! - Department and career reference data
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/*.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - Session token claims and the token service
//! - `config` - Service configuration from environment
//! - `crypto` - Password hashing
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Session gate, role policies, HTTP metrics
//! - `models` - Request/response payloads and roles
//! - `observability` - Prometheus metrics
//! - `repositories` - Database access layer
//! - `routes` - Axum router setup
//! - `services` - Business logic layer

pub mod auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
