//! # Event Test Utilities
//!
//! Shared test utilities for the event service.
//!
//! This crate provides:
//! - Server test harness (`TestEventServer` for E2E tests)
//! - Database fixtures (departments, careers, users with roles)
//! - Fixed test constants (secret, passwords)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use event_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> Result<(), anyhow::Error> {
//!     let server = TestEventServer::spawn(pool).await?;
//!     create_user(server.pool(), "org", &[Role::Organizer]).await?;
//!     let cookie = server.signin("org", TEST_PASSWORD).await?;
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;
pub mod test_ids;

// Re-export commonly used items
pub use fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
