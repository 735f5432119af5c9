//! Database access layer.
//!
//! Free functions over `&PgPool`, or `&mut PgConnection` when the caller
//! owns a transaction.

pub mod careers;
pub mod departments;
pub mod events;
pub mod group_events;
pub mod inscriptions;
pub mod roles;
pub mod users;
