//! Business logic between handlers and repositories.

pub mod auth_service;
pub mod event_service;
