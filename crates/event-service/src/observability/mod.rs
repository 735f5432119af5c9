//! Observability module for the event service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
