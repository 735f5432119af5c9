//! Common utilities shared across the event backend crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, clock skew, structural checks)
pub mod jwt;
