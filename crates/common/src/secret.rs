//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports types from the [`secrecy`] crate. Use these for every
//! sensitive value the backend handles: signup/signin passwords, session
//! tokens and the JWT signing secret.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so a
//! struct deriving `Debug` that holds a secret is safe to log via `{:?}` or
//! tracing. Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct SigninRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req = SigninRequest {
//!     username: "alice".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // Password is redacted
//! println!("{:?}", req);
//!
//! let password: &str = req.password.expose_secret();
//! ```
//!
//! # Serde Integration
//!
//! Secrets deserialize directly from request bodies:
//!
//! ```rust
//! use serde::Deserialize;
//! use common::secret::SecretString;
//!
//! #[derive(Debug, Deserialize)]
//! struct SignupRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let json = r#"{"username": "bob", "password": "secret-pass"}"#;
//! let req: SignupRequest = serde_json::from_str(json).unwrap();
//! println!("{:?}", req);
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
