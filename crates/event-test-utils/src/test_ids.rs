//! Fixed test constants for deterministic tests.

/// Password given to every fixture user.
pub const TEST_PASSWORD: &str = "test-password";

/// Raw bytes of the test JWT secret (32 bytes, the minimum accepted).
pub const TEST_JWT_SECRET: [u8; 32] = [0x5a; 32];

/// Session lifetime used by the test server.
pub const TEST_JWT_EXPIRATION_SECONDS: i64 = 3600;

/// Cookie name used by the test server.
pub const TEST_COOKIE_NAME: &str = "event_session";

// Reference data names
pub const DEPT_COMPUTING: &str = "Computación e Informática";
pub const DEPT_ELECTRONICS: &str = "Electrónica";
pub const DEPT_MECHANICS: &str = "Mecánica";

pub const CAREER_SOFTWARE: &str = "Diseño y Desarrollo de Software";
