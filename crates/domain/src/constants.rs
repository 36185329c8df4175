//! Client constants
//!
//! Centralized location for wire-level names and defaults shared by the
//! client crates.

// Durable storage keys
pub const SESSION_STORAGE_KEY: &str = "userData";
pub const LOGGED_OUT_STORAGE_KEY: &str = "isLoggedOut";

// Token lifecycle endpoints (relative to the API base URL)
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";
pub const REGENERATE_TOKEN_PATH: &str = "/auth/regenerate-token";

/// Error/message value the backend uses on a 500 when the token is missing
/// or invalid.
pub const UNAUTHENTICATED_SENTINEL: &str = "Unauthenticated";

/// Endpoints that must never carry a bearer token and are never blocked by
/// the logged-out pre-check.
pub const AUTH_ENDPOINTS: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/auth/verify-otp",
    "/auth/resend-otp",
    REFRESH_TOKEN_PATH,
    REGENERATE_TOKEN_PATH,
];

/// Body of the synthetic 403 returned after logout.
pub const LOGGED_OUT_MESSAGE: &str = "User is logged out";

// Endpoint discovery defaults
pub const DEFAULT_PRODUCTION_BASE_URL: &str = "https://api.pawsit.app/api";
pub const DEFAULT_DEV_HOST: &str = "localhost";
pub const DEFAULT_DEV_PORT: u16 = 3000;
pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_LIVENESS_PATH: &str = "/";

// Timeouts
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ENDPOINT_TTL_MS: u64 = 300_000;
pub const DEFAULT_SUSPENSION_RELEASE_MS: u64 = 3_000;

// Session storage
pub const DEFAULT_STORAGE_DIR: &str = ".pawsit";
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "Pawsit.session";
