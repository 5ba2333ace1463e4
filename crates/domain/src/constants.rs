//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Upstream API
pub const DEFAULT_SCRIPT_NAME: &str = "getData";
/// Tokens are reused for this long, well under the upstream token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 10 * 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Sync cycle
pub const DEFAULT_SYNC_CRON: &str = "0 */5 * * * *";
pub const DEFAULT_SYNC_JOB_TIMEOUT_SECS: u64 = 240;

// Report grouping: fixed-width segments of an account code, as char ranges.
pub const GROUP_KEY_SEGMENTS: [(usize, usize); 3] = [(0, 3), (3, 5), (5, 8)];
pub const GROUP_KEY_SEPARATOR: &str = ".";

// Storage
pub const DEFAULT_DB_PATH: &str = "ledgersync.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// HTTP surface
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "https://test-api-project-one.vercel.app",
    "https://test-api-project-git-main-yusufguclu7s-projects.vercel.app",
    "http://localhost:3000",
];
