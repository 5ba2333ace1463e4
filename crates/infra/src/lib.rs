//! # LedgerSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite persistence (`r2d2` pool, migrations, record repository)
//! - HTTP client with retry/backoff
//! - Upstream ledger API adapter (token cache, script-result decoding)
//! - Configuration loading (environment and config files)
//! - Cron-driven sync scheduling
//!
//! ## Architecture
//! - Implements traits defined in `ledgersync-core`
//! - Contains all "impure" code (I/O, network, timers)

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod scheduling;

// Re-export commonly used items
pub use api::{
    upstream_http_client, AccessTokenProvider, ApiClient, ApiClientConfig, ApiError, TokenCache,
};
pub use database::{DbManager, SqliteRecordRepository};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryOn, UpstreamCall};
pub use scheduling::{run_cycle, SchedulerError, SyncJob, SyncScheduler, SyncSchedulerConfig};
