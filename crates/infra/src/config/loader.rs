//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! A `.env` file, if present, is applied to the process environment by the
//! binary before [`load`] runs.
//!
//! ## Environment Variables
//! Required:
//! - `TOKEN_URL`: Upstream token endpoint
//! - `DATA_URL`: Upstream data endpoint
//! - `API_USER` / `API_PASS`: Upstream basic-auth credentials
//!
//! Optional:
//! - `PORT`: HTTP listen port
//! - `LEDGERSYNC_BIND_ADDRESS`: HTTP listen address
//! - `LEDGERSYNC_CORS_ORIGINS`: Comma-separated allowed origins
//! - `LEDGERSYNC_API_SCRIPT`: Name of the upstream data script
//! - `LEDGERSYNC_ACCEPT_INVALID_CERTS`: Skip TLS verification (true/false)
//! - `LEDGERSYNC_CA_CERT_PATH`: PEM root certificate to trust
//! - `LEDGERSYNC_HTTP_TIMEOUT`: Upstream request timeout in seconds
//! - `LEDGERSYNC_TOKEN_TTL`: Token cache lifetime in seconds
//! - `LEDGERSYNC_DB_PATH`: Database file path
//! - `LEDGERSYNC_DB_POOL_SIZE`: Connection pool size
//! - `LEDGERSYNC_SYNC_ENABLED`: Whether periodic sync runs (true/false)
//! - `LEDGERSYNC_SYNC_CRON`: Six-field cron expression for sync
//! - `LEDGERSYNC_SYNC_TIMEOUT`: Per-cycle timeout in seconds
//! - `LEDGERSYNC_SYNC_ON_STARTUP`: Run one cycle at boot (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./ledgersync.json` or `./ledgersync.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ledgersync_domain::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SCRIPT_NAME, DEFAULT_TOKEN_TTL_SECS,
};
use ledgersync_domain::{
    Config, DatabaseConfig, LedgerSyncError, Result, ServerConfig, SyncConfig, UpstreamConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LedgerSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The upstream endpoints and credentials must be present; everything else
/// falls back to its default.
///
/// # Errors
/// Returns `LedgerSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let upstream = UpstreamConfig {
        token_url: env_var("TOKEN_URL")?,
        data_url: env_var("DATA_URL")?,
        username: env_var("API_USER")?,
        password: env_var("API_PASS")?,
        script: std::env::var("LEDGERSYNC_API_SCRIPT")
            .unwrap_or_else(|_| DEFAULT_SCRIPT_NAME.to_string()),
        accept_invalid_certs: env_bool("LEDGERSYNC_ACCEPT_INVALID_CERTS", true),
        ca_cert_path: std::env::var("LEDGERSYNC_CA_CERT_PATH").ok().map(PathBuf::from),
        timeout_seconds: env_parse("LEDGERSYNC_HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT_SECS)?,
        token_ttl_seconds: env_parse("LEDGERSYNC_TOKEN_TTL", DEFAULT_TOKEN_TTL_SECS)?,
    };

    let db_defaults = DatabaseConfig::default();
    let database = DatabaseConfig {
        path: std::env::var("LEDGERSYNC_DB_PATH").unwrap_or(db_defaults.path),
        pool_size: env_parse("LEDGERSYNC_DB_POOL_SIZE", db_defaults.pool_size)?,
    };

    let sync_defaults = SyncConfig::default();
    let sync = SyncConfig {
        enabled: env_bool("LEDGERSYNC_SYNC_ENABLED", sync_defaults.enabled),
        cron_expression: std::env::var("LEDGERSYNC_SYNC_CRON")
            .unwrap_or(sync_defaults.cron_expression),
        job_timeout_seconds: env_parse(
            "LEDGERSYNC_SYNC_TIMEOUT",
            sync_defaults.job_timeout_seconds,
        )?,
        run_on_startup: env_bool("LEDGERSYNC_SYNC_ON_STARTUP", sync_defaults.run_on_startup),
    };

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        bind_address: std::env::var("LEDGERSYNC_BIND_ADDRESS")
            .unwrap_or(server_defaults.bind_address),
        port: env_parse("PORT", server_defaults.port)?,
        cors_origins: std::env::var("LEDGERSYNC_CORS_ORIGINS")
            .map(|list| split_list(&list))
            .unwrap_or(server_defaults.cors_origins),
    };

    Ok(Config { upstream, database, sync, server })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `LedgerSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LedgerSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LedgerSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LedgerSyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `LedgerSyncError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LedgerSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LedgerSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LedgerSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "ledgersync.json", "ledgersync.toml"];
    const ANCESTORS: [&str; 4] =
        ["../config.json", "../config.toml", "../../config.json", "../../config.toml"];

    let mut bases = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        bases.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        bases.push(exe_dir);
    }

    bases
        .iter()
        .flat_map(|base| NAMES.iter().chain(ANCESTORS.iter()).map(move |name| base.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LedgerSyncError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LedgerSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, using `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| LedgerSyncError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()
}
