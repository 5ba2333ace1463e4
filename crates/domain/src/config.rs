//! Configuration structures
//!
//! Deserializable from TOML or JSON; every field except the upstream
//! endpoints and credentials has a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_CORS_ORIGINS, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_SCRIPT_NAME, DEFAULT_SYNC_CRON,
    DEFAULT_SYNC_JOB_TIMEOUT_SECS, DEFAULT_TOKEN_TTL_SECS,
};
use crate::errors::{LedgerSyncError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Reject configurations that would only fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        let upstream = &self.upstream;
        for (name, value) in [
            ("upstream.token_url", &upstream.token_url),
            ("upstream.data_url", &upstream.data_url),
            ("upstream.username", &upstream.username),
            ("upstream.script", &upstream.script),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerSyncError::Config(format!("{name} must not be empty")));
            }
        }
        // Spaces are legal in a password, so only the empty string is refused.
        if upstream.password.is_empty() {
            return Err(LedgerSyncError::Config("upstream.password must not be empty".into()));
        }
        if upstream.token_ttl_seconds == 0 {
            return Err(LedgerSyncError::Config(
                "upstream.token_ttl_seconds must be greater than zero".into(),
            ));
        }
        if self.database.pool_size == 0 {
            return Err(LedgerSyncError::Config(
                "database.pool_size must be greater than zero".into(),
            ));
        }
        if self.sync.job_timeout_seconds == 0 {
            return Err(LedgerSyncError::Config(
                "sync.job_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Upstream ledger API endpoints and credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub token_url: String,
    pub data_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_script")]
    pub script: String,
    /// The upstream runs with self-signed certificates.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    /// PEM bundle to trust instead of disabling verification.
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("token_url", &self.token_url)
            .field("data_url", &self.data_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("script", &self.script)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("ca_cert_path", &self.ca_cert_path)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// Local SQLite store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path(), pool_size: default_pool_size() }
    }
}

/// Periodic sync trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_cron")]
    pub cron_expression: String,
    #[serde(default = "default_job_timeout")]
    pub job_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron_expression: default_cron(),
            job_timeout_seconds: default_job_timeout(),
            run_on_startup: true,
        }
    }
}

/// HTTP surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_script() -> String {
    DEFAULT_SCRIPT_NAME.to_string()
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_cron() -> String {
    DEFAULT_SYNC_CRON.to_string()
}

fn default_job_timeout() -> u64 {
    DEFAULT_SYNC_JOB_TIMEOUT_SECS
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|origin| (*origin).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
        [upstream]
        token_url = "https://ledger.internal/auth"
        data_url = "https://ledger.internal/records"
        username = "sync"
        password = "secret"
    "#;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: Config = toml::from_str(MINIMAL_TOML).unwrap();

        assert_eq!(config.upstream.script, "getData");
        assert!(config.upstream.accept_invalid_certs);
        assert_eq!(config.upstream.token_ttl_seconds, 600);
        assert_eq!(config.database.path, "ledgersync.db");
        assert_eq!(config.sync.cron_expression, "0 */5 * * * *");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.cors_origins.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_urls() {
        let mut config: Config = toml::from_str(MINIMAL_TOML).unwrap();
        config.upstream.data_url = "  ".into();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, LedgerSyncError::Config(msg) if msg.contains("data_url")));
    }

    #[test]
    fn validate_rejects_empty_password() {
        let mut config: Config = toml::from_str(MINIMAL_TOML).unwrap();
        config.upstream.password = String::new();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, LedgerSyncError::Config(msg) if msg.contains("upstream.password")));

        config.upstream.password = " pass phrase ".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_pool_size() {
        let mut config: Config = toml::from_str(MINIMAL_TOML).unwrap();
        config.database.pool_size = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config: Config = toml::from_str(MINIMAL_TOML).unwrap();
        let rendered = format!("{:?}", config.upstream);

        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
