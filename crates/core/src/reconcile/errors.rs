//! Sync-specific error types
//!
//! A failed cycle is reported as a value; the caller (normally the
//! scheduler) decides how to log it.

use std::time::Duration;

use ledgersync_domain::LedgerSyncError;
use thiserror::Error;

/// Categories of sync errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorCategory {
    /// Credential exchange failed or returned no token
    Authentication,
    /// Data endpoint unreachable or rejected the request
    Upstream,
    /// Local store rejected a write
    Storage,
}

/// Sync cycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Store write failed for record {external_id}: {message}")]
    Store { external_id: String, message: String },

    #[error("Sync cycle timed out after {0:?}")]
    Timeout(Duration),
}

impl SyncError {
    /// Classify a failure coming out of the ledger source.
    pub fn from_source(err: LedgerSyncError) -> Self {
        match err {
            LedgerSyncError::Auth(message) => Self::Auth(message),
            other => Self::Fetch(other.to_string()),
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> SyncErrorCategory {
        match self {
            Self::Auth(_) => SyncErrorCategory::Authentication,
            Self::Fetch(_) | Self::Timeout(_) => SyncErrorCategory::Upstream,
            Self::Store { .. } => SyncErrorCategory::Storage,
        }
    }

    /// Whether the next scheduled cycle can reasonably be expected to succeed
    /// without operator action.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Auth(_))
    }
}
