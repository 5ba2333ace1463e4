//! Report error types

use ledgersync_domain::{LedgerSyncError, TotalOverflow};
use thiserror::Error;

/// Failure while building a report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Reading stored records failed.
    #[error("failed to read stored records: {0}")]
    Store(String),

    /// A group's debt or credit sum does not fit in a `Decimal`.
    #[error(transparent)]
    Overflow(#[from] TotalOverflow),
}

impl From<LedgerSyncError> for ReportError {
    fn from(err: LedgerSyncError) -> Self {
        Self::Store(err.to_string())
    }
}
