//! Sync cycle outcome

use serde::{Deserialize, Serialize};

/// Result of one reconciliation cycle that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The cycle ran to the end.
    Completed {
        /// Items decoded from the upstream payload.
        fetched: usize,
        /// Rows inserted or updated in the store.
        upserted: usize,
    },
    /// Another cycle was still running, so this trigger was dropped.
    Skipped,
}

impl SyncOutcome {
    /// Rows written by this cycle (zero when skipped).
    pub fn upserted(&self) -> usize {
        match self {
            Self::Completed { upserted, .. } => *upserted,
            Self::Skipped => 0,
        }
    }
}
