//! Port interfaces for the sync-and-report pipeline

use async_trait::async_trait;
use ledgersync_domain::{ExternalRecord, RecordFields, Result, StoredRecord};

/// Durable store of reconciled ledger rows.
///
/// Implementations must enforce uniqueness on `external_id`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new row for `external_id`, or overwrite the mutable columns
    /// of the existing one.
    async fn upsert(&self, external_id: &str, fields: &RecordFields) -> Result<()>;

    /// Every stored row, in the store's iteration order.
    async fn find_all(&self) -> Result<Vec<StoredRecord>>;
}

/// Upstream ledger feed.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetch the current batch of ledger lines, in upstream order.
    ///
    /// "No data" is an empty batch, not an error.
    async fn fetch_records(&self) -> Result<Vec<ExternalRecord>>;
}
