//! Reconciliation service - fetch, derive, upsert

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ledgersync_domain::{ExternalRecord, RecordFields, SyncOutcome};
use tracing::{debug, info, instrument};

use super::amount::coerce_amount;
use super::errors::SyncError;
use super::identity::{derive_code, derive_identity};
use crate::ports::{LedgerSource, RecordStore};

/// Merges the upstream ledger feed into the local store.
///
/// There is no transaction around a cycle: rows upserted before a failure
/// stay written, and the next cycle converges them.
pub struct RecordReconciler {
    source: Arc<dyn LedgerSource>,
    store: Arc<dyn RecordStore>,
    running: AtomicBool,
}

impl RecordReconciler {
    /// Create a new reconciler
    pub fn new(source: Arc<dyn LedgerSource>, store: Arc<dyn RecordStore>) -> Self {
        Self { source, store, running: AtomicBool::new(false) }
    }

    /// Whether a cycle is currently in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one fetch-and-upsert cycle.
    ///
    /// Returns [`SyncOutcome::Skipped`] without touching upstream if another
    /// cycle is still in flight.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or store failure. Earlier upserts of the same
    /// cycle are kept.
    #[instrument(skip(self))]
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let Some(_guard) = CycleGuard::acquire(&self.running) else {
            debug!("Sync cycle already in progress; skipping trigger");
            return Ok(SyncOutcome::Skipped);
        };

        let records = self.source.fetch_records().await.map_err(SyncError::from_source)?;
        let fetched = records.len();

        if records.is_empty() {
            info!("Upstream returned no ledger records");
            return Ok(SyncOutcome::Completed { fetched: 0, upserted: 0 });
        }

        let mut upserted = 0;
        for record in records {
            let (external_id, fields) = prepare_upsert(record);
            if let Err(err) = self.store.upsert(&external_id, &fields).await {
                return Err(SyncError::Store { external_id, message: err.to_string() });
            }
            upserted += 1;
        }

        info!(fetched, upserted, "Sync cycle completed");
        Ok(SyncOutcome::Completed { fetched, upserted })
    }
}

/// Derive the upsert key and column values for one upstream item.
pub fn prepare_upsert(record: ExternalRecord) -> (String, RecordFields) {
    let external_id = derive_identity(&record);
    let code = derive_code(&record, &external_id);
    let debt = coerce_amount(record.debt.as_ref());
    let credit = coerce_amount(record.credit.as_ref());
    let raw_data = serde_json::Value::Object(record.raw);

    (external_id, RecordFields { code, debt, credit, raw_data })
}

/// Clears the in-progress flag when the cycle ends, including when the
/// cycle future is dropped by a timeout.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
