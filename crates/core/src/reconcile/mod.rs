//! Reconciliation of upstream ledger lines into the local store
//!
//! Each fetched item gets a stable identity, a code, and coerced amounts,
//! then is upserted by identity. Re-running a cycle over the same batch is
//! idempotent; the latest values win.

pub mod amount;
pub mod errors;
pub mod identity;
pub mod service;

pub use amount::coerce_amount;
pub use errors::{SyncError, SyncErrorCategory};
pub use identity::{canonical_json, content_hash, derive_code, derive_identity};
pub use service::{prepare_upsert, RecordReconciler};
