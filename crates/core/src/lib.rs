//! # LedgerSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the record store and the upstream
//!   ledger source
//! - The reconciliation cycle (identity derivation, amount coercion, upsert)
//! - The hierarchical report aggregation
//!
//! ## Architecture Principles
//! - Only depends on `ledgersync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
pub mod ports;
pub mod reconcile;
pub mod report;

// Re-export specific items to avoid ambiguity
pub use clock::{Clock, MockClock, SystemClock};
pub use ports::{LedgerSource, RecordStore};
pub use reconcile::{RecordReconciler, SyncError, SyncErrorCategory};
pub use report::{ReportAggregator, ReportError};
