//! Domain types and models

pub mod record;
pub mod report;
pub mod sync;

pub use record::{ExternalRecord, IdentityValue, RecordFields, StoredRecord};
pub use report::{ReportGroup, TotalOverflow};
pub use sync::SyncOutcome;
