//! Scheduling infrastructure for the periodic ledger sync
//!
//! The scheduler follows a few runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod sync_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sync_scheduler::{run_cycle, SyncJob, SyncScheduler, SyncSchedulerConfig};
