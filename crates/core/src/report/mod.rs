//! Hierarchical ledger report
//!
//! Flat stored rows are grouped by an account key rebuilt from fixed-width
//! segments of their code, then emitted in ascending key order.

pub mod aggregator;
pub mod errors;
pub mod key;

pub use aggregator::{aggregate, ReportAggregator};
pub use errors::ReportError;
pub use key::{grouping_key, record_key};
