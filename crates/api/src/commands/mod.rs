//! HTTP handlers - thin adapters from axum onto the application context

mod health;
mod reports;

pub use health::*;
pub use reports::*;
