//! # LedgerSync App
//!
//! HTTP application layer - routes, handlers and main entry point.
//!
//! This crate contains:
//! - axum handlers for the report and health endpoints
//! - Application context (dependency injection)
//! - Router assembly with CORS and request tracing
//! - Logging initialization for the binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod router;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use router::create_router;
