//! Shared test helpers for `ledgersync-core` integration tests.
//!
//! In-memory store and source doubles so pipeline tests can focus on
//! behaviour instead of boilerplate.

pub mod repositories;
