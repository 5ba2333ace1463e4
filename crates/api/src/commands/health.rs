//! Liveness endpoints

use axum::Json;
use serde_json::{json, Value};

/// Plain-text banner served at `/`.
pub const BANNER: &str = "LedgerSync backend is running";

/// `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

/// `GET /`
pub async fn banner() -> &'static str {
    BANNER
}
