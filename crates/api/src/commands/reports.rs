//! Ledger report endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::context::AppContext;

/// `GET /api/reports`
///
/// Responds with every account group, ordered by key. Failures are logged
/// with their detail and answered with a generic 500 body.
pub async fn get_reports(State(context): State<Arc<AppContext>>) -> Response {
    match context.reports.build_report().await {
        Ok(groups) => {
            debug!(groups = groups.len(), "Serving ledger report");
            Json(groups).into_response()
        }
        Err(err) => {
            error!(error = %err, "Failed to build ledger report");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "Server error"})))
                .into_response()
        }
    }
}
