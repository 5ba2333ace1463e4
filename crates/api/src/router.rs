//! Route configuration.

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::commands;
use crate::context::AppContext;

/// Create the application router.
pub fn create_router(context: Arc<AppContext>) -> Router {
    let cors = cors_layer(&context.config.server.cors_origins);

    Router::new()
        .route("/", get(commands::banner))
        .route("/api/health", get(commands::health))
        .route("/api/reports", get(commands::get_reports))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

/// CORS policy for the configured browser origins.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
