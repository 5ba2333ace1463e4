//! Upstream ledger API client
//!
//! Token acquisition ([`TokenCache`]) and the data call ([`ApiClient`]) that
//! feeds the reconciler. Both share one [`HttpClient`] configured from
//! [`UpstreamConfig`].

pub mod auth;
pub mod client;
pub mod errors;

use std::time::Duration;

use ledgersync_domain::{LedgerSyncError, UpstreamConfig};

pub use auth::{AccessTokenProvider, TokenCache};
pub use client::{parse_script_result, ApiClient, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};

use crate::http::HttpClient;

/// Build the HTTP client used for every upstream call.
pub fn upstream_http_client(upstream: &UpstreamConfig) -> Result<HttpClient, LedgerSyncError> {
    let mut builder = HttpClient::builder()
        .timeout(Duration::from_secs(upstream.timeout_seconds))
        .max_attempts(3);

    if let Some(path) = &upstream.ca_cert_path {
        builder = builder.root_certificate_file(path)?;
    } else if upstream.accept_invalid_certs {
        builder = builder.accept_invalid_certs(true);
    }

    builder.build()
}
