//! Ledger data endpoint client
//!
//! The upstream exposes records through a scripted PATCH call whose reply
//! carries the payload as a JSON-encoded string in `response.scriptResult`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ledgersync_core::LedgerSource;
use ledgersync_domain::{ExternalRecord, Result as DomainResult, UpstreamConfig};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use crate::http::{HttpClient, UpstreamCall};

/// Configuration for the data call
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub data_url: String,
    /// Name of the server-side script that returns the records.
    pub script: String,
    /// Upper bound for one data call, retries included.
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn from_upstream(upstream: &UpstreamConfig) -> Self {
        Self {
            data_url: upstream.data_url.clone(),
            script: upstream.script.clone(),
            timeout: Duration::from_secs(upstream.timeout_seconds.saturating_mul(3)),
        }
    }
}

/// Fetches ledger records from the upstream API.
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    config: ApiClientConfig,
}

impl ApiClient {
    pub fn new(
        config: ApiClientConfig,
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self { http, auth, config }
    }

    /// Run the data script and decode its records.
    ///
    /// A reply that cannot be decoded is logged and treated as an empty
    /// batch; only transport and status failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] if no token can be obtained or the data
    /// endpoint rejects it (the cached token is dropped in that case), and a
    /// status- or transport-specific error otherwise.
    #[instrument(skip(self), fields(url = %self.config.data_url))]
    pub async fn fetch_data(&self) -> Result<Vec<ExternalRecord>, ApiError> {
        let token = self.auth.access_token().await?;

        let request = self
            .http
            .request(Method::PATCH, &self.config.data_url)
            .bearer_auth(&token)
            .json(&json!({"fieldData": {}, "script": self.config.script}));

        let timeout = self.config.timeout;
        let send = self.http.send(UpstreamCall::DATA, request);
        let response = match tokio::time::timeout(timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(ApiError::from_transport(err)),
            Err(_) => return Err(ApiError::Timeout(timeout)),
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(format!("failed to read data response: {err}")))?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &self.config.data_url, &body);
            if matches!(err, ApiError::Auth(_)) {
                self.auth.invalidate().await;
            }
            return Err(err);
        }

        debug!(bytes = body.len(), "Received data response");
        Ok(parse_script_result(&body))
    }
}

/// Decode the records carried in a data endpoint reply.
///
/// Never fails: every malformed shape yields an empty (or partial) batch and
/// a log event.
pub fn parse_script_result(body: &str) -> Vec<ExternalRecord> {
    let envelope: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "Data response is not JSON; treating as empty");
            return Vec::new();
        }
    };

    let encoded = match envelope.pointer("/response/scriptResult") {
        None | Some(Value::Null) => {
            info!("Upstream returned no data");
            return Vec::new();
        }
        Some(Value::String(text)) if text.is_empty() => {
            info!("Upstream returned no data");
            return Vec::new();
        }
        Some(Value::String(text)) => text,
        Some(other) => {
            warn!(kind = json_kind(other), "scriptResult is not a string; treating as empty");
            return Vec::new();
        }
    };

    let items = match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            warn!(kind = json_kind(&other), "scriptResult is not an array; treating as empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "scriptResult is not valid JSON; treating as empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let records: Vec<ExternalRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match ExternalRecord::try_from(item) {
            Ok(record) => Some(record),
            Err(other) => {
                warn!(index, kind = json_kind(&other), "Skipping non-object ledger item");
                None
            }
        })
        .collect();

    debug!(total, kept = records.len(), "Decoded scriptResult");
    records
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl LedgerSource for ApiClient {
    async fn fetch_records(&self) -> DomainResult<Vec<ExternalRecord>> {
        self.fetch_data().await.map_err(Into::into)
    }
}
