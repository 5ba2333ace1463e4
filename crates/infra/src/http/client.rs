//! Outbound HTTP for the upstream ledger API
//!
//! One reqwest client is shared by the token exchange and the data script.
//! Every send names the [`UpstreamCall`] it performs, which decides the label
//! in the logs and which failed attempts may be repeated.

use std::path::Path;
use std::time::Duration;

use ledgersync_domain::LedgerSyncError;
use reqwest::{Certificate, Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("ledgersync/", env!("CARGO_PKG_VERSION"));

/// Which failed attempts a call may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    /// Connect failures and timeouts only. Any response is final.
    Transport,
    /// Transport failures and 5xx responses.
    TransportAndServerErrors,
}

impl RetryOn {
    fn covers(self, status: StatusCode) -> bool {
        self == Self::TransportAndServerErrors && status.is_server_error()
    }
}

/// A named upstream request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamCall {
    pub endpoint: &'static str,
    pub retry_on: RetryOn,
}

impl UpstreamCall {
    /// Session token exchange. A 5xx reply goes straight back to the token
    /// cache, which never stores a failure.
    pub const TOKEN: Self = Self { endpoint: "token", retry_on: RetryOn::Transport };

    /// The records script. Read-only upstream, so server errors are retried.
    pub const DATA: Self = Self { endpoint: "data", retry_on: RetryOn::TransportAndServerErrors };
}

/// reqwest client plus the attempt budget shared by all upstream calls.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: u32,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder` as `call`, repeating retryable failures with
    /// exponential backoff.
    ///
    /// Non-success responses are returned, not converted to errors; when the
    /// attempts run out the last response is what the caller sees.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerSyncError::Network`] naming the endpoint when the
    /// request never produced a response, and [`LedgerSyncError::Internal`]
    /// if the request body cannot be replayed.
    pub async fn send(
        &self,
        call: UpstreamCall,
        builder: RequestBuilder,
    ) -> Result<Response, LedgerSyncError> {
        let endpoint = call.endpoint;
        let mut attempt = 1;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    LedgerSyncError::Internal(format!("{endpoint} request body is not replayable"))
                })?
                .build()
                .map_err(|err| LedgerSyncError::from(InfraError::from(err)))?;
            let final_attempt = attempt >= self.max_attempts;

            match self.client.execute(request).await {
                Ok(response) if !final_attempt && call.retry_on.covers(response.status()) => {
                    let status = response.status();
                    warn!(endpoint, attempt, %status, "Upstream server error; retrying");
                }
                Ok(response) => {
                    debug!(endpoint, attempt, status = %response.status(), "Upstream responded");
                    return Ok(response);
                }
                Err(err) if !final_attempt && is_transient(&err) => {
                    warn!(endpoint, attempt, error = %err, "Upstream unreachable; retrying");
                }
                Err(err) => return Err(transport_error(endpoint, err)),
            }

            let delay = self.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    /// Pause after the `attempt`-th failure: base, 2x base, 4x base, ...
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1 << attempt.saturating_sub(1).min(8))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> LedgerSyncError {
    match LedgerSyncError::from(InfraError::from(err)) {
        LedgerSyncError::Network(message) => {
            LedgerSyncError::Network(format!("{endpoint} endpoint: {message}"))
        }
        other => other,
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    accept_invalid_certs: bool,
    root_certificate_pem: Option<Vec<u8>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            accept_invalid_certs: false,
            root_certificate_pem: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts per call, first try included.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Skip TLS certificate verification.
    ///
    /// Only for upstreams behind self-signed certificates; prefer
    /// [`Self::root_certificate_pem`] when the CA is available.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Trust an additional PEM-encoded root certificate.
    pub fn root_certificate_pem(mut self, pem: Vec<u8>) -> Self {
        self.root_certificate_pem = Some(pem);
        self
    }

    /// Read a PEM root certificate from disk.
    pub fn root_certificate_file(self, path: &Path) -> Result<Self, LedgerSyncError> {
        let pem = std::fs::read(path).map_err(|err| {
            LedgerSyncError::Config(format!(
                "failed to read CA certificate {}: {err}",
                path.display()
            ))
        })?;
        Ok(self.root_certificate_pem(pem))
    }

    pub fn build(self) -> Result<HttpClient, LedgerSyncError> {
        let mut builder =
            ReqwestClient::builder().timeout(self.timeout).user_agent(USER_AGENT).no_proxy();

        if let Some(pem) = self.root_certificate_pem {
            let certificate = Certificate::from_pem(&pem).map_err(|err| {
                LedgerSyncError::Config(format!("invalid CA certificate: {err}"))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|err| LedgerSyncError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}
