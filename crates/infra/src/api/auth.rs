//! Bearer token acquisition with expiry-based caching
//!
//! The upstream hands out short-lived session tokens in exchange for HTTP
//! basic credentials. [`TokenCache`] keeps the last one until its TTL runs
//! out and makes sure concurrent callers share a single refresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ledgersync_core::{Clock, SystemClock};
use ledgersync_domain::UpstreamConfig;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use crate::http::{HttpClient, UpstreamCall};

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, authenticating if needed.
    async fn access_token(&self) -> Result<String, ApiError>;

    /// Forget any cached token so the next call re-authenticates.
    async fn invalidate(&self) {}
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Caches the upstream session token until it expires.
pub struct TokenCache {
    http: HttpClient,
    token_url: String,
    username: String,
    password: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Build a cache for the configured token endpoint using the system clock.
    pub fn from_config(http: HttpClient, upstream: &UpstreamConfig) -> Self {
        Self {
            http,
            token_url: upstream.token_url.clone(),
            username: upstream.username.clone(),
            password: upstream.password.clone(),
            ttl: Duration::from_secs(upstream.token_ttl_seconds),
            clock: Arc::new(SystemClock),
            slot: Mutex::new(None),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether a token is cached and still inside its validity window.
    pub async fn has_valid_token(&self) -> bool {
        let slot = self.slot.lock().await;
        slot.as_ref().is_some_and(|cached| self.clock.now() < cached.expires_at)
    }

    #[instrument(skip(self), fields(url = %self.token_url))]
    async fn authenticate(&self) -> Result<String, ApiError> {
        let request = self
            .http
            .request(Method::POST, &self.token_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&json!({}));

        let response =
            self.http.send(UpstreamCall::TOKEN, request).await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(format!("failed to read token response: {err}")))?;

        if !status.is_success() {
            warn!(%status, "Token request rejected");
            return Err(ApiError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        extract_token(&body)
    }
}

/// Pull `response.token` out of the token endpoint's reply.
fn extract_token(body: &str) -> Result<String, ApiError> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|err| ApiError::Auth(format!("token response is not JSON: {err}")))?;

    envelope
        .pointer("/response/token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Auth(format!("token missing from response: {body}")))
}

#[async_trait]
impl AccessTokenProvider for TokenCache {
    async fn access_token(&self) -> Result<String, ApiError> {
        // Held across the refresh so concurrent callers wait for one request.
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if self.clock.now() < cached.expires_at {
                debug!("Using cached upstream token");
                return Ok(cached.value.clone());
            }
        }

        let token = self.authenticate().await?;
        let expires_at = self.clock.now() + self.ttl;
        *slot = Some(CachedToken { value: token.clone(), expires_at });

        info!(token_len = token.len(), ttl_secs = self.ttl.as_secs(), "Acquired upstream token");
        Ok(token)
    }

    async fn invalidate(&self) {
        if self.slot.lock().await.take().is_some() {
            debug!("Dropped cached upstream token");
        }
    }
}
