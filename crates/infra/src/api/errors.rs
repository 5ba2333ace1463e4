//! Upstream ledger API error types
//!
//! Classifies failures of the token and data endpoints.

use std::time::Duration;

use ledgersync_domain::LedgerSyncError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403, missing token)
    Authentication,
    /// Rate limiting errors (429)
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// Network/connection errors and timeouts
    Network,
    /// Configuration errors
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Map a non-success status from `url` to a typed error.
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("{} returned status {}", url, status)
        } else {
            format!("{} returned status {}: {}", url, status, body)
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status.is_server_error() {
            Self::Server(message)
        } else if status.is_client_error() {
            Self::Client(message)
        } else {
            Self::Network(message)
        }
    }

    /// Lift a transport failure from [`crate::http::HttpClient`].
    pub fn from_transport(err: LedgerSyncError) -> Self {
        match err {
            LedgerSyncError::Auth(message) => Self::Auth(message),
            LedgerSyncError::Config(message) => Self::Config(message),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<ApiError> for LedgerSyncError {
    fn from(err: ApiError) -> Self {
        match err.category() {
            ApiErrorCategory::Authentication => Self::Auth(err.to_string()),
            ApiErrorCategory::Network => Self::Network(err.to_string()),
            ApiErrorCategory::Config => Self::Config(err.to_string()),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Client => {
                Self::Upstream(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ApiError::Auth("test".to_string()).category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::RateLimit("test".to_string()).category(),
            ApiErrorCategory::RateLimit
        );
        assert_eq!(ApiError::Server("test".to_string()).category(), ApiErrorCategory::Server);
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(1)).category(),
            ApiErrorCategory::Network
        );
    }

    #[test]
    fn test_status_mapping() {
        let url = "https://ledger.example/data";
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, url, ""),
            ApiError::Auth(_)
        ));
        assert!(matches!(ApiError::from_status(StatusCode::FORBIDDEN, url, ""), ApiError::Auth(_)));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, url, ""),
            ApiError::RateLimit(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, url, ""),
            ApiError::Server(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, url, "missing"),
            ApiError::Client(msg) if msg.contains("missing")
        ));
    }

    #[test]
    fn test_domain_conversion_keeps_auth() {
        let domain: LedgerSyncError = ApiError::Auth("no token".into()).into();
        assert!(matches!(domain, LedgerSyncError::Auth(msg) if msg.contains("no token")));

        let domain: LedgerSyncError = ApiError::Server("boom".into()).into();
        assert!(matches!(domain, LedgerSyncError::Upstream(_)));
    }
}
