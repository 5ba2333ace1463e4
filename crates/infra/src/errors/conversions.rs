//! Conversions from storage and transport errors into domain errors.
//!
//! HTTP status codes never pass through here: [`crate::http::HttpClient`]
//! returns every response as-is and the API adapter classifies statuses.

use ledgersync_domain::LedgerSyncError;
use reqwest::Error as HttpError;
use rusqlite::ffi::ErrorCode;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LedgerSyncError);

impl From<InfraError> for LedgerSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LedgerSyncError> for InfraError {
    fn from(value: LedgerSyncError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error */
/* -------------------------------------------------------------------------- */

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        let mapped = match value {
            SqlError::SqliteFailure(err, message) => match err.code {
                ErrorCode::DatabaseBusy => LedgerSyncError::Database("database is busy".into()),
                ErrorCode::DatabaseLocked => LedgerSyncError::Database("database is locked".into()),
                ErrorCode::DiskFull => LedgerSyncError::Database("disk is full".into()),
                ErrorCode::ReadOnly => LedgerSyncError::Database("database is read-only".into()),
                code => LedgerSyncError::Database(format!(
                    "sqlite failure {code:?} (code {}): {}",
                    err.extended_code,
                    message.unwrap_or_default()
                )),
            },
            SqlError::QueryReturnedNoRows => {
                LedgerSyncError::NotFound("no rows returned by query".into())
            }
            SqlError::FromSqlConversionFailure(column, _, cause) => LedgerSyncError::Database(
                format!("stored value in column {column} is unreadable: {cause}"),
            ),
            other => LedgerSyncError::Database(other.to_string()),
        };
        InfraError(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(LedgerSyncError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let mapped = if value.is_builder() {
            LedgerSyncError::Config(format!("invalid upstream request: {value}"))
        } else if value.is_timeout() {
            LedgerSyncError::Network("request timed out".into())
        } else if value.is_connect() {
            LedgerSyncError::Network(format!("connection failed: {value}"))
        } else {
            LedgerSyncError::Network(value.to_string())
        };
        InfraError(mapped)
    }
}
