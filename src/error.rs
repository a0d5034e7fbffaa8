//! Error types for the kintone client
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::types::RecordStamp;
use serde::Deserialize;
use thiserror::Error;

/// A structured error response from the kintone REST API.
///
/// Non-2xx responses carry a JSON body of the form
/// `{"code": "...", "id": "...", "message": "..."}`; `code` identifies the
/// failure class (e.g. `CB_VA01` for validation errors) and `id` is the
/// service-side incident reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("kintone API error (HTTP {status}) {code}: {message}")]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// Service error code, empty when the body was not parseable
    pub code: String,
    /// Human-readable message from the service
    pub message: String,
    /// Service-side error reference id
    pub error_id: Option<String>,
}

impl ApiError {
    /// Parse an error response body. Bodies that are not the documented
    /// error shape degrade to an [`ApiError`] with an empty code.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            code: String,
            #[serde(default)]
            message: String,
            #[serde(default)]
            id: Option<String>,
        }

        match serde_json::from_str::<Wire>(body) {
            Ok(wire) => Self {
                status,
                code: wire.code,
                message: wire.message,
                error_id: wire.id,
            },
            Err(_) => Self {
                status,
                code: String::new(),
                message: body.trim().to_string(),
                error_id: None,
            },
        }
    }
}

/// A bulk operation that was aborted partway through its chunk sequence.
///
/// The chunks before `failed_chunk` were already applied by the service
/// (bulk endpoints are atomic per call, not across calls), so their merged
/// per-record results travel with the error rather than being discarded.
#[derive(Error, Debug)]
#[error(
    "bulk operation aborted at chunk {failed_chunk} after {applied_count} records were applied: {source}",
    applied_count = .applied.len()
)]
pub struct PartialBatchFailure {
    /// Index of the first chunk whose submission failed
    pub failed_chunk: usize,
    /// Merged results of every chunk applied before the failure, in input order
    pub applied: Vec<RecordStamp>,
    /// The error that aborted the sequence
    #[source]
    pub source: Box<Error>,
}

/// The main error type for the kintone client
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration errors (detected before any network call)
    // ========================================================================
    /// Contradictory or out-of-range configuration
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    // ========================================================================
    // Service errors
    // ========================================================================
    /// A non-2xx response from the service
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A cursor fetch hit a cursor the service no longer knows.
    ///
    /// Terminal for that stream: restarting silently could duplicate or
    /// skip records if the dataset changed, so the caller decides whether
    /// to start over with a fresh strategy.
    #[error("cursor {cursor_id} has expired or was deleted by the service")]
    CursorExpired {
        /// Id of the cursor that is gone
        cursor_id: String,
    },

    /// A bulk operation aborted partway; see [`PartialBatchFailure`]
    #[error(transparent)]
    PartialBatch(Box<PartialBatchFailure>),

    // ========================================================================
    // Transport errors
    // ========================================================================
    /// The HTTP request itself failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service throttled the client past the retry budget
    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds the service asked to wait
        retry_after_seconds: u64,
    },

    /// The request timed out past the retry budget
    #[error("request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Every retry attempt was spent without a decisive response
    #[error("max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded {
        /// The configured retry budget
        max_retries: u32,
    },

    /// The base URL or a derived endpoint URL is not parseable
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Decoding errors
    // ========================================================================
    /// The service answered with a shape the client cannot use
    #[error("failed to decode response: {message}")]
    Decode {
        /// What was malformed
        message: String,
    },

    /// A response body was not valid JSON
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a partial batch failure
    pub fn partial_batch(failed_chunk: usize, applied: Vec<RecordStamp>, source: Error) -> Self {
        Self::PartialBatch(Box::new(PartialBatchFailure {
            failed_chunk,
            applied,
            source: Box::new(source),
        }))
    }

    /// Check if this error is retryable at the transport level.
    ///
    /// Config and cursor-expiry errors are never retryable: the condition
    /// persists until the caller fixes the configuration or opens a fresh
    /// cursor.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::Api(api) => is_retryable_status(api.status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the kintone client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("page size out of range");
        assert_eq!(
            err.to_string(),
            "configuration error: page size out of range"
        );

        let err = Error::CursorExpired {
            cursor_id: "cursor-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cursor cursor-1 has expired or was deleted by the service"
        );
    }

    #[test]
    fn test_api_error_from_body() {
        let err = ApiError::from_body(
            520,
            r#"{"code":"GAIA_CO02","id":"abc123","message":"The cursor is expired."}"#,
        );
        assert_eq!(err.status, 520);
        assert_eq!(err.code, "GAIA_CO02");
        assert_eq!(err.message, "The cursor is expired.");
        assert_eq!(err.error_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_api_error_from_unparseable_body() {
        let err = ApiError::from_body(502, "Bad Gateway\n");
        assert_eq!(err.status, 502);
        assert!(err.code.is_empty());
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.error_id.is_none());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::Api(ApiError::from_body(503, "")).is_retryable());

        assert!(!Error::Api(ApiError::from_body(400, "")).is_retryable());
        assert!(!Error::config("bad").is_retryable());
        assert!(!Error::CursorExpired {
            cursor_id: "c".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_partial_batch_display() {
        let applied = vec![
            RecordStamp {
                id: 1,
                revision: None,
            },
            RecordStamp {
                id: 2,
                revision: None,
            },
        ];
        let err = Error::partial_batch(1, applied, Error::Api(ApiError::from_body(409, "")));
        assert!(err
            .to_string()
            .contains("aborted at chunk 1 after 2 records were applied"));
    }
}
