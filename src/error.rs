// Error handling module for the Belyv API client
// Provides the error type every service call returns

use reqwest::StatusCode;
use thiserror::Error;

use crate::store::StorageError;

/// Main error type for backend calls
/// All service methods return Result<T, ApiError>
///
/// Variants separate "no response at all" from "the backend answered with a
/// failure status" so callers can tell a dead network from a rejected call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("Network error: {0}")]
    Network(#[source] reqwest_middleware::Error),

    /// The backend answered with a non-2xx status
    /// `body` holds the raw response text, usually a DRF JSON error document
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// The session store could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A 2xx response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request payload failed local validation before being sent
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// An endpoint path could not be joined onto the base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request itself could not be assembled (bad header, multipart part)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Machine-readable error code (e.g., "NETWORK_ERROR", "HTTP_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Http { .. } => "HTTP_ERROR",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Parse(_) => "PARSE_ERROR",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidUrl(_) => "INVALID_URL",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// The `detail` message from a DRF error body, when there is one
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::Http { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .get("detail")
                        .or_else(|| value.get("error"))
                        .and_then(|detail| detail.as_str())
                        .map(str::to_string)
                }),
            _ => None,
        }
    }
}
