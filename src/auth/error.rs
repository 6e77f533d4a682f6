// Authentication error types

use reqwest::StatusCode;
use thiserror::Error;

use crate::error::ApiError;
use crate::store::StorageError;

/// Errors returned by login
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials failed the local shape check (email format, empty password)
    #[error("Invalid credentials: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The login call failed; carries the original failure unchanged
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend answered 2xx without an access token
    #[error("Login response did not include an access token")]
    MissingToken,

    /// The session could not be persisted
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// HTTP status the backend answered with, if the call got that far
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            AuthError::Api(err) => err.status_code(),
            _ => None,
        }
    }

    /// True when the backend rejected the credentials themselves
    pub fn is_rejected_credentials(&self) -> bool {
        matches!(
            self.status_code(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::BAD_REQUEST)
        )
    }

    /// Message safe to show an end user
    pub fn error_message(&self) -> String {
        match self {
            AuthError::Validation(_) => "Enter a valid email and password".to_string(),
            AuthError::Api(err) if self.is_rejected_credentials() => err
                .detail()
                .unwrap_or_else(|| "Invalid email or password".to_string()),
            AuthError::Api(ApiError::Network(_)) => {
                "The server could not be reached".to_string()
            }
            AuthError::Api(_) => "Login failed".to_string(),
            AuthError::MissingToken => "Login failed: no access token received".to_string(),
            AuthError::Storage(_) => "Login succeeded but the session could not be saved".to_string(),
        }
    }
}
