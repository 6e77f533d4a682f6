// Storage error types shared by every key-value store backend

use thiserror::Error;

/// Errors raised by a session store backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused access (poisoned lock, missing directory permissions, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem failure in the file-backed store
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis connection or command failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Result type alias for store operations
pub type StorageResult<T> = Result<T, StorageError>;
