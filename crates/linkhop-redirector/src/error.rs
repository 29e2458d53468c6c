use linkhop_core::StorageError;
use thiserror::Error;

/// Result type for resolution.
pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}
