use crate::mapping::MappingId;
use thiserror::Error;

/// Errors related to the core value types of the URL shortener.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The unique constraint on `short_code` rejected the insert.
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("mapping {0} does not exist")]
    MissingMapping(MappingId),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// Returns `true` if this error is a uniqueness violation on insert.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to generate a unique short code after {attempts} attempts")]
    CapacityExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
