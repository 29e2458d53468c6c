use crate::error::StorageError;
use crate::mapping::{Mapping, MappingId};
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The durable system of record for short code mappings.
///
/// Implementations are the sole arbiter of short code uniqueness:
/// [`insert_unique`](Repository::insert_unique) must fail atomically with
/// [`StorageError::Conflict`] when the code is already taken, even when
/// several writers race on the same code.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Inserts a new mapping with a zero click count.
    /// Returns `Err(Conflict)` if the code already exists.
    async fn insert_unique(&self, code: &ShortCode, long_url: &str) -> Result<Mapping>;

    /// Adds one to the click count of the mapping with the given id.
    async fn increment_click(&self, id: MappingId) -> Result<()>;
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        (**self).find_by_code(code).await
    }

    async fn insert_unique(&self, code: &ShortCode, long_url: &str) -> Result<Mapping> {
        (**self).insert_unique(code, long_url).await
    }

    async fn increment_click(&self, id: MappingId) -> Result<()> {
        (**self).increment_click(id).await
    }
}
