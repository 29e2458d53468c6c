use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// How long a cached `short_code -> long_url` entry lives: 24 hours.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// A time-bounded cache of `short_code -> long_url`.
///
/// The cache is never authoritative. Entries may be missing, evicted or
/// expired at any time, and callers treat every error as a miss.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the long URL cached for a short code.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the long URL for a short code, expiring after `ttl`.
    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for Arc<T> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        (**self).set_url(code, long_url, ttl).await
    }
}
