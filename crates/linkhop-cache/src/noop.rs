use async_trait::async_trait;
use linkhop_core::cache::{Result, UrlCache};
use linkhop_core::ShortCode;
use std::time::Duration;
use tracing::trace;

/// A cache that stores nothing.
///
/// Selected when caching is disabled. Every read misses, so every
/// resolution goes to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUrlCache;

#[async_trait]
impl UrlCache for NoopUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Caching disabled, reporting miss");
        Ok(None)
    }

    async fn set_url(&self, _code: &ShortCode, _long_url: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}
