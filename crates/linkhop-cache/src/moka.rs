use async_trait::async_trait;
use linkhop_core::cache::{Result, UrlCache};
use linkhop_core::ShortCode;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// A cached long URL together with the TTL it was stored with.
#[derive(Debug, Clone)]
struct CachedUrl {
    long_url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL passed to [`UrlCache::set_url`].
///
/// Overwriting an entry restarts its clock; reads leave it alone.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Suitable for single-node deployments, where it removes the need for a
/// separate cache service. Capacity is bounded; least-recently-used
/// entries are evicted first.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache with default settings.
    ///
    /// The cache will have a default maximum capacity of 100,000 entries.
    pub fn new() -> Self {
        CacheConfig::builder().build().into()
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }

    /// Number of live entries, as far as Moka currently knows.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching long URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(cached) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(cached.long_url))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, ttl_secs = ttl.as_secs(), "Storing long URL in Moka cache");

        let value = CachedUrl {
            long_url: long_url.to_owned(),
            ttl,
        };
        self.cache.insert(code.as_str().to_owned(), value).await;
        debug!(code = %code, "Cached long URL in Moka");
        Ok(())
    }
}

/// Configuration for creating a MokaUrlCache with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = 100_000)]
    max_capacity: u64,
}

impl From<CacheConfig> for MokaUrlCache {
    fn from(config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        MokaUrlCache { cache }
    }
}
