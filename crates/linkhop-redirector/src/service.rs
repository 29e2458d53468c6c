use std::sync::Arc;
use std::time::Duration;

use crate::redirector::Redirector;
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use linkhop_core::{Mapping, Repository, ShortCode, UrlCache, DEFAULT_CACHE_TTL};
use tracing::{debug, error, trace, warn};

/// Service for handling URL redirects.
///
/// A cache hit is answered without touching the repository, so it is not
/// counted as a click. Only resolutions served by the repository bump
/// `click_count`. Cache failures of any kind degrade to a repository read.
#[derive(Debug)]
pub struct RedirectorService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    cache_ttl: Duration,
}

impl<R, C> Clone for RedirectorService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            cache_ttl: self.cache_ttl,
        }
    }
}

impl<R: Repository, C: UrlCache> RedirectorService<R, C> {
    /// Creates a new RedirectorService caching entries for 24 hours.
    pub fn new(repository: R, cache: C) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Overrides the TTL used when repopulating the cache.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    fn parse(code: &str) -> Result<ShortCode> {
        ShortCode::new(code).map_err(|e| {
            trace!(code, error = %e, "Rejecting malformed short code");
            RedirectorError::NotFound(code.to_owned())
        })
    }

    async fn cached(&self, code: &ShortCode) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(code = %code, error = %e, "Cache read failed, falling back to repository");
                None
            }
        }
    }

    async fn find(&self, code: &ShortCode) -> Result<Mapping> {
        match self.repository.find_by_code(code).await {
            Ok(Some(mapping)) => Ok(mapping),
            Ok(None) => {
                trace!(code = %code, "Short code not found");
                Err(RedirectorError::NotFound(code.to_string()))
            }
            Err(e) => {
                error!(code = %code, error = %e, "Repository read failed");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache> Redirector for RedirectorService<R, C> {
    async fn resolve(&self, code: &str) -> Result<String> {
        let code = Self::parse(code)?;
        trace!(code = %code, "resolving short code");

        if let Some(long_url) = self.cached(&code).await {
            debug!(code = %code, "Resolved from cache");
            return Ok(long_url);
        }

        let mapping = self.find(&code).await?;

        if let Err(e) = self
            .cache
            .set_url(&code, &mapping.long_url, self.cache_ttl)
            .await
        {
            warn!(code = %code, error = %e, "Failed to repopulate cache, continuing");
        }

        if let Err(e) = self.repository.increment_click(mapping.id).await {
            error!(code = %code, error = %e, "Failed to record click");
            return Err(e.into());
        }

        debug!(code = %code, url = %mapping.long_url, "Resolved from repository");
        Ok(mapping.long_url)
    }

    async fn lookup(&self, code: &str) -> Result<Mapping> {
        let code = Self::parse(code)?;
        self.find(&code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkhop_cache::{MokaUrlCache, NoopUrlCache};
    use linkhop_core::{CacheError, MappingId, StorageError};
    use linkhop_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type StoreResult<T> = linkhop_core::repository::Result<T>;
    type CacheResult<T> = linkhop_core::cache::Result<T>;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        cache: Arc<MokaUrlCache>,
        service: RedirectorService<Arc<InMemoryRepository>, Arc<MokaUrlCache>>,
    }

    impl Fixture {
        async fn with_mapping(short_code: &str, long_url: &str) -> Self {
            let repo = Arc::new(InMemoryRepository::new());
            repo.insert_unique(&code(short_code), long_url).await.unwrap();
            let cache = Arc::new(MokaUrlCache::new());
            let service = RedirectorService::new(Arc::clone(&repo), Arc::clone(&cache));
            Self {
                repo,
                cache,
                service,
            }
        }

        async fn clicks(&self, short_code: &str) -> u64 {
            self.repo
                .find_by_code(&code(short_code))
                .await
                .unwrap()
                .unwrap()
                .click_count
        }
    }

    /// Counts repository reads and can be told to fail them.
    #[derive(Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        reads: AtomicUsize,
        fail_reads: bool,
        fail_clicks: bool,
    }

    #[async_trait]
    impl Repository for CountingRepository {
        async fn find_by_code(&self, code: &ShortCode) -> StoreResult<Option<Mapping>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(StorageError::Unavailable("connection reset".to_string()));
            }
            self.inner.find_by_code(code).await
        }

        async fn insert_unique(&self, code: &ShortCode, long_url: &str) -> StoreResult<Mapping> {
            self.inner.insert_unique(code, long_url).await
        }

        async fn increment_click(&self, id: MappingId) -> StoreResult<()> {
            if self.fail_clicks {
                return Err(StorageError::Timeout("lock wait timeout".to_string()));
            }
            self.inner.increment_click(id).await
        }
    }

    /// A cache that is down.
    struct DownCache;

    #[async_trait]
    impl UrlCache for DownCache {
        async fn get_url(&self, _code: &ShortCode) -> CacheResult<Option<String>> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set_url(
            &self,
            _code: &ShortCode,
            _long_url: &str,
            _ttl: Duration,
        ) -> CacheResult<()> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    /// Always misses and records the TTL of every write.
    #[derive(Default)]
    struct RecordingCache {
        ttls: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl UrlCache for RecordingCache {
        async fn get_url(&self, _code: &ShortCode) -> CacheResult<Option<String>> {
            Ok(None)
        }

        async fn set_url(
            &self,
            _code: &ShortCode,
            _long_url: &str,
            ttl: Duration,
        ) -> CacheResult<()> {
            self.ttls.lock().unwrap().push(ttl);
            Ok(())
        }
    }

    #[tokio::test]
    async fn cache_miss_reads_repository_and_counts_click() {
        let fixture = Fixture::with_mapping("abc1", "https://example.com").await;

        let url = fixture.service.resolve("abc1").await.unwrap();

        assert_eq!(url, "https://example.com");
        assert_eq!(fixture.clicks("abc1").await, 1);
    }

    #[tokio::test]
    async fn cache_miss_repopulates_cache() {
        let fixture = Fixture::with_mapping("abc1", "https://example.com").await;

        fixture.service.resolve("abc1").await.unwrap();

        let cached = fixture.cache.get_url(&code("abc1")).await.unwrap();
        assert_eq!(cached.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn cache_hit_does_not_count_click() {
        let fixture = Fixture::with_mapping("abc1", "https://example.com").await;

        fixture.service.resolve("abc1").await.unwrap();
        assert_eq!(fixture.clicks("abc1").await, 1);

        fixture.service.resolve("abc1").await.unwrap();
        fixture.service.resolve("abc1").await.unwrap();
        assert_eq!(fixture.clicks("abc1").await, 1);
    }

    #[tokio::test]
    async fn cache_hit_skips_repository() {
        let repo = Arc::new(CountingRepository::default());
        let cache = Arc::new(MokaUrlCache::new());
        cache
            .set_url(&code("abc1"), "https://cached.example", DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        let service = RedirectorService::new(Arc::clone(&repo), cache);

        let url = service.resolve("abc1").await.unwrap();

        assert_eq!(url, "https://cached.example");
        assert_eq!(repo.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found_without_side_effects() {
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MokaUrlCache::new());
        let service = RedirectorService::new(Arc::clone(&repo), Arc::clone(&cache));

        let err = service.resolve("doesNotExist").await.unwrap_err();

        assert!(matches!(err, RedirectorError::NotFound(ref c) if c == "doesNotExist"));
        assert!(repo.is_empty());
        assert!(cache
            .get_url(&code("doesNotExist"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn malformed_code_is_not_found_without_repository_read() {
        let repo = Arc::new(CountingRepository::default());
        let service = RedirectorService::new(Arc::clone(&repo), NoopUrlCache);

        for input in ["", "has space", "dash-ed", &"a".repeat(33)] {
            let err = service.resolve(input).await.unwrap_err();
            assert!(matches!(err, RedirectorError::NotFound(_)));
        }
        assert_eq!(repo.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_repository() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();
        let service = RedirectorService::new(Arc::clone(&repo), DownCache);

        let url = service.resolve("abc1").await.unwrap();

        assert_eq!(url, "https://example.com");
        let stored = repo.find_by_code(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(stored.click_count, 1);
    }

    #[tokio::test]
    async fn repository_read_failure_is_storage_error() {
        let repo = CountingRepository {
            fail_reads: true,
            ..Default::default()
        };
        let service = RedirectorService::new(repo, NoopUrlCache);

        let err = service.resolve("abc1").await.unwrap_err();

        assert!(matches!(
            err,
            RedirectorError::Storage(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn click_failure_is_storage_error() {
        let repo = CountingRepository {
            fail_clicks: true,
            ..Default::default()
        };
        repo.inner
            .insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();
        let service = RedirectorService::new(repo, NoopUrlCache);

        let err = service.resolve("abc1").await.unwrap_err();

        assert!(matches!(
            err,
            RedirectorError::Storage(StorageError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn lookup_returns_mapping_without_counting() {
        let fixture = Fixture::with_mapping("abc1", "https://example.com").await;
        fixture.service.resolve("abc1").await.unwrap();

        let mapping = fixture.service.lookup("abc1").await.unwrap();
        let again = fixture.service.lookup("abc1").await.unwrap();

        assert_eq!(mapping.long_url, "https://example.com");
        assert_eq!(mapping.click_count, 1);
        assert_eq!(again.click_count, 1);
    }

    #[tokio::test]
    async fn lookup_unknown_code_is_not_found() {
        let fixture = Fixture::with_mapping("abc1", "https://example.com").await;

        let err = fixture.service.lookup("zzzz").await.unwrap_err();
        assert!(matches!(err, RedirectorError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_cache_entry_counts_next_click() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();
        let service = RedirectorService::new(Arc::clone(&repo), MokaUrlCache::new())
            .with_cache_ttl(Duration::from_millis(50));

        service.resolve("abc1").await.unwrap();
        service.resolve("abc1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        service.resolve("abc1").await.unwrap();

        let stored = repo.find_by_code(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(stored.click_count, 2);
    }

    #[tokio::test]
    async fn cache_miss_repopulates_for_a_day() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();
        let cache = Arc::new(RecordingCache::default());
        let service = RedirectorService::new(Arc::clone(&repo), Arc::clone(&cache));

        service.resolve("abc1").await.unwrap();
        service.resolve("abc1").await.unwrap();

        let ttls = cache.ttls.lock().unwrap().clone();
        assert_eq!(ttls, vec![Duration::from_secs(86_400); 2]);
    }
}
