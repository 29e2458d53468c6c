use crate::generator::random::RandomGenerator;
use crate::generator::Generator;
use async_trait::async_trait;
use linkhop_core::retry::{self, Attempt, RetryOutcome};
use linkhop_core::shortener::{DEFAULT_MAX_ATTEMPTS, MAX_LONG_URL_LENGTH};
use linkhop_core::{
    Allocation, Mapping, Repository, ShortCode, Shortener, ShortenerError, StorageError, UrlCache,
    DEFAULT_CACHE_TTL,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};
use typed_builder::TypedBuilder;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Public base URL that short codes are appended to.
    #[builder(setter(into))]
    pub base_url: String,
    /// How many candidate codes to try before giving up.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// TTL for the cache entry written after a successful allocation.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
}

/// The allocator: a concrete implementation of the `Shortener` trait.
///
/// For every request the service:
/// - rejects empty or oversized long URLs
/// - draws candidates from the `Generator` and commits them through the
///   repository, retrying collisions up to `max_attempts` times
/// - primes the cache with the new code (best-effort)
///
/// The existence check before each insert only saves a doomed write. The
/// repository's unique insert is what actually guarantees uniqueness, and
/// losing that race is handled like any other collision.
#[derive(Debug)]
pub struct ShortenerService<R, C, G = RandomGenerator> {
    repository: Arc<R>,
    cache: Arc<C>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<R, C, G> Clone for ShortenerService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, C: UrlCache> ShortenerService<R, C, RandomGenerator> {
    /// Creates a new `ShortenerService` drawing random base62 codes.
    pub fn new(repository: R, cache: C, settings: ShortenerSettings) -> Self {
        Self::with_generator(repository, cache, RandomGenerator::new(), settings)
    }
}

impl<R: Repository, C: UrlCache, G: Generator> ShortenerService<R, C, G> {
    /// Creates a new `ShortenerService` with a custom generator.
    pub fn with_generator(
        repository: R,
        cache: C,
        generator: G,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    fn validate_long_url(long_url: &str) -> Result<(), ShortenerError> {
        if long_url.trim().is_empty() {
            return Err(ShortenerError::InvalidInput(
                "long_url is required".to_string(),
            ));
        }

        let length = long_url.chars().count();
        if length > MAX_LONG_URL_LENGTH {
            return Err(ShortenerError::InvalidInput(format!(
                "long_url must be at most {} characters, got {}",
                MAX_LONG_URL_LENGTH, length
            )));
        }

        Ok(())
    }

    /// Tries to reserve one candidate code.
    async fn commit(&self, code: ShortCode, long_url: &str) -> Attempt<Mapping, StorageError> {
        match self.repository.find_by_code(&code).await {
            Ok(Some(_)) => {
                debug!(code = %code, "Candidate already taken");
                return Attempt::Collided;
            }
            Ok(None) => {}
            Err(e) => return Attempt::Aborted(e),
        }

        match self.repository.insert_unique(&code, long_url).await {
            Ok(mapping) => Attempt::Committed(mapping),
            Err(e) if e.is_conflict() => {
                debug!(code = %code, "Lost insert race for candidate");
                Attempt::Collided
            }
            Err(e) => Attempt::Aborted(e),
        }
    }

    async fn prime_cache(&self, mapping: &Mapping) {
        let code = &mapping.short_code;
        if let Err(e) = self
            .cache
            .set_url(code, &mapping.long_url, self.settings.cache_ttl)
            .await
        {
            warn!(code = %code, error = %e, "Failed to cache new mapping, continuing");
        }
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache, G: Generator> Shortener for ShortenerService<R, C, G> {
    async fn allocate(&self, long_url: &str) -> Result<Allocation, ShortenerError> {
        Self::validate_long_url(long_url)?;
        trace!(max_attempts = self.settings.max_attempts, "allocating short code");

        let outcome = retry::bounded(
            self.settings.max_attempts,
            || self.generator.generate(),
            move |code| self.commit(code, long_url),
        )
        .await;

        match outcome {
            RetryOutcome::Committed { value, attempts } => {
                self.prime_cache(&value).await;
                info!(code = %value.short_code, attempts, "allocated short code");
                Ok(Allocation {
                    short_url: value.short_code.to_url(&self.settings.base_url),
                    short_code: value.short_code,
                })
            }
            RetryOutcome::Exhausted { attempts } => {
                warn!(attempts, "every candidate short code collided");
                Err(ShortenerError::CapacityExhausted { attempts })
            }
            RetryOutcome::Aborted { error: e, attempts } => {
                error!(attempts, error = %e, "storage failure while allocating short code");
                Err(ShortenerError::Storage(e))
            }
        }
    }
}
