use async_trait::async_trait;
use linkhop_core::cache::{Result, UrlCache};
use linkhop_core::{CacheError, ShortCode};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "lh:url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Long URLs are stored as plain string values under `<prefix><code>` and
/// written with `SET ... EX <ttl>`, so Redis itself expires them.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        CacheError::Timeout(message)
    } else if err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a client for `redis_url` and establishes a multiplexed connection.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            CacheError::Initialization(format!("invalid redis url '{redis_url}': {e}"))
        })?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }

    /// Generates the cache key for a short code.
    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching long URL from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(long_url)) => {
                debug!(code = %code, "Cache hit in Redis");
                Ok(Some(long_url))
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        let key = self.cache_key(code);
        // EX takes whole seconds and rejects zero.
        let seconds = ttl.as_secs().max(1);
        trace!(code = %code, ttl_secs = seconds, "Storing long URL in Redis cache");

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(&key, long_url, seconds).await {
            Ok(()) => {
                debug!(code = %code, "Cached long URL in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache long URL in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
