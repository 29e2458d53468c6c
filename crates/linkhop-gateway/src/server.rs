use std::sync::Arc;

use anyhow::Context;
use linkhop_cache::{CacheConfig, MokaUrlCache, NoopUrlCache, RedisUrlCache, UrlCache};
use linkhop_redirector::RedirectorService;
use linkhop_shortener::{ShortenerService, ShortenerSettings};
use linkhop_storage::{InMemoryRepository, MySqlRepository, Repository};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::App;
use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use crate::state::AppState;

pub async fn repository(config: &CLI) -> anyhow::Result<Arc<dyn Repository>> {
    match config.storage {
        StorageBackendArg::InMemory => Ok(Arc::new(InMemoryRepository::new())),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            Ok(Arc::new(repository))
        }
    }
}

/// Builds the configured cache. A Redis that cannot be reached at startup
/// leaves the process running uncached rather than refusing to start.
pub async fn cache(config: &CLI) -> Arc<dyn UrlCache> {
    match config.cache {
        CacheBackendArg::None => Arc::new(NoopUrlCache),
        CacheBackendArg::Moka => {
            let cache: MokaUrlCache = CacheConfig::builder()
                .max_capacity(config.cache_capacity)
                .build()
                .into();
            Arc::new(cache)
        }
        CacheBackendArg::Redis => {
            let Some(redis_url) = config.redis_url.as_deref() else {
                warn!("redis cache selected without a url, caching disabled");
                return Arc::new(NoopUrlCache);
            };
            match RedisUrlCache::connect(redis_url).await {
                Ok(cache) => Arc::new(cache),
                Err(e) => {
                    warn!(error = %e, "redis unreachable, caching disabled");
                    Arc::new(NoopUrlCache)
                }
            }
        }
    }
}

pub fn state(
    config: &CLI,
    repository: Arc<dyn Repository>,
    cache: Arc<dyn UrlCache>,
) -> AppState {
    let settings = ShortenerSettings::builder()
        .base_url(config.public_base_url())
        .max_attempts(config.max_attempts)
        .cache_ttl(config.cache_ttl())
        .build();

    let shortener = ShortenerService::new(Arc::clone(&repository), Arc::clone(&cache), settings);
    let redirector =
        RedirectorService::new(repository, cache).with_cache_ttl(config.cache_ttl());

    AppState::new(Arc::new(shortener), Arc::new(redirector))
}

pub async fn run(config: CLI) -> anyhow::Result<()> {
    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url(),
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        max_attempts = config.max_attempts,
        "starting linkhop server"
    );

    let repository = repository(&config).await?;
    let cache = cache(&config).await;
    let router = App::router(state(&config, repository, cache));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
