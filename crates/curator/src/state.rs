//! Application state with repository-based storage.
//!
//! Handlers only see repository trait objects. Each one is the cached
//! decorator wrapped around the store selected by feature flags, and all four
//! share one cache-aside accessor.

use std::{sync::Arc, time::Duration};

use curator_core::cache::Cache;
use curator_core::storage::{
    MediaRepository, SettingRepository, TaxonomyRepository, UserRepository,
};

use crate::cache::CacheAside;
use crate::config::Config;
use crate::storage::cached::{
    CachedMediaRepository, CachedSettingRepository, CachedTaxonomyRepository,
    CachedUserRepository,
};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub taxonomies: Arc<dyn TaxonomyRepository>,
    pub settings: Arc<dyn SettingRepository>,
    /// Shared accessor, kept here for its health counter.
    pub cache: Arc<CacheAside>,
}

impl AppState {
    /// Opens the configured store and cache and wires the cached repositories.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = open_store(config).await?;
        let gateway = open_cache(config).await?;
        let cache = Arc::new(CacheAside::new(gateway, config.cache_timeout()));

        tracing::info!(
            ttl_seconds = config.cache_ttl_seconds,
            cache_timeout_ms = config.cache_timeout_ms,
            store_timeout_ms = config.store_timeout_ms,
            "Storage initialized"
        );

        Ok(Self::build(store, cache, config.cache_ttl()))
    }

    fn build<R>(store: Arc<R>, cache: Arc<CacheAside>, ttl: Duration) -> Self
    where
        R: UserRepository + MediaRepository + TaxonomyRepository + SettingRepository + 'static,
    {
        Self {
            users: Arc::new(CachedUserRepository::new(store.clone(), cache.clone(), ttl)),
            media: Arc::new(CachedMediaRepository::new(store.clone(), cache.clone(), ttl)),
            taxonomies: Arc::new(CachedTaxonomyRepository::new(
                store.clone(),
                cache.clone(),
                ttl,
            )),
            settings: Arc::new(CachedSettingRepository::new(store, cache.clone(), ttl)),
            cache,
        }
    }
}

// ============================================================================
// Backend selection
// ============================================================================

#[cfg(feature = "sqlite")]
async fn open_store(config: &Config) -> anyhow::Result<Arc<crate::storage::SqliteRepository>> {
    let repo = crate::storage::SqliteRepository::new(&config.sqlite_path, config.store_timeout()).await?;
    tracing::info!(path = %config.sqlite_path, "Opened SQLite store");
    Ok(Arc::new(repo))
}

#[cfg(feature = "inmemory")]
async fn open_store(_config: &Config) -> anyhow::Result<Arc<crate::storage::InMemoryRepository>> {
    tracing::warn!("Using the in-memory store; data is lost on shutdown");
    Ok(Arc::new(crate::storage::InMemoryRepository::new()))
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    Ok(Arc::new(crate::cache::MemoryCache::new(config.cache_max_entries)))
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    let cache = crate::cache::RedisCache::new(&config.redis_url).await?;
    tracing::info!(url = %config.redis_url, "Connected to Redis cache");
    Ok(Arc::new(cache))
}

#[cfg(test)]
impl Default for AppState {
    /// In-memory store behind a small memory cache.
    fn default() -> Self {
        let gateway = Arc::new(crate::cache::MemoryCache::new(1_000));
        let cache = Arc::new(CacheAside::new(gateway, Duration::from_millis(250)));
        Self::build(
            Arc::new(crate::storage::InMemoryRepository::new()),
            cache,
            Duration::from_secs(600),
        )
    }
}
