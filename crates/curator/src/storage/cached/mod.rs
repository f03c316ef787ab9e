//! Cached repository decorators.
//!
//! Each decorator wraps a repository with the cache-aside accessor:
//!
//! - **Reads**: whole-collection listings and by-id lookups go through
//!   [`CacheAside::remember`]; paginated, search and tree queries hit the
//!   repository directly.
//! - **Writes**: persist first, then drop the collection's list key and the
//!   item key. Structural mutations (create, move, delete) on a tree also
//!   drop every item key of that tree, since they shift other nodes'
//!   intervals. A write that failed with `StorageUnavailable` may still
//!   have committed, so it invalidates the same keys.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let repo = Arc::new(SqliteRepository::new("curator.db", Duration::from_secs(5)).await?);
//! let cache = Arc::new(CacheAside::new(Arc::new(MemoryCache::new(10_000)), Duration::from_millis(250)));
//!
//! let users = CachedUserRepository::new(repo, cache, Duration::from_secs(600));
//! ```

mod media;
mod setting;
mod taxonomy;
mod user;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use curator_core::cache::{decode, encode};
use curator_core::storage::{RepositoryError, Result};

use crate::cache::CacheAside;

pub use media::CachedMediaRepository;
pub use setting::CachedSettingRepository;
pub use taxonomy::CachedTaxonomyRepository;
pub use user::CachedUserRepository;

/// Whether a write outcome may have changed stored state.
fn may_have_written<T>(result: &Result<T>) -> bool {
    matches!(result, Ok(_) | Err(RepositoryError::StorageUnavailable(_)))
}

/// Reads `key` through the accessor and decodes it as `T`.
///
/// Bytes that no longer decode (e.g. written by an older build) are dropped
/// and the value is loaded from the repository instead.
async fn remember_decoded<T, F, Fut>(
    cache: &CacheAside,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let loader = &load;
    let bytes = cache
        .remember(key, ttl, || async move {
            let value = loader().await?;
            encode(&value).map_err(RepositoryError::from)
        })
        .await?;

    match decode(&bytes) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "Cached value could not be decoded, reloading");
            cache.remove(key).await;
            load().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use curator_core::cache::Cache;

    use crate::cache::MemoryCache;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_undecodable_bytes_are_dropped_and_reloaded() {
        let gateway = Arc::new(MemoryCache::new(10));
        gateway.set("settings", b"not json", None).await.unwrap();
        let cache = CacheAside::new(gateway.clone(), Duration::from_secs(1));
        let counter = AtomicUsize::new(0);
        let loads = &counter;

        let value: Vec<String> = remember_decoded(&cache, "settings", TTL, || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["theme".to_string()])
        })
        .await
        .unwrap();

        assert_eq!(value, vec!["theme".to_string()]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.get("settings").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_error_propagates() {
        let cache = CacheAside::new(Arc::new(MemoryCache::new(10)), Duration::from_secs(1));

        let result: Result<Vec<String>> = remember_decoded(&cache, "users", TTL, || async {
            Err(RepositoryError::StorageUnavailable("down".to_string()))
        })
        .await;

        assert_eq!(
            result,
            Err(RepositoryError::StorageUnavailable("down".to_string()))
        );
    }
}
