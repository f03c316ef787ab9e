//! Cache-aside accessor.
//!
//! `remember` returns cached bytes when present and otherwise runs the
//! caller's `compute`, storing its bytes on success. The accessor never
//! decodes values; callers own serialization.
//!
//! Cache failures never reach the caller. Every gateway call runs under a
//! deadline; an error or a timeout is logged, counted and treated as a miss
//! (reads) or skipped (writes and deletes). A failed `compute` writes
//! nothing, so the next call computes again.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use curator_core::cache::{Cache, CacheError};

pub struct CacheAside {
    cache: Arc<dyn Cache>,
    timeout: Duration,
    unavailable: AtomicU64,
}

impl CacheAside {
    /// Wraps a cache gateway; each gateway call may take at most `timeout`.
    pub fn new(cache: Arc<dyn Cache>, timeout: Duration) -> Self {
        Self {
            cache,
            timeout,
            unavailable: AtomicU64::new(0),
        }
    }

    /// Returns the bytes cached under `key`, or computes, stores and returns them.
    pub async fn remember<F, Fut, E>(&self, key: &str, ttl: Duration, compute: F) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
    {
        if let Some(Some(bytes)) = self.guarded("get", key, self.cache.get(key)).await {
            tracing::trace!(key = %key, "Cache hit");
            return Ok(bytes);
        }

        tracing::trace!(key = %key, "Cache miss");
        let bytes = compute().await?;

        self.guarded("set", key, self.cache.set(key, &bytes, Some(ttl)))
            .await;

        Ok(bytes)
    }

    /// Drops `key` so the next `remember` recomputes it.
    pub async fn remove(&self, key: &str) {
        self.guarded("delete", key, self.cache.delete(key)).await;
    }

    /// Drops every key matching a `*` glob pattern.
    pub async fn remove_pattern(&self, pattern: &str) {
        self.guarded("delete_pattern", pattern, self.cache.delete_pattern(pattern))
            .await;
    }

    /// How many gateway calls failed or timed out since startup.
    pub fn unavailable_count(&self) -> u64 {
        self.unavailable.load(Ordering::Relaxed)
    }

    async fn guarded<T>(
        &self,
        operation: &'static str,
        key: &str,
        call: impl Future<Output = curator_core::cache::Result<T>>,
    ) -> Option<T> {
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let failures = self.unavailable.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    operation,
                    key = %key,
                    error = %err,
                    failures,
                    "Cache unavailable, falling through"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use crate::cache::MemoryCache;
    use curator_core::cache::Result as CacheResult;

    const TTL: Duration = Duration::from_secs(60);

    /// Gateway whose backend is unreachable.
    struct FailingCache;

    #[async_trait]
    impl Cache for FailingCache {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::ConnectionFailed("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("connection refused".to_string()))
        }

        async fn delete_pattern(&self, _pattern: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("connection refused".to_string()))
        }
    }

    /// Gateway that answers slower than any sane deadline.
    struct StalledCache;

    #[async_trait]
    impl Cache for StalledCache {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Ok(())
        }

        async fn delete_pattern(&self, _pattern: &str) -> CacheResult<()> {
            Ok(())
        }
    }

    fn memory_aside() -> CacheAside {
        CacheAside::new(Arc::new(MemoryCache::new(100)), Duration::from_secs(1))
    }

    async fn counted(calls: &AtomicUsize, bytes: &[u8]) -> Result<Vec<u8>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(bytes.to_vec())
    }

    #[tokio::test]
    async fn test_remember_computes_once_then_hits() {
        let aside = memory_aside();
        let calls = AtomicUsize::new(0);

        let first = aside
            .remember("users", TTL, || counted(&calls, b"[1]"))
            .await
            .unwrap();
        let second = aside
            .remember("users", TTL, || counted(&calls, b"[2]"))
            .await
            .unwrap();

        assert_eq!(first, b"[1]".to_vec());
        assert_eq!(second, b"[1]".to_vec());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remove_forces_recompute() {
        let aside = memory_aside();
        let calls = AtomicUsize::new(0);

        aside
            .remember("users", TTL, || counted(&calls, b"old"))
            .await
            .unwrap();
        aside.remove("users").await;
        let after = aside
            .remember("users", TTL, || counted(&calls, b"new"))
            .await
            .unwrap();

        assert_eq!(after, b"new".to_vec());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_remove_pattern_forces_recompute() {
        let aside = memory_aside();
        let calls = AtomicUsize::new(0);

        aside
            .remember("media:a", TTL, || counted(&calls, b"a"))
            .await
            .unwrap();
        aside.remove_pattern("media:*").await;
        aside
            .remember("media:a", TTL, || counted(&calls, b"a"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_compute_error_caches_nothing() {
        let aside = memory_aside();
        let calls = AtomicUsize::new(0);

        let failed: Result<Vec<u8>, String> = aside
            .remember("users", TTL, || async { Err("store down".to_string()) })
            .await;
        assert_eq!(failed, Err("store down".to_string()));

        let retried = aside
            .remember("users", TTL, || counted(&calls, b"[]"))
            .await
            .unwrap();

        assert_eq!(retried, b"[]".to_vec());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_cache_falls_through() {
        let aside = CacheAside::new(Arc::new(FailingCache), Duration::from_secs(1));
        let calls = AtomicUsize::new(0);

        let first = aside
            .remember("users", TTL, || counted(&calls, b"[]"))
            .await
            .unwrap();
        let second = aside
            .remember("users", TTL, || counted(&calls, b"[]"))
            .await
            .unwrap();
        aside.remove("users").await;

        assert_eq!(first, b"[]".to_vec());
        assert_eq!(second, b"[]".to_vec());
        // Nothing could be cached, so every read computes.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Two gets, two sets and one delete failed.
        assert_eq!(aside.unavailable_count(), 5);
    }

    #[tokio::test]
    async fn test_stalled_cache_times_out() {
        let aside = CacheAside::new(Arc::new(StalledCache), Duration::from_millis(20));
        let calls = AtomicUsize::new(0);

        let bytes = aside
            .remember("settings", TTL, || counted(&calls, b"{}"))
            .await
            .unwrap();

        assert_eq!(bytes, b"{}".to_vec());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(aside.unavailable_count(), 2);
    }
}
