//! In-memory cache implementation with LRU eviction.
//!
//! Mirrors the Redis backend's bookkeeping: `media:*` and `taxonomy:*` item
//! keys are tracked under their family so `delete_pattern("media:*")` only
//! touches media keys instead of scanning the whole store. A key leaves its
//! tracking set when it is deleted, evicted or found expired.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use curator_core::cache::{key_family, pattern_matches, tracked_family, Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Supports TTL with lazy expiration (entries are dropped when read after
/// their deadline). Uses LRU eviction to bound memory once `max_entries`
/// is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    /// Maps a tracked family (`media`, `taxonomy`) to the item keys stored under it.
    tracking: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache holding at most `max_entries` entries.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            tracking: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Drops `key` from its family's tracking set, if it has one.
fn untrack(tracking: &mut HashMap<String, HashSet<String>>, key: &str) {
    let Some(family) = tracked_family(key) else {
        return;
    };
    if let Some(tracked) = tracking.get_mut(family) {
        tracked.remove(key);
        if tracked.is_empty() {
            tracking.remove(family);
        }
    }
}

// Lock order is always `store` then `tracking`.
#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        let expired = match store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(key);
            untrack(&mut *self.tracking.write().await, key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        let evicted = store.push(key.to_string(), CacheEntry::new(value.to_vec(), ttl));

        let mut tracking = self.tracking.write().await;
        if let Some((evicted_key, _)) = evicted.filter(|(k, _)| k != key) {
            untrack(&mut tracking, &evicted_key);
        }
        if let Some(family) = tracked_family(key) {
            tracking
                .entry(family.to_string())
                .or_default()
                .insert(key.to_string());
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        untrack(&mut *self.tracking.write().await, key);

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let family = key_family(pattern);
        let mut store = self.store.write().await;
        let mut tracking = self.tracking.write().await;

        let keys_to_delete: Vec<String> = match tracking.get(family) {
            Some(keys) => keys
                .iter()
                .filter(|k| pattern_matches(pattern, k))
                .cloned()
                .collect(),
            // Untracked family: fall back to a full scan.
            None => store
                .iter()
                .filter(|(key, _)| pattern_matches(pattern, key))
                .map(|(key, _)| key.clone())
                .collect(),
        };

        for key in &keys_to_delete {
            store.pop(key);
            untrack(&mut tracking, key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::cache::{media_item_key, media_item_pattern, taxonomy_item_key, MEDIA_LIST_KEY};
    use uuid::Uuid;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("users", b"[]", None).await.unwrap();
        let result = cache.get("users").await.unwrap();

        assert_eq!(result, Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let result = cache.get("user:missing").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = media_item_key(Uuid::new_v4());

        cache.set(&key, b"to be deleted", None).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        cache.delete(&key).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(cache.tracking.read().await.get("media").is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("settings", b"short-lived", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get("settings").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get("settings").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_pattern_uses_family_tracking() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        let media1 = media_item_key(Uuid::new_v4());
        let media2 = media_item_key(Uuid::new_v4());
        let taxonomy = taxonomy_item_key(Uuid::new_v4());

        cache.set(&media1, b"1", None).await.unwrap();
        cache.set(&media2, b"2", None).await.unwrap();
        cache.set(&taxonomy, b"3", None).await.unwrap();
        cache.set(MEDIA_LIST_KEY, b"4", None).await.unwrap();

        {
            let tracking = cache.tracking.read().await;
            assert_eq!(tracking.get("media").map(|keys| keys.len()), Some(2));
        }

        cache.delete_pattern(media_item_pattern()).await.unwrap();

        assert!(cache.get(&media1).await.unwrap().is_none());
        assert!(cache.get(&media2).await.unwrap().is_none());
        // The bare list key is not part of the `media:*` pattern.
        assert!(cache.get(MEDIA_LIST_KEY).await.unwrap().is_some());
        assert!(cache.get(&taxonomy).await.unwrap().is_some());
        assert!(cache.tracking.read().await.get("media").is_none());
    }

    #[tokio::test]
    async fn test_delete_pattern_no_matches() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:123", b"value", None).await.unwrap();
        cache.set("user:456", b"value", None).await.unwrap();

        cache.delete_pattern("media:*").await.unwrap();

        assert!(cache.get("user:123").await.unwrap().is_some());
        assert!(cache.get("user:456").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern_untracked_falls_back() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("users", b"value1", None).await.unwrap();
        cache.set("user-stats", b"value2", None).await.unwrap();
        cache.set("settings", b"value3", None).await.unwrap();

        // Bare keys are never tracked, so this walks the store.
        cache.delete_pattern("user*").await.unwrap();

        assert!(cache.get("users").await.unwrap().is_none());
        assert!(cache.get("user-stats").await.unwrap().is_none());
        assert!(cache.get("settings").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "setting:theme";

        cache.set(key, b"first", None).await.unwrap();
        cache.set(key, b"second", None).await.unwrap();

        let result = cache.get(key).await.unwrap();
        assert_eq!(result, Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("taxonomies", b"persistent", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get("taxonomies").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(3);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();
        cache.set("key3", b"value3", None).await.unwrap();

        // Access key1 to make it recently used
        cache.get("key1").await.unwrap();

        // Insert a 4th entry - should evict key2 (least recently used)
        cache.set("key4", b"value4", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
        assert!(cache.get("key4").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_max_entries_holds_one() {
        let cache = MemoryCache::new(0);

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_tracking_stays_bounded() {
        let cache = MemoryCache::new(2);

        for i in 0..1000 {
            cache.set(&format!("user:{i}"), b"u", None).await.unwrap();
            cache.set(&media_item_key(Uuid::new_v4()), b"m", None).await.unwrap();
        }

        let tracking = cache.tracking.read().await;
        assert!(tracking.get("user").is_none());
        assert!(tracking.get("media").map_or(0, |keys| keys.len()) <= 2);
    }

    #[tokio::test]
    async fn test_expired_key_is_untracked_on_read() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = taxonomy_item_key(Uuid::new_v4());

        cache
            .set(&key, b"short-lived", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(cache.tracking.read().await.get("taxonomy").is_none());
    }
}
