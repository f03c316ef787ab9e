//! Redis cache implementation.
//!
//! `media:*` and `taxonomy:*` item keys are tracked in one Redis Set per
//! family so that `delete_pattern("media:*")` reads a single set instead of
//! walking the keyspace. Each tracking set expires no earlier than the
//! longest-lived key added to it. Patterns over any other family fall back
//! to `KEYS`.
//!
//! `delete` and `delete_pattern` issue several commands and are not atomic.
//! A crash between them leaves a stale member in a tracking set at worst;
//! DEL and SREM on missing keys are no-ops, so the next cleanup finishes
//! the job.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use curator_core::cache::{
    key_family, pattern_matches, tracked_family, tracking_key, Cache, Result, TRACKED_FAMILIES,
};

use super::error::map_redis_error;

/// Redis cache backend using connection manager for pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }

    fn tracking_key_for(key: &str) -> Option<String> {
        tracked_family(key).map(tracking_key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        let seconds = ttl.map(|duration| duration.as_secs().max(1));
        match seconds {
            Some(seconds) => {
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        let Some(tracking) = Self::tracking_key_for(key) else {
            return Ok(());
        };
        conn.sadd::<_, _, ()>(&tracking, key)
            .await
            .map_err(map_redis_error)?;

        match seconds {
            Some(seconds) => {
                // -1 means no expiry yet; never shorten a longer one.
                let remaining: i64 = conn.ttl(&tracking).await.map_err(map_redis_error)?;
                let seconds = seconds as i64;
                if remaining < seconds {
                    conn.expire::<_, ()>(&tracking, seconds)
                        .await
                        .map_err(map_redis_error)?;
                }
            }
            None => {
                conn.persist::<_, ()>(&tracking)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        if let Some(tracking) = Self::tracking_key_for(key) {
            conn.srem::<_, _, ()>(&tracking, key)
                .await
                .map_err(map_redis_error)?;
        }

        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        let family = key_family(pattern);
        let tracking = TRACKED_FAMILIES
            .contains(&family)
            .then(|| tracking_key(family));

        let Some(tracking) = tracking else {
            let keys_to_delete: Vec<String> = conn.keys(pattern).await.map_err(map_redis_error)?;
            if !keys_to_delete.is_empty() {
                conn.del::<_, ()>(&keys_to_delete)
                    .await
                    .map_err(map_redis_error)?;
            }
            return Ok(());
        };

        let tracked_keys: Vec<String> = conn
            .smembers(&tracking)
            .await
            .map_err(map_redis_error)?;

        let keys_to_delete: Vec<&String> = tracked_keys
            .iter()
            .filter(|k| pattern_matches(pattern, k))
            .collect();

        if !keys_to_delete.is_empty() {
            conn.del::<_, ()>(&keys_to_delete)
                .await
                .map_err(map_redis_error)?;

            conn.srem::<_, _, ()>(&tracking, &keys_to_delete)
                .await
                .map_err(map_redis_error)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::cache::{media_item_key, taxonomy_item_key};
    use uuid::Uuid;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url()).await.ok()
    }

    /// A family no other test run shares, so pattern deletes stay isolated.
    fn test_family() -> String {
        format!("test-{}", Uuid::new_v4().simple())
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("{}:set_get", test_family());
        cache.set(&key, b"hello world", None).await.unwrap();

        let result = cache.get(&key).await.unwrap();
        assert_eq!(result, Some(b"hello world".to_vec()));

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("{}:missing", test_family());
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_delete_untracks_key() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = media_item_key(Uuid::new_v4());
        cache.set(&key, b"to be deleted", None).await.unwrap();

        let mut conn = cache.conn.clone();
        let tracked: Vec<String> = conn.smembers(tracking_key("media")).await.unwrap();
        assert!(tracked.contains(&key));

        cache.delete(&key).await.unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        let tracked: Vec<String> = conn.smembers(tracking_key("media")).await.unwrap();
        assert!(!tracked.contains(&key));
    }

    #[tokio::test]
    async fn test_redis_tracking_set_expires_with_its_keys() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = taxonomy_item_key(Uuid::new_v4());
        cache
            .set(&key, b"tracked", Some(Duration::from_secs(30)))
            .await
            .unwrap();

        let mut conn = cache.conn.clone();
        let remaining: i64 = conn.ttl(tracking_key("taxonomy")).await.unwrap();
        assert!(remaining >= 29, "tracking set ttl was {remaining}");

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_user_keys_are_not_tracked() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("user:{}", Uuid::new_v4());
        cache.set(&key, b"alice", None).await.unwrap();

        let mut conn = cache.conn.clone();
        let tracked: Vec<String> = conn.smembers(tracking_key("user")).await.unwrap();
        assert!(!tracked.contains(&key));

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("{}:ttl", test_family());
        cache
            .set(&key, b"expiring value", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_delete_pattern() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let family = test_family();
        let key1 = format!("{}:{}", family, Uuid::new_v4());
        let key2 = format!("{}:{}", family, Uuid::new_v4());
        // Test families are untracked, so this goes through `KEYS`.
        // The bare list key is not matched by `family:*`.
        let list_key = family.clone();

        cache.set(&key1, b"value1", None).await.unwrap();
        cache.set(&key2, b"value2", None).await.unwrap();
        cache.set(&list_key, b"list", None).await.unwrap();

        cache
            .delete_pattern(&format!("{}:*", family))
            .await
            .unwrap();

        assert!(cache.get(&key1).await.unwrap().is_none());
        assert!(cache.get(&key2).await.unwrap().is_none());
        assert!(cache.get(&list_key).await.unwrap().is_some());

        cache.delete(&list_key).await.unwrap();
    }
}
