use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key to bytes store with expiry. The cache gateway every backend implements.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values matching a pattern (e.g., "media:*").
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}
