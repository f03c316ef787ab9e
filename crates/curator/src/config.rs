use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 600)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Deadline for a single cache call in milliseconds (default: 250)
    pub cache_timeout_ms: u64,
    /// Deadline for a single store call in milliseconds (default: 5,000)
    pub store_timeout_ms: u64,
    /// Path to SQLite database file (default: "curator.db")
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Whole-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_TIMEOUT_MS` - Per-call cache deadline (default: 250)
    /// - `STORE_TIMEOUT_MS` - Per-call store deadline and SQLite busy timeout (default: 5,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "curator.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS", 600),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", 10_000),
            cache_timeout_ms: parse_var("CACHE_TIMEOUT_MS", 250),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", 5_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "curator.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 10),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    #[allow(dead_code)]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
