//! Redis cache backend implementation.
//!
//! Provides a shared cache for multi-instance deployments. Supports
//! connection pooling, TTL and pattern-based deletion.

mod cache;
mod error;

pub use cache::RedisCache;
