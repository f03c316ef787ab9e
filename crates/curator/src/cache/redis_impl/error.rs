//! Redis error mapping to CacheError.

use curator_core::cache::CacheError;

/// Maps Redis errors to CacheError.
///
/// Anything that means the server could not be reached becomes
/// `ConnectionFailed`; the cache-aside accessor treats both variants as
/// "cache unavailable" but logs them differently.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}
