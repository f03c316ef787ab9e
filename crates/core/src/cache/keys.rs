//! Cache key scheme.
//!
//! Every cached value lives under a key of the form `family` (collection
//! lists) or `family:id` (single records). Only the families listed in
//! [`TRACKED_FAMILIES`] are ever deleted by pattern, so only their item keys
//! are grouped into tracking sets.

use uuid::Uuid;

/// Cache key for the full user list.
pub const USERS_LIST_KEY: &str = "users";

/// Cache key for the full media list.
pub const MEDIA_LIST_KEY: &str = "media";

/// Cache key for the full taxonomy list.
pub const TAXONOMIES_LIST_KEY: &str = "taxonomies";

/// Cache key for the full settings list.
pub const SETTINGS_LIST_KEY: &str = "settings";

/// Returns the cache key for a user.
pub fn user_key(user_id: Uuid) -> String {
    format!("user:{}", user_id)
}

/// Returns the cache key for a single media record.
pub fn media_item_key(media_id: Uuid) -> String {
    format!("media:{}", media_id)
}

/// Returns the pattern matching every single media record key.
///
/// A structural mutation (insert, move, delete) shifts the interval of
/// many rows at once, so all per-record entries are dropped together.
pub fn media_item_pattern() -> &'static str {
    "media:*"
}

/// Returns the cache key for a single taxonomy.
pub fn taxonomy_item_key(taxonomy_id: Uuid) -> String {
    format!("taxonomy:{}", taxonomy_id)
}

/// Returns the pattern matching every single taxonomy key.
pub fn taxonomy_item_pattern() -> &'static str {
    "taxonomy:*"
}

/// Returns the cache key for a setting.
pub fn setting_key(key: &str) -> String {
    format!("setting:{}", key)
}

/// Returns the family of a key or pattern: everything before the first `:`.
///
/// # Examples
///
/// ```
/// use curator_core::cache::key_family;
///
/// assert_eq!(key_family("media:00000000-0000-0000-0000-000000000000"), "media");
/// assert_eq!(key_family("taxonomy:*"), "taxonomy");
/// assert_eq!(key_family("users"), "users");
/// ```
pub fn key_family(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}

/// Families whose item keys are deleted by pattern after a tree mutation.
pub const TRACKED_FAMILIES: [&str; 2] = ["media", "taxonomy"];

/// Returns the family `key` is tracked under, if any.
///
/// # Examples
///
/// ```
/// use curator_core::cache::tracked_family;
///
/// assert_eq!(tracked_family("media:42"), Some("media"));
/// assert_eq!(tracked_family("user:42"), None);
/// assert_eq!(tracked_family("media"), None);
/// ```
pub fn tracked_family(key: &str) -> Option<&str> {
    let (family, _) = key.split_once(':')?;
    TRACKED_FAMILIES.contains(&family).then_some(family)
}

/// Returns the Redis Set key tracking every live key of a family.
///
/// The set enables pattern-based deletion without using Redis SCAN.
pub fn tracking_key(family: &str) -> String {
    format!("_keys:{}", family)
}
