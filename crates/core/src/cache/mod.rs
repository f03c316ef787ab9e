mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    key_family, media_item_key, media_item_pattern, setting_key, taxonomy_item_key,
    taxonomy_item_pattern, tracked_family, tracking_key, user_key, MEDIA_LIST_KEY,
    SETTINGS_LIST_KEY, TAXONOMIES_LIST_KEY, TRACKED_FAMILIES, USERS_LIST_KEY,
};
pub use patterns::pattern_matches;
pub use serialization::{decode, encode, SerializationError};
pub use traits::Cache;
