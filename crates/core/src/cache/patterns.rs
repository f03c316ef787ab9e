//! Pure pattern matching functions for cache keys.
//!
//! These functions support glob-style patterns with `*` wildcard
//! that matches any sequence of characters.

/// Checks if a cache key matches a glob pattern.
///
/// The pattern supports `*` as a wildcard that matches any sequence
/// of characters (including empty strings).
///
/// # Examples
///
/// ```
/// use curator_core::cache::pattern_matches;
///
/// // Exact match
/// assert!(pattern_matches("user:123", "user:123"));
///
/// // Wildcard at end
/// assert!(pattern_matches("media:*", "media:550e8400-e29b-41d4-a716-446655440000"));
///
/// // The list key shares the family but not the separator
/// assert!(!pattern_matches("media:*", "media"));
///
/// // No match
/// assert!(!pattern_matches("taxonomy:*", "user:456"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    if pattern.is_empty() {
        return key.is_empty();
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return false,
    };
    let Some(mut remaining) = key.strip_prefix(first) else {
        return false;
    };

    // The last segment is anchored at the end; anything between is found greedily left to right.
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return true,
    };
    for segment in middle.iter().filter(|s| !s.is_empty()) {
        match remaining.find(segment) {
            Some(pos) => remaining = &remaining[pos + segment.len()..],
            None => return false,
        }
    }

    remaining.len() >= last.len() && remaining.ends_with(last)
}
