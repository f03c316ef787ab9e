//! Free-text search helpers.
//!
//! The SQL backend matches with `LIKE ? ESCAPE '\'` over a fixed column set;
//! the in-memory backend uses [`matches_query`] over the same fields. Both
//! are substring matches combined with OR, folding ASCII letters only.
//! SQLite's `LIKE` leaves non-ASCII case alone, so `matches_query` does too.

use super::{Page, PageRequest};

/// Builds a `%query%` pattern with `%`, `_` and `\` escaped.
///
/// # Examples
///
/// ```
/// use curator_core::pagination::like_pattern;
///
/// assert_eq!(like_pattern("alice"), "%alice%");
/// assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Returns true if any field contains `query`, ignoring ASCII case. An empty query matches everything.
pub fn matches_query<'a>(fields: impl IntoIterator<Item = Option<&'a str>>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_ascii_lowercase();
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_ascii_lowercase().contains(&needle))
}

/// Cuts the requested window out of an already filtered and ordered result set.
pub fn window<T>(items: Vec<T>, request: &PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let data = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::new(request, total, data)
}
