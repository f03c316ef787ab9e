use super::PaginationError;

/// Page size used when the caller does not send one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Page number used when the caller does not send one.
pub const DEFAULT_PAGE: i64 = 1;

/// A validated search window over a listing: free-text query plus row limit and offset.
///
/// The engine only deals in raw row offsets; turning a 1-based page number
/// into an offset is the caller's job (see [`PageRequest::for_page`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    query: String,
    limit: i64,
    offset: i64,
}

impl PageRequest {
    /// Builds a request, failing fast on a non-positive limit or negative offset.
    pub fn new(query: impl Into<String>, limit: i64, offset: i64) -> Result<Self, PaginationError> {
        if limit <= 0 {
            return Err(PaginationError::NonPositiveLimit(limit));
        }
        if offset < 0 {
            return Err(PaginationError::NegativeOffset(offset));
        }
        Ok(Self {
            query: query.into().trim().to_string(),
            limit,
            offset,
        })
    }

    /// Converts a 1-based page number into a row offset: `(page - 1) * limit`.
    ///
    /// Pages below 1 are clamped to the first page.
    pub fn for_page(query: impl Into<String>, page: i64, limit: i64) -> Result<Self, PaginationError> {
        if limit <= 0 {
            return Err(PaginationError::NonPositiveLimit(limit));
        }
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(limit);
        Self::new(query, limit, offset)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// `offset / limit + 1`.
    pub fn current_page(&self) -> i64 {
        self.offset / self.limit + 1
    }

    /// `ceil(total / limit)`; zero when nothing matched.
    pub fn last_page(&self, total: i64) -> i64 {
        total / self.limit + i64::from(total % self.limit != 0)
    }
}
