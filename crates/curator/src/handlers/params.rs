//! Query-string parameters shared by the listing endpoints.

use serde::Deserialize;

use curator_core::pagination::{PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
use curator_core::storage::RepositoryError;

/// `?query=&page=&limit=` for paginated listings.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl ListParams {
    /// A non-positive `limit` is rejected as invalid input.
    pub fn page_request(&self) -> Result<PageRequest, RepositoryError> {
        Ok(PageRequest::for_page(self.query.as_str(), self.page, self.limit)?)
    }
}
