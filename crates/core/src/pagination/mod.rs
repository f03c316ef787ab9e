//! Pagination and free-text search shared by every listing operation.

mod error;
mod page;
mod request;
mod search;

pub use error::PaginationError;
pub use page::Page;
pub use request::{PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use search::{like_pattern, matches_query, window};
