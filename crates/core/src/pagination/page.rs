use serde::{Deserialize, Serialize};

use super::PageRequest;

/// One window of a listing plus the metadata to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Count of all matching rows, ignoring limit and offset.
    pub total: i64,
    pub limit: i64,
    pub current_page: i64,
    pub last_page: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: &PageRequest, total: i64, data: Vec<T>) -> Self {
        Self {
            total,
            limit: request.limit(),
            current_page: request.current_page(),
            last_page: request.last_page(total),
            data,
        }
    }

    /// Converts the data while keeping the metadata, e.g. records into DTOs.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            limit: self.limit,
            current_page: self.current_page,
            last_page: self.last_page,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
