use thiserror::Error;

/// Caller contract violations on a pagination request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Limit must be positive, got {0}")]
    NonPositiveLimit(i64),
    #[error("Offset must not be negative, got {0}")]
    NegativeOffset(i64),
}
