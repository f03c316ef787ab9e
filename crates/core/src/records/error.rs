use thiserror::Error;

/// Errors raised when validating a record before it is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("{field} must be between {min} and {max} characters")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Phone must be numeric: {0}")]
    InvalidPhone(String),
    #[error("Invalid slug: {0}")]
    InvalidSlug(String),
    #[error("Size must not be negative")]
    NegativeSize,
}
