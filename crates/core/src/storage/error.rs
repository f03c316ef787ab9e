use thiserror::Error;

use crate::cache::SerializationError;
use crate::hierarchy::HierarchyError;
use crate::pagination::PaginationError;
use crate::records::RecordError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The record is absent or soft-deleted.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    /// A natural key is already taken.
    #[error("{entity_type} with this {field} already exists")]
    Conflict {
        entity_type: &'static str,
        field: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The store could not be reached, was busy past its deadline, or the connection closed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity_type: &'static str, field: impl Into<String>) -> Self {
        Self::Conflict {
            entity_type,
            field: field.into(),
        }
    }

    /// Maps a tree rejection onto the repository taxonomy for `entity_type`.
    ///
    /// A missing node or parent is NotFound; a deleted parent or a move into
    /// the node's own subtree is InvalidInput.
    pub fn from_hierarchy(entity_type: &'static str, err: HierarchyError) -> Self {
        match err {
            HierarchyError::NodeNotFound(id) => Self::not_found(entity_type, id),
            HierarchyError::ParentNotFound(id) => Self::not_found(entity_type, id),
            HierarchyError::ParentDeleted(_) | HierarchyError::MoveIntoOwnSubtree { .. } => {
                Self::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<PaginationError> for RepositoryError {
    fn from(err: PaginationError) -> Self {
        RepositoryError::InvalidInput(err.to_string())
    }
}

impl From<RecordError> for RepositoryError {
    fn from(err: RecordError) -> Self {
        RepositoryError::InvalidInput(err.to_string())
    }
}

impl From<SerializationError> for RepositoryError {
    fn from(err: SerializationError) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::not_found("User", "abc-123");
        assert_eq!(error.to_string(), "User not found: abc-123");
    }

    #[test]
    fn test_repository_error_conflict_display() {
        let error = RepositoryError::conflict("User", "email");
        assert_eq!(error.to_string(), "User with this email already exists");
    }

    #[test]
    fn test_repository_error_storage_unavailable_display() {
        let error = RepositoryError::StorageUnavailable("database is locked".to_string());
        assert_eq!(error.to_string(), "Storage unavailable: database is locked");
    }

    #[test]
    fn test_repository_error_query_failed_display() {
        let error = RepositoryError::QueryFailed("no such column: foo".to_string());
        assert_eq!(error.to_string(), "Query failed: no such column: foo");
    }

    #[test]
    fn test_pagination_error_is_invalid_input() {
        let error: RepositoryError = PaginationError::NonPositiveLimit(0).into();
        assert_eq!(
            error,
            RepositoryError::InvalidInput("Limit must be positive, got 0".to_string())
        );
    }

    #[test]
    fn test_record_error_is_invalid_input() {
        let error: RepositoryError = RecordError::EmptyField("name").into();
        assert!(matches!(error, RepositoryError::InvalidInput(_)));
    }

    #[test]
    fn test_from_hierarchy() {
        let id = Uuid::nil();
        assert!(matches!(
            RepositoryError::from_hierarchy("Media", HierarchyError::ParentNotFound(id)),
            RepositoryError::NotFound {
                entity_type: "Media",
                ..
            }
        ));
        assert!(matches!(
            RepositoryError::from_hierarchy("Media", HierarchyError::ParentDeleted(id)),
            RepositoryError::InvalidInput(_)
        ));
        assert!(matches!(
            RepositoryError::from_hierarchy(
                "Taxonomy",
                HierarchyError::MoveIntoOwnSubtree { node: id, target: id }
            ),
            RepositoryError::InvalidInput(_)
        ));
    }
}
