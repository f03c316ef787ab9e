//! Pure functions for mapping repository errors to HTTP status codes.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `Conflict` -> 409 (Conflict)
/// - `InvalidInput` -> 400 (Bad Request)
/// - `StorageUnavailable` -> 503 (Service Unavailable)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use curator_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::not_found("User", "abc-123");
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::Conflict { .. } => 409,
        RepositoryError::InvalidInput(_) => 400,
        RepositoryError::StorageUnavailable(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::not_found("Media", "m-1");
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let error = RepositoryError::conflict("Taxonomy", "slug");
        assert_eq!(repository_error_to_status_code(&error), 409);
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let error = RepositoryError::InvalidInput("limit must be positive".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_storage_unavailable_maps_to_503() {
        let error = RepositoryError::StorageUnavailable("unable to open database".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_query_failed_and_serialization_map_to_500() {
        let query = RepositoryError::QueryFailed("syntax error".to_string());
        let serialization = RepositoryError::Serialization("invalid JSON".to_string());
        assert_eq!(repository_error_to_status_code(&query), 500);
        assert_eq!(repository_error_to_status_code(&serialization), 500);
    }
}
