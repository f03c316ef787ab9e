//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! Column order follows the `SELECT` lists in [`super::schema`].

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use curator_core::hierarchy::TreePosition;
use curator_core::records::{Media, Setting, Taxonomy, User};
use curator_core::storage::RepositoryError;

// ============================================================================
// User conversions
// ============================================================================

/// Convert a SQLite row to a User.
///
/// Expected columns: id, username, email, phone, created_at, updated_at, deleted_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    let deleted_at: Option<String> = row.get(6)?;

    Ok(User {
        id: parse_uuid(&id)?,
        username: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        deleted_at: parse_optional_datetime(deleted_at.as_deref())?,
    })
}

// ============================================================================
// Media conversions
// ============================================================================

/// Convert a SQLite row to a Media record.
///
/// Expected columns: id, parent_id, name, hash, file_name, disk, mime_type,
/// size, custom_attributes, record_left, record_right, record_depth,
/// record_ordering, created_at, updated_at, deleted_at
pub fn row_to_media(row: &Row) -> rusqlite::Result<Media> {
    let id: String = row.get(0)?;
    let parent_id: Option<String> = row.get(1)?;
    let custom_attributes: Option<String> = row.get(8)?;
    let created_at: String = row.get(13)?;
    let updated_at: String = row.get(14)?;
    let deleted_at: Option<String> = row.get(15)?;

    Ok(Media {
        id: parse_uuid(&id)?,
        name: row.get(2)?,
        hash: row.get(3)?,
        file_name: row.get(4)?,
        disk: row.get(5)?,
        mime_type: row.get(6)?,
        size: row.get(7)?,
        custom_attributes: parse_json(custom_attributes.as_deref())?,
        position: TreePosition {
            parent_id: parse_optional_uuid(parent_id.as_deref())?,
            left: row.get(9)?,
            right: row.get(10)?,
            depth: row.get(11)?,
        },
        record_ordering: row.get(12)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        deleted_at: parse_optional_datetime(deleted_at.as_deref())?,
    })
}

/// Serializes `custom_attributes` for the TEXT column.
pub fn format_json(value: Option<&serde_json::Value>) -> Result<Option<String>, RepositoryError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

// ============================================================================
// Taxonomy conversions
// ============================================================================

/// Convert a SQLite row to a Taxonomy.
///
/// Expected columns: id, parent_id, name, slug, code, description,
/// record_left, record_right, record_depth, record_ordering, created_at,
/// updated_at, deleted_at
pub fn row_to_taxonomy(row: &Row) -> rusqlite::Result<Taxonomy> {
    let id: String = row.get(0)?;
    let parent_id: Option<String> = row.get(1)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;
    let deleted_at: Option<String> = row.get(12)?;

    Ok(Taxonomy {
        id: parse_uuid(&id)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        code: row.get(4)?,
        description: row.get(5)?,
        position: TreePosition {
            parent_id: parse_optional_uuid(parent_id.as_deref())?,
            left: row.get(6)?,
            right: row.get(7)?,
            depth: row.get(8)?,
        },
        record_ordering: row.get(9)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        deleted_at: parse_optional_datetime(deleted_at.as_deref())?,
    })
}

// ============================================================================
// Setting conversions
// ============================================================================

/// Convert a SQLite row to a Setting.
///
/// Expected columns: id, key, value, model_type, model_id, created_at, updated_at
pub fn row_to_setting(row: &Row) -> rusqlite::Result<Setting> {
    let id: String = row.get(0)?;
    let model_id: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Setting {
        id: parse_uuid(&id)?,
        key: row.get(1)?,
        value: row.get(2)?,
        model_type: row.get(3)?,
        model_id: parse_optional_uuid(model_id.as_deref())?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Format a datetime as RFC 3339 string.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn format_optional_datetime(dt: Option<&DateTime<Utc>>) -> Option<String> {
    dt.map(format_datetime)
}

fn conversion_error(e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(conversion_error)
}

fn parse_optional_uuid(s: Option<&str>) -> rusqlite::Result<Option<Uuid>> {
    s.map(parse_uuid).transpose()
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

fn parse_optional_datetime(s: Option<&str>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.map(parse_datetime).transpose()
}

fn parse_json(s: Option<&str>) -> rusqlite::Result<Option<serde_json::Value>> {
    s.map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .map_err(conversion_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let formatted = format_datetime(&dt);

        assert_eq!(formatted, "2024-01-15T10:30:00+00:00");
        assert_eq!(parse_datetime(&formatted).unwrap(), dt);
    }

    #[test]
    fn test_parse_invalid_uuid() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert_eq!(parse_optional_uuid(None).unwrap(), None);
    }

    #[test]
    fn test_parse_invalid_datetime() {
        assert!(parse_datetime("yesterday").is_err());
        assert_eq!(parse_optional_datetime(None).unwrap(), None);
    }

    #[test]
    fn test_json_columns() {
        let value = serde_json::json!({"alt": "cover"});
        let stored = format_json(Some(&value)).unwrap();

        assert_eq!(stored.as_deref(), Some(r#"{"alt":"cover"}"#));
        assert_eq!(parse_json(stored.as_deref()).unwrap(), Some(value));
        assert_eq!(format_json(None).unwrap(), None);
        assert!(parse_json(Some("{broken")).is_err());
    }
}
