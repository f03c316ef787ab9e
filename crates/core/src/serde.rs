//! Serde helper functions for request payload deserialization.
//!
//! Clients frequently send empty strings for optional fields. These helpers
//! normalise them to `None` so they never reach the storage layer as `""`
//! (which would collide with UNIQUE constraints on nullable natural keys such
//! as `users.phone`).

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserialize an optional string, treating empty or whitespace-only strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize an optional UUID, treating empty strings as None.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Deserialize a required string and trim surrounding whitespace.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        uuid_field: Option<Uuid>,
    }

    #[derive(Debug, Deserialize)]
    struct Trimmed {
        #[serde(deserialize_with = "deserialize_trimmed")]
        name: String,
    }

    #[test]
    fn test_deserialize_optional_string_empty() {
        let json = r#"{"string_field": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_whitespace() {
        let json = r#"{"string_field": "   "}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_value() {
        let json = r#"{"string_field": "+62 812"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, Some("+62 812".to_string()));
    }

    #[test]
    fn test_deserialize_optional_string_missing() {
        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.string_field, None);
        assert_eq!(result.uuid_field, None);
    }

    #[test]
    fn test_deserialize_optional_uuid_valid() {
        let json = r#"{"uuid_field": "550e8400-e29b-41d4-a716-446655440000"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.uuid_field,
            Some(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap())
        );
    }

    #[test]
    fn test_deserialize_optional_uuid_empty() {
        let json = r#"{"uuid_field": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.uuid_field, None);
    }

    #[test]
    fn test_deserialize_optional_uuid_invalid() {
        let json = r#"{"uuid_field": "not-a-uuid"}"#;
        let result: Result<TestStruct, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_trimmed() {
        let json = r#"{"name": "  alice  "}"#;
        let result: Trimmed = serde_json::from_str(json).unwrap();
        assert_eq!(result.name, "alice");
    }
}
