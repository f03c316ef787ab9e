use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordError;
use crate::hierarchy::{TreeNode, TreePosition};

/// A stored file. Media records form folders through the nested-set tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub name: String,
    pub hash: Option<String>,
    pub file_name: String,
    pub disk: String,
    pub mime_type: String,
    pub size: i64,
    pub custom_attributes: Option<serde_json::Value>,
    pub position: TreePosition,
    pub record_ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Media {
    /// Creates a detached media record. Its position is assigned on insert.
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        disk: impl Into<String>,
        mime_type: impl Into<String>,
        size: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hash: None,
            file_name: file_name.into(),
            disk: disk.into(),
            mime_type: mime_type.into(),
            size,
            custom_attributes: None,
            position: TreePosition::root(1),
            record_ordering: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_custom_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.custom_attributes = Some(attributes);
        self
    }

    pub fn with_ordering(mut self, ordering: i64) -> Self {
        self.record_ordering = Some(ordering);
        self
    }

    /// Sets a specific ID for this record (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Fields matched by free-text search: name and file name.
    pub fn search_fields(&self) -> [Option<&str>; 2] {
        [Some(self.name.as_str()), Some(self.file_name.as_str())]
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.position.parent_id
    }
}

impl TreeNode for Media {
    fn id(&self) -> Uuid {
        self.id
    }

    fn position(&self) -> &TreePosition {
        &self.position
    }

    fn position_mut(&mut self) -> &mut TreePosition {
        &mut self.position
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    fn ordering(&self) -> Option<i64> {
        self.record_ordering
    }
}

/// Public projection of a [`Media`] record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub hash: Option<String>,
    pub file_name: String,
    pub disk: String,
    pub mime_type: String,
    pub size: i64,
    pub custom_attributes: Option<serde_json::Value>,
    pub record_ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Media> for MediaDto {
    fn from(media: &Media) -> Self {
        Self {
            id: media.id,
            parent_id: media.position.parent_id,
            name: media.name.clone(),
            hash: media.hash.clone(),
            file_name: media.file_name.clone(),
            disk: media.disk.clone(),
            mime_type: media.mime_type.clone(),
            size: media.size,
            custom_attributes: media.custom_attributes.clone(),
            record_ordering: media.record_ordering,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }
}

impl From<Media> for MediaDto {
    fn from(media: Media) -> Self {
        Self::from(&media)
    }
}

/// [`MediaDto`] plus its place in the tree, for subtree and ancestor queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaNodeDto {
    #[serde(flatten)]
    pub media: MediaDto,
    pub depth: i64,
    pub left: i64,
    pub right: i64,
}

impl From<&Media> for MediaNodeDto {
    fn from(media: &Media) -> Self {
        Self {
            media: MediaDto::from(media),
            depth: media.position.depth,
            left: media.position.left,
            right: media.position.right,
        }
    }
}

impl From<Media> for MediaNodeDto {
    fn from(media: Media) -> Self {
        Self::from(&media)
    }
}

/// Validates a media record before creation or update.
pub fn validate_media(media: &Media) -> Result<(), RecordError> {
    if media.name.trim().is_empty() {
        return Err(RecordError::EmptyField("name"));
    }
    if media.file_name.trim().is_empty() {
        return Err(RecordError::EmptyField("fileName"));
    }
    if media.disk.trim().is_empty() {
        return Err(RecordError::EmptyField("disk"));
    }
    if media.size < 0 {
        return Err(RecordError::NegativeSize);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Media {
        Media::new("Cover", "cover.png", "local", "image/png", 2048)
    }

    #[test]
    fn test_media_builder() {
        let media = sample()
            .with_hash("abc123")
            .with_ordering(3)
            .with_custom_attributes(serde_json::json!({"alt": "cover"}));
        assert_eq!(media.hash.as_deref(), Some("abc123"));
        assert_eq!(media.record_ordering, Some(3));
        assert_eq!(media.parent_id(), None);
        assert!(!media.is_deleted());
    }

    #[test]
    fn test_dto_hides_interval() {
        let dto = MediaDto::from(sample());
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["fileName"], "cover.png");
        assert_eq!(json["mimeType"], "image/png");
        assert!(json.get("left").is_none());
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_node_dto_exposes_interval() {
        let mut media = sample();
        media.position = TreePosition {
            parent_id: Some(Uuid::nil()),
            left: 2,
            right: 3,
            depth: 1,
        };
        let json = serde_json::to_value(MediaNodeDto::from(&media)).unwrap();
        assert_eq!(json["left"], 2);
        assert_eq!(json["right"], 3);
        assert_eq!(json["depth"], 1);
        assert_eq!(json["name"], "Cover");
        assert_eq!(json["parentId"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_validate_media() {
        assert!(validate_media(&sample()).is_ok());
        assert_eq!(
            validate_media(&Media::new("", "a.png", "local", "image/png", 1)),
            Err(RecordError::EmptyField("name"))
        );
        assert_eq!(
            validate_media(&Media::new("A", " ", "local", "image/png", 1)),
            Err(RecordError::EmptyField("fileName"))
        );
        assert_eq!(
            validate_media(&Media::new("A", "a.png", "local", "image/png", -1)),
            Err(RecordError::NegativeSize)
        );
    }

    #[test]
    fn test_record_roundtrips_through_json() {
        let media = sample().with_custom_attributes(serde_json::json!({"w": 10}));
        let bytes = serde_json::to_vec(&media).unwrap();
        let back: Media = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, media);
    }
}
