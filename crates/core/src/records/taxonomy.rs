use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordError;
use crate::hierarchy::{TreeNode, TreePosition};

/// A category in a taxonomy tree, addressed publicly by its unique slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub position: TreePosition,
    pub record_ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Taxonomy {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            code: None,
            description: None,
            position: TreePosition::root(1),
            record_ordering: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_ordering(mut self, ordering: i64) -> Self {
        self.record_ordering = Some(ordering);
        self
    }

    /// Sets a specific ID for this taxonomy (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Fields matched by free-text search: name and slug.
    pub fn search_fields(&self) -> [Option<&str>; 2] {
        [Some(self.name.as_str()), Some(self.slug.as_str())]
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.position.parent_id
    }
}

impl TreeNode for Taxonomy {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub record_ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Taxonomy> for TaxonomyDto {
    fn from(taxonomy: &Taxonomy) -> Self {
        Self {
            id: taxonomy.id,
            parent_id: taxonomy.position.parent_id,
            name: taxonomy.name.clone(),
            slug: taxonomy.slug.clone(),
            code: taxonomy.code.clone(),
            description: taxonomy.description.clone(),
            record_ordering: taxonomy.record_ordering,
            created_at: taxonomy.created_at,
            updated_at: taxonomy.updated_at,
        }
    }
}

impl From<Taxonomy> for TaxonomyDto {
    fn from(taxonomy: Taxonomy) -> Self {
        Self::from(&taxonomy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNodeDto {
    #[serde(flatten)]
    pub taxonomy: TaxonomyDto,
    pub depth: i64,
    pub left: i64,
    pub right: i64,
}

impl From<&Taxonomy> for TaxonomyNodeDto {
    fn from(taxonomy: &Taxonomy) -> Self {
        Self {
            taxonomy: TaxonomyDto::from(taxonomy),
            depth: taxonomy.position.depth,
            left: taxonomy.position.left,
            right: taxonomy.position.right,
        }
    }
}

impl From<Taxonomy> for TaxonomyNodeDto {
    fn from(taxonomy: Taxonomy) -> Self {
        Self::from(&taxonomy)
    }
}

/// Validates a taxonomy before creation or update.
///
/// Slugs are lowercase ASCII letters, digits and single dashes between them.
pub fn validate_taxonomy(taxonomy: &Taxonomy) -> Result<(), RecordError> {
    if taxonomy.name.trim().is_empty() {
        return Err(RecordError::EmptyField("name"));
    }
    if taxonomy.slug.is_empty() {
        return Err(RecordError::EmptyField("slug"));
    }
    let well_formed = taxonomy
        .slug
        .split('-')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    if !well_formed {
        return Err(RecordError::InvalidSlug(taxonomy.slug.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_builder() {
        let taxonomy = Taxonomy::new("Rust", "rust")
            .with_code("RS")
            .with_description("Systems language")
            .with_ordering(1);
        assert_eq!(taxonomy.code.as_deref(), Some("RS"));
        assert_eq!(taxonomy.record_ordering, Some(1));
        assert_eq!(taxonomy.parent_id(), None);
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_taxonomy(&Taxonomy::new("Rust", "rust")).is_ok());
        assert!(validate_taxonomy(&Taxonomy::new("Rust 2024", "rust-2024")).is_ok());
        for slug in ["Rust", "rust lang", "-rust", "rust-", "rust--lang", "rüst"] {
            assert_eq!(
                validate_taxonomy(&Taxonomy::new("Rust", slug)),
                Err(RecordError::InvalidSlug(slug.to_string())),
                "{slug}"
            );
        }
        assert_eq!(
            validate_taxonomy(&Taxonomy::new("Rust", "")),
            Err(RecordError::EmptyField("slug"))
        );
    }

    #[test]
    fn test_dto_serialization() {
        let json = serde_json::to_value(TaxonomyDto::from(Taxonomy::new("Rust", "rust"))).unwrap();
        assert_eq!(json["slug"], "rust");
        assert!(json.get("parentId").unwrap().is_null());
        assert!(json.get("depth").is_none());
    }
}
