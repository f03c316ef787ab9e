//! API request payloads.
//!
//! Shared between the HTTP layer and tests. Empty optional strings are
//! normalised to `None` on the way in.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Media, Setting, Taxonomy, User};
use crate::serde::{deserialize_optional_string, deserialize_optional_uuid, deserialize_trimmed};

/// Request payload for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub username: String,
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

impl CreateUserRequest {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn into_user(self) -> User {
        let user = User::new(self.username, self.email);
        match self.phone {
            Some(phone) => user.with_phone(phone),
            None => user,
        }
    }
}

/// Request payload for updating a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UpdateUserRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Apply updates to an existing user.
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username.trim().to_string();
        }
        if let Some(email) = self.email {
            user.email = email.trim().to_string();
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
    }
}

/// Request payload for creating a media record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaRequest {
    pub name: String,
    pub file_name: String,
    pub disk: String,
    pub mime_type: String,
    pub size: i64,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ordering: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

impl CreateMediaRequest {
    /// Splits the payload into the record and the parent it goes under.
    pub fn into_media(self) -> (Media, Option<Uuid>) {
        let mut media = Media::new(self.name, self.file_name, self.disk, self.mime_type, self.size);
        media.hash = self.hash;
        media.custom_attributes = self.custom_attributes;
        media.record_ordering = self.record_ordering;
        (media, self.parent_id)
    }
}

/// Request payload for updating a media record's attributes.
///
/// The position is not editable here; use [`MoveNodeRequest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMediaRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ordering: Option<i64>,
}

impl UpdateMediaRequest {
    pub fn apply_to(self, media: &mut Media) {
        if let Some(name) = self.name {
            media.name = name;
        }
        if let Some(file_name) = self.file_name {
            media.file_name = file_name;
        }
        if let Some(disk) = self.disk {
            media.disk = disk;
        }
        if let Some(mime_type) = self.mime_type {
            media.mime_type = mime_type;
        }
        if let Some(size) = self.size {
            media.size = size;
        }
        if let Some(hash) = self.hash {
            media.hash = Some(hash);
        }
        if let Some(attributes) = self.custom_attributes {
            media.custom_attributes = Some(attributes);
        }
        if let Some(ordering) = self.record_ordering {
            media.record_ordering = Some(ordering);
        }
    }
}

/// Request payload for creating a taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaxonomyRequest {
    pub name: String,
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub slug: String,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ordering: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

impl CreateTaxonomyRequest {
    pub fn into_taxonomy(self) -> (Taxonomy, Option<Uuid>) {
        let mut taxonomy = Taxonomy::new(self.name, self.slug);
        taxonomy.code = self.code;
        taxonomy.description = self.description;
        taxonomy.record_ordering = self.record_ordering;
        (taxonomy, self.parent_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaxonomyRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ordering: Option<i64>,
}

impl UpdateTaxonomyRequest {
    pub fn apply_to(self, taxonomy: &mut Taxonomy) {
        if let Some(name) = self.name {
            taxonomy.name = name;
        }
        if let Some(slug) = self.slug {
            taxonomy.slug = slug.trim().to_string();
        }
        if let Some(code) = self.code {
            taxonomy.code = Some(code);
        }
        if let Some(description) = self.description {
            taxonomy.description = Some(description);
        }
        if let Some(ordering) = self.record_ordering {
            taxonomy.record_ordering = Some(ordering);
        }
    }
}

/// Request payload for moving a node. A missing or empty `parentId` moves it to the root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub parent_id: Option<Uuid>,
}

/// Request payload for creating or replacing a setting. The key comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutSettingRequest {
    pub value: String,
    #[serde(default, deserialize_with = "deserialize_optional_string", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid", skip_serializing_if = "Option::is_none")]
    pub model_id: Option<Uuid>,
}

impl PutSettingRequest {
    pub fn into_setting(self, key: impl Into<String>) -> Setting {
        let mut setting = Setting::new(key, self.value);
        setting.model_type = self.model_type;
        setting.model_id = self.model_id;
        setting
    }
}
