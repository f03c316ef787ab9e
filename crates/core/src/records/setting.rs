use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordError;

/// A key/value setting, optionally scoped to another record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub model_type: Option<String>,
    pub model_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            value: value.into(),
            model_type: None,
            model_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scopes the setting to a record, e.g. `("user", user_id)`.
    pub fn for_model(mut self, model_type: impl Into<String>, model_id: Uuid) -> Self {
        self.model_type = Some(model_type.into());
        self.model_id = Some(model_id);
        self
    }
}

pub fn validate_setting(setting: &Setting) -> Result<(), RecordError> {
    if setting.key.trim().is_empty() {
        return Err(RecordError::EmptyField("key"));
    }
    if setting.key.chars().count() > 255 {
        return Err(RecordError::InvalidLength {
            field: "key",
            min: 1,
            max: 255,
        });
    }
    Ok(())
}
