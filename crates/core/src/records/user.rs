use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordError;

/// A registered user. Flat record, no hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new user with the given username and email.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            phone: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Sets the phone number for this user.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets a specific ID for this user (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Fields matched by free-text search: username, email, phone.
    pub fn search_fields(&self) -> [Option<&str>; 3] {
        [
            Some(self.username.as_str()),
            Some(self.email.as_str()),
            self.phone.as_deref(),
        ]
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Public projection of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Validates a user before creation or update.
pub fn validate_user(user: &User) -> Result<(), RecordError> {
    let length = user.username.trim().chars().count();
    if length == 0 {
        return Err(RecordError::EmptyField("username"));
    }
    if !(3..=32).contains(&length) {
        return Err(RecordError::InvalidLength {
            field: "username",
            min: 3,
            max: 32,
        });
    }
    if !is_valid_email(&user.email) {
        return Err(RecordError::InvalidEmail(user.email.clone()));
    }
    if let Some(phone) = &user.phone {
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(RecordError::InvalidPhone(phone.clone()));
        }
    }
    Ok(())
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
