use async_trait::async_trait;
use uuid::Uuid;

use crate::pagination::{Page, PageRequest};
use crate::records::{Media, Setting, Taxonomy, User};

use super::Result;

/// Repository for user operations.
///
/// Reads only ever return live (not soft-deleted) users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by their email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Gets a user by their phone number.
    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>>;

    /// Gets a user by their username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Lists all users in insertion order.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Searches username, email and phone.
    async fn list_users_paginated(&self, request: &PageRequest) -> Result<Page<User>>;

    /// Creates a new user. A taken email, phone or username is a Conflict.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Updates an existing user.
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Soft-deletes a user. Deleting an already deleted user succeeds.
    async fn delete_user(&self, id: Uuid) -> Result<()>;

    /// Returns true if any row, deleted or not, holds this email.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Returns true if any row, deleted or not, holds this phone.
    async fn phone_exists(&self, phone: &str) -> Result<bool>;
}

/// Repository for the media tree.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>>;

    async fn get_media_by_hash(&self, hash: &str) -> Result<Option<Media>>;

    async fn get_media_by_file_name(&self, file_name: &str) -> Result<Option<Media>>;

    /// Lists all live media ordered by `record_ordering`, then insertion.
    async fn list_media(&self) -> Result<Vec<Media>>;

    /// Searches name and file name.
    async fn list_media_paginated(&self, request: &PageRequest) -> Result<Page<Media>>;

    /// Direct children of `parent_id`, or the roots when `None`.
    async fn list_media_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Media>>;

    async fn list_media_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Media>>;

    /// Inserts as the last child of `parent_id` (or as a root) and returns the
    /// record with its assigned position.
    async fn create_media(&self, media: &Media, parent_id: Option<Uuid>) -> Result<Media>;

    /// Updates attributes. The position is never changed here.
    async fn update_media(&self, media: &Media) -> Result<()>;

    /// Moves the subtree rooted at `id` under `new_parent` (or to the root level).
    async fn move_media(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Media>;

    /// Soft-deletes the subtree rooted at `id` and closes its gap.
    async fn delete_media(&self, id: Uuid) -> Result<()>;

    /// The subtree rooted at `id` (included) in pre-order.
    async fn media_subtree(&self, id: Uuid) -> Result<Vec<Media>>;

    /// Ancestors of `id`, root first.
    async fn media_ancestors(&self, id: Uuid) -> Result<Vec<Media>>;
}

/// Repository for the taxonomy tree.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    async fn get_taxonomy(&self, id: Uuid) -> Result<Option<Taxonomy>>;

    async fn get_taxonomy_by_slug(&self, slug: &str) -> Result<Option<Taxonomy>>;

    async fn list_taxonomies(&self) -> Result<Vec<Taxonomy>>;

    /// Searches name and slug.
    async fn list_taxonomies_paginated(&self, request: &PageRequest) -> Result<Page<Taxonomy>>;

    async fn list_taxonomy_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Taxonomy>>;

    async fn list_taxonomy_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Taxonomy>>;

    async fn create_taxonomy(
        &self,
        taxonomy: &Taxonomy,
        parent_id: Option<Uuid>,
    ) -> Result<Taxonomy>;

    async fn update_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()>;

    async fn move_taxonomy(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Taxonomy>;

    async fn delete_taxonomy(&self, id: Uuid) -> Result<()>;

    async fn taxonomy_subtree(&self, id: Uuid) -> Result<Vec<Taxonomy>>;

    async fn taxonomy_ancestors(&self, id: Uuid) -> Result<Vec<Taxonomy>>;
}

/// Repository for key/value settings.
#[async_trait]
pub trait SettingRepository: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>>;

    /// Lists all settings ordered by key.
    async fn list_settings(&self) -> Result<Vec<Setting>>;

    /// Inserts or replaces the value under `setting.key`, returning the stored row.
    async fn put_setting(&self, setting: &Setting) -> Result<Setting>;

    /// Removes a setting for good. An unknown key is NotFound.
    async fn delete_setting(&self, key: &str) -> Result<()>;
}
