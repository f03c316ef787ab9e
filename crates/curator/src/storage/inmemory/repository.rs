//! In-memory repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use curator_core::hierarchy::{NestedForest, TreeNode};
use curator_core::pagination::{matches_query, window, Page, PageRequest};
use curator_core::records::{Media, Setting, Taxonomy, User};
use curator_core::storage::{
    MediaRepository, RepositoryError, Result, SettingRepository, TaxonomyRepository,
    UserRepository,
};

/// In-memory storage backend.
///
/// Mirrors the SQLite backend's observable behavior: soft-deleted rows stay
/// stored and keep their natural keys taken, listings follow insertion order
/// (hierarchical listings honor `record_ordering` first).
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    users: Arc<RwLock<Vec<User>>>,
    media: Arc<RwLock<NestedForest<Media>>>,
    taxonomies: Arc<RwLock<NestedForest<Taxonomy>>>,
    settings: Arc<RwLock<Vec<Setting>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
            media: Arc::new(RwLock::new(NestedForest::new())),
            taxonomies: Arc::new(RwLock::new(NestedForest::new())),
            settings: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

/// First natural key of `candidate` already held by another user.
fn user_conflict(users: &[User], candidate: &User) -> Option<&'static str> {
    let others = || users.iter().filter(|u| u.id != candidate.id);

    if others().any(|u| u.username == candidate.username) {
        return Some("username");
    }
    if others().any(|u| u.email == candidate.email) {
        return Some("email");
    }
    if candidate.phone.is_some() && others().any(|u| u.phone == candidate.phone) {
        return Some("phone");
    }
    None
}

/// Children of `parent_id`, NotFound when the parent is missing or deleted.
fn live_children<T: TreeNode + Clone>(
    forest: &NestedForest<T>,
    parent_id: Option<Uuid>,
    entity_type: &'static str,
) -> Result<Vec<T>> {
    if let Some(parent_id) = parent_id {
        if forest.get(parent_id).is_none() {
            return Err(RepositoryError::not_found(entity_type, parent_id));
        }
    }
    Ok(forest.children(parent_id).into_iter().cloned().collect())
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id && !u.is_deleted()).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email == email && !u.is_deleted())
            .cloned())
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.phone.as_deref() == Some(phone) && !u.is_deleted())
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username && !u.is_deleted())
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| !u.is_deleted()).cloned().collect())
    }

    async fn list_users_paginated(&self, request: &PageRequest) -> Result<Page<User>> {
        let users = self.users.read().await;
        let matching: Vec<User> = users
            .iter()
            .filter(|u| !u.is_deleted() && matches_query(u.search_fields(), request.query()))
            .cloned()
            .collect();
        Ok(window(matching, request))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id == user.id) {
            return Err(RepositoryError::conflict("User", "id"));
        }
        if let Some(field) = user_conflict(&users, user) {
            return Err(RepositoryError::conflict("User", field));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(field) = user_conflict(&users, user) {
            return Err(RepositoryError::conflict("User", field));
        }
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id && !u.is_deleted())
            .ok_or_else(|| RepositoryError::not_found("User", user.id))?;

        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.phone = user.phone.clone();
        stored.updated_at = user.updated_at;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepositoryError::not_found("User", id))?;

        if stored.deleted_at.is_none() {
            let now = Utc::now();
            stored.deleted_at = Some(now);
            stored.updated_at = now;
        }
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.phone.as_deref() == Some(phone)))
    }
}

// ============================================================================
// MediaRepository implementation
// ============================================================================

#[async_trait]
impl MediaRepository for InMemoryRepository {
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>> {
        let media = self.media.read().await;
        Ok(media.get(id).cloned())
    }

    async fn get_media_by_hash(&self, hash: &str) -> Result<Option<Media>> {
        let media = self.media.read().await;
        let found = media
            .all()
            .find(|m| m.hash.as_deref() == Some(hash) && m.deleted_at.is_none())
            .cloned();
        Ok(found)
    }

    async fn get_media_by_file_name(&self, file_name: &str) -> Result<Option<Media>> {
        let media = self.media.read().await;
        let found = media
            .all()
            .find(|m| m.file_name == file_name && m.deleted_at.is_none())
            .cloned();
        Ok(found)
    }

    async fn list_media(&self) -> Result<Vec<Media>> {
        let media = self.media.read().await;
        Ok(media.live().into_iter().cloned().collect())
    }

    async fn list_media_paginated(&self, request: &PageRequest) -> Result<Page<Media>> {
        let media = self.media.read().await;
        let matching: Vec<Media> = media
            .live()
            .into_iter()
            .filter(|m| matches_query(m.search_fields(), request.query()))
            .cloned()
            .collect();
        Ok(window(matching, request))
    }

    async fn list_media_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Media>> {
        let media = self.media.read().await;
        live_children(&media, parent_id, "Media")
    }

    async fn list_media_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Media>> {
        let media = self.media.read().await;
        let matching: Vec<Media> = live_children(&media, parent_id, "Media")?
            .into_iter()
            .filter(|m| matches_query(m.search_fields(), request.query()))
            .collect();
        Ok(window(matching, request))
    }

    async fn create_media(&self, media: &Media, parent_id: Option<Uuid>) -> Result<Media> {
        let mut forest = self.media.write().await;
        if forest.get_any(media.id).is_some() {
            return Err(RepositoryError::conflict("Media", "id"));
        }

        let mut created = media.clone();
        created.position = forest
            .insert(media.clone(), parent_id)
            .map_err(|e| RepositoryError::from_hierarchy("Media", e))?;
        Ok(created)
    }

    async fn update_media(&self, media: &Media) -> Result<()> {
        let mut forest = self.media.write().await;
        let stored = forest
            .get_mut(media.id)
            .ok_or_else(|| RepositoryError::not_found("Media", media.id))?;

        stored.name = media.name.clone();
        stored.hash = media.hash.clone();
        stored.file_name = media.file_name.clone();
        stored.disk = media.disk.clone();
        stored.mime_type = media.mime_type.clone();
        stored.size = media.size;
        stored.custom_attributes = media.custom_attributes.clone();
        stored.record_ordering = media.record_ordering;
        stored.updated_at = media.updated_at;
        Ok(())
    }

    async fn move_media(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Media> {
        let mut forest = self.media.write().await;
        forest
            .move_node(id, new_parent)
            .map_err(|e| RepositoryError::from_hierarchy("Media", e))?;

        let moved = forest
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found("Media", id))?;
        moved.updated_at = Utc::now();
        Ok(moved.clone())
    }

    async fn delete_media(&self, id: Uuid) -> Result<()> {
        let mut forest = self.media.write().await;
        let removed = forest
            .remove(id, Utc::now())
            .map_err(|e| RepositoryError::from_hierarchy("Media", e))?;

        tracing::debug!(media_id = %id, removed, "Media subtree deleted");
        Ok(())
    }

    async fn media_subtree(&self, id: Uuid) -> Result<Vec<Media>> {
        let forest = self.media.read().await;
        let nodes = forest
            .subtree(id)
            .map_err(|e| RepositoryError::from_hierarchy("Media", e))?;
        Ok(nodes.into_iter().cloned().collect())
    }

    async fn media_ancestors(&self, id: Uuid) -> Result<Vec<Media>> {
        let forest = self.media.read().await;
        let nodes = forest
            .ancestors(id)
            .map_err(|e| RepositoryError::from_hierarchy("Media", e))?;
        Ok(nodes.into_iter().cloned().collect())
    }
}

// ============================================================================
// TaxonomyRepository implementation
// ============================================================================

#[async_trait]
impl TaxonomyRepository for InMemoryRepository {
    async fn get_taxonomy(&self, id: Uuid) -> Result<Option<Taxonomy>> {
        let taxonomies = self.taxonomies.read().await;
        Ok(taxonomies.get(id).cloned())
    }

    async fn get_taxonomy_by_slug(&self, slug: &str) -> Result<Option<Taxonomy>> {
        let taxonomies = self.taxonomies.read().await;
        let found = taxonomies
            .all()
            .find(|t| t.slug == slug && t.deleted_at.is_none())
            .cloned();
        Ok(found)
    }

    async fn list_taxonomies(&self) -> Result<Vec<Taxonomy>> {
        let taxonomies = self.taxonomies.read().await;
        Ok(taxonomies.live().into_iter().cloned().collect())
    }

    async fn list_taxonomies_paginated(&self, request: &PageRequest) -> Result<Page<Taxonomy>> {
        let taxonomies = self.taxonomies.read().await;
        let matching: Vec<Taxonomy> = taxonomies
            .live()
            .into_iter()
            .filter(|t| matches_query(t.search_fields(), request.query()))
            .cloned()
            .collect();
        Ok(window(matching, request))
    }

    async fn list_taxonomy_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Taxonomy>> {
        let taxonomies = self.taxonomies.read().await;
        live_children(&taxonomies, parent_id, "Taxonomy")
    }

    async fn list_taxonomy_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Taxonomy>> {
        let taxonomies = self.taxonomies.read().await;
        let matching: Vec<Taxonomy> = live_children(&taxonomies, parent_id, "Taxonomy")?
            .into_iter()
            .filter(|t| matches_query(t.search_fields(), request.query()))
            .collect();
        Ok(window(matching, request))
    }

    async fn create_taxonomy(
        &self,
        taxonomy: &Taxonomy,
        parent_id: Option<Uuid>,
    ) -> Result<Taxonomy> {
        let mut forest = self.taxonomies.write().await;
        if forest.get_any(taxonomy.id).is_some() {
            return Err(RepositoryError::conflict("Taxonomy", "id"));
        }
        if forest.all().any(|t| t.slug == taxonomy.slug) {
            return Err(RepositoryError::conflict("Taxonomy", "slug"));
        }

        let mut created = taxonomy.clone();
        created.position = forest
            .insert(taxonomy.clone(), parent_id)
            .map_err(|e| RepositoryError::from_hierarchy("Taxonomy", e))?;
        Ok(created)
    }

    async fn update_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()> {
        let mut forest = self.taxonomies.write().await;
        if forest
            .all()
            .any(|t| t.id != taxonomy.id && t.slug == taxonomy.slug)
        {
            return Err(RepositoryError::conflict("Taxonomy", "slug"));
        }
        let stored = forest
            .get_mut(taxonomy.id)
            .ok_or_else(|| RepositoryError::not_found("Taxonomy", taxonomy.id))?;

        stored.name = taxonomy.name.clone();
        stored.slug = taxonomy.slug.clone();
        stored.code = taxonomy.code.clone();
        stored.description = taxonomy.description.clone();
        stored.record_ordering = taxonomy.record_ordering;
        stored.updated_at = taxonomy.updated_at;
        Ok(())
    }

    async fn move_taxonomy(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Taxonomy> {
        let mut forest = self.taxonomies.write().await;
        forest
            .move_node(id, new_parent)
            .map_err(|e| RepositoryError::from_hierarchy("Taxonomy", e))?;

        let moved = forest
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found("Taxonomy", id))?;
        moved.updated_at = Utc::now();
        Ok(moved.clone())
    }

    async fn delete_taxonomy(&self, id: Uuid) -> Result<()> {
        let mut forest = self.taxonomies.write().await;
        let removed = forest
            .remove(id, Utc::now())
            .map_err(|e| RepositoryError::from_hierarchy("Taxonomy", e))?;

        tracing::debug!(taxonomy_id = %id, removed, "Taxonomy subtree deleted");
        Ok(())
    }

    async fn taxonomy_subtree(&self, id: Uuid) -> Result<Vec<Taxonomy>> {
        let forest = self.taxonomies.read().await;
        let nodes = forest
            .subtree(id)
            .map_err(|e| RepositoryError::from_hierarchy("Taxonomy", e))?;
        Ok(nodes.into_iter().cloned().collect())
    }

    async fn taxonomy_ancestors(&self, id: Uuid) -> Result<Vec<Taxonomy>> {
        let forest = self.taxonomies.read().await;
        let nodes = forest
            .ancestors(id)
            .map_err(|e| RepositoryError::from_hierarchy("Taxonomy", e))?;
        Ok(nodes.into_iter().cloned().collect())
    }
}

// ============================================================================
// SettingRepository implementation
// ============================================================================

#[async_trait]
impl SettingRepository for InMemoryRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        let settings = self.settings.read().await;
        Ok(settings.iter().find(|s| s.key == key).cloned())
    }

    async fn list_settings(&self) -> Result<Vec<Setting>> {
        let settings = self.settings.read().await;
        Ok(settings.clone())
    }

    async fn put_setting(&self, setting: &Setting) -> Result<Setting> {
        let mut settings = self.settings.write().await;
        match settings.iter_mut().find(|s| s.key == setting.key) {
            Some(stored) => {
                stored.value = setting.value.clone();
                stored.model_type = setting.model_type.clone();
                stored.model_id = setting.model_id;
                stored.updated_at = setting.updated_at;
                Ok(stored.clone())
            }
            None => {
                settings.push(setting.clone());
                Ok(setting.clone())
            }
        }
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        let mut settings = self.settings.write().await;
        let index = settings
            .iter()
            .position(|s| s.key == key)
            .ok_or_else(|| RepositoryError::not_found("Setting", key))?;
        settings.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::hierarchy::validate_forest;

    fn file(name: &str) -> Media {
        Media::new(name, format!("{name}.png"), "local", "image/png", 10)
    }

    #[tokio::test]
    async fn test_user_round_trip_and_conflicts() {
        let repo = InMemoryRepository::new();
        let user = User::new("alice", "a@x.com").with_phone("123");
        repo.create_user(&user).await.unwrap();

        let stored = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(
            (stored.username.as_str(), stored.email.as_str(), stored.phone.as_deref()),
            ("alice", "a@x.com", Some("123"))
        );

        assert_eq!(
            repo.create_user(&User::new("bob", "a@x.com")).await,
            Err(RepositoryError::conflict("User", "email"))
        );
        assert_eq!(
            repo.create_user(&User::new("carol", "c@x.com").with_phone("123"))
                .await,
            Err(RepositoryError::conflict("User", "phone"))
        );
        // Users without a phone never collide on it.
        repo.create_user(&User::new("dave", "d@x.com")).await.unwrap();
        repo.create_user(&User::new("erin", "e@x.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_email() {
        let repo = InMemoryRepository::new();
        repo.create_user(&User::new("alice", "a@x.com")).await.unwrap();
        let mut bob = User::new("bob", "b@x.com");
        repo.create_user(&bob).await.unwrap();

        bob.email = "a@x.com".to_string();

        assert_eq!(
            repo.update_user(&bob).await,
            Err(RepositoryError::conflict("User", "email"))
        );
    }

    #[tokio::test]
    async fn test_delete_user_policy() {
        let repo = InMemoryRepository::new();
        let user = User::new("alice", "a@x.com");
        repo.create_user(&user).await.unwrap();

        repo.delete_user(user.id).await.unwrap();
        repo.delete_user(user.id).await.unwrap();

        assert_eq!(repo.get_user(user.id).await.unwrap(), None);
        assert!(repo.email_exists("a@x.com").await.unwrap());
        let unknown = Uuid::new_v4();
        assert_eq!(
            repo.delete_user(unknown).await,
            Err(RepositoryError::not_found("User", unknown))
        );
    }

    #[tokio::test]
    async fn test_list_users_paginated() {
        let repo = InMemoryRepository::new();
        for i in 0..23 {
            repo.create_user(&User::new(format!("user{i:02}"), format!("u{i}@x.com")))
                .await
                .unwrap();
        }

        let first = repo
            .list_users_paginated(&PageRequest::new("", 10, 0).unwrap())
            .await
            .unwrap();
        let second = repo
            .list_users_paginated(&PageRequest::new("", 10, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(first.total, 23);
        assert_eq!(first.last_page, 3);
        assert_eq!(first.current_page, 1);
        assert_eq!(second.current_page, 2);
        assert_eq!(second.data[0].username, "user10");
    }

    #[tokio::test]
    async fn test_media_tree_lifecycle() {
        let repo = InMemoryRepository::new();
        let root = repo.create_media(&file("root"), None).await.unwrap();
        let a = repo.create_media(&file("a"), Some(root.id)).await.unwrap();
        let b = repo.create_media(&file("b"), Some(root.id)).await.unwrap();
        let a1 = repo.create_media(&file("a1"), Some(a.id)).await.unwrap();

        let subtree: Vec<Uuid> = repo
            .media_subtree(root.id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(subtree, vec![root.id, a.id, a1.id, b.id]);

        let moved = repo.move_media(a.id, Some(b.id)).await.unwrap();
        assert_eq!(moved.parent_id(), Some(b.id));
        assert_eq!(moved.position.depth, 2);

        repo.delete_media(b.id).await.unwrap();
        let remaining: Vec<Uuid> = repo.list_media().await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(remaining, vec![root.id]);

        let positions: Vec<_> = repo
            .list_media()
            .await
            .unwrap()
            .into_iter()
            .map(|m| (m.id, m.position))
            .collect();
        assert!(validate_forest(&positions).is_empty());
    }

    #[tokio::test]
    async fn test_media_lookups_skip_deleted() {
        let repo = InMemoryRepository::new();
        let media = file("logo").with_hash("h1");
        repo.create_media(&media, None).await.unwrap();

        assert!(repo.get_media_by_hash("h1").await.unwrap().is_some());
        assert!(repo.get_media_by_file_name("logo.png").await.unwrap().is_some());

        repo.delete_media(media.id).await.unwrap();

        assert_eq!(repo.get_media_by_hash("h1").await.unwrap(), None);
        assert_eq!(repo.get_media_by_file_name("logo.png").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_media_children_paginated_and_missing_parent() {
        let repo = InMemoryRepository::new();
        let folder = repo.create_media(&file("folder"), None).await.unwrap();
        for i in 0..3 {
            repo.create_media(&file(&format!("pic{i}")), Some(folder.id))
                .await
                .unwrap();
        }

        let page = repo
            .list_media_children_paginated(Some(folder.id), &PageRequest::new("pic2", 10, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let missing = Uuid::new_v4();
        assert_eq!(
            repo.list_media_children(Some(missing)).await,
            Err(RepositoryError::not_found("Media", missing))
        );
    }

    #[tokio::test]
    async fn test_create_under_deleted_parent_is_invalid() {
        let repo = InMemoryRepository::new();
        let parent = repo.create_media(&file("folder"), None).await.unwrap();
        repo.delete_media(parent.id).await.unwrap();

        let result = repo.create_media(&file("late"), Some(parent.id)).await;

        assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_taxonomy_slug_unique_even_after_delete() {
        let repo = InMemoryRepository::new();
        let rust = repo
            .create_taxonomy(&Taxonomy::new("Rust", "rust"), None)
            .await
            .unwrap();
        repo.delete_taxonomy(rust.id).await.unwrap();

        assert_eq!(
            repo.create_taxonomy(&Taxonomy::new("Rust", "rust"), None).await,
            Err(RepositoryError::conflict("Taxonomy", "slug"))
        );
        assert_eq!(repo.get_taxonomy_by_slug("rust").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_taxonomy_move_into_descendant_is_invalid() {
        let repo = InMemoryRepository::new();
        let parent = repo
            .create_taxonomy(&Taxonomy::new("Topics", "topics"), None)
            .await
            .unwrap();
        let child = repo
            .create_taxonomy(&Taxonomy::new("Rust", "rust"), Some(parent.id))
            .await
            .unwrap();

        let result = repo.move_taxonomy(parent.id, Some(child.id)).await;

        assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
        let ancestors = repo.taxonomy_ancestors(child.id).await.unwrap();
        assert_eq!(ancestors.len(), 1);
    }

    #[tokio::test]
    async fn test_settings_upsert_and_delete() {
        let repo = InMemoryRepository::new();
        let original = repo.put_setting(&Setting::new("theme", "dark")).await.unwrap();
        let updated = repo.put_setting(&Setting::new("theme", "light")).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.value, "light");
        assert_eq!(repo.list_settings().await.unwrap().len(), 1);

        repo.delete_setting("theme").await.unwrap();
        assert_eq!(
            repo.delete_setting("theme").await,
            Err(RepositoryError::not_found("Setting", "theme"))
        );
    }
}
