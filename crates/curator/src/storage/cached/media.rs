//! Cached media repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use curator_core::cache::{media_item_key, media_item_pattern, MEDIA_LIST_KEY};
use curator_core::pagination::{Page, PageRequest};
use curator_core::records::Media;
use curator_core::storage::{MediaRepository, Result};

use super::{may_have_written, remember_decoded};
use crate::cache::CacheAside;

/// Cached media repository decorator.
///
/// Inserts, moves and deletes renumber other nodes' intervals, so they drop
/// every `media:*` key. Updates only touch their own item.
pub struct CachedMediaRepository<R>
where
    R: MediaRepository,
{
    repository: Arc<R>,
    cache: Arc<CacheAside>,
    ttl: Duration,
}

impl<R> CachedMediaRepository<R>
where
    R: MediaRepository,
{
    pub fn new(repository: Arc<R>, cache: Arc<CacheAside>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    async fn invalidate_tree(&self) {
        self.cache.remove(MEDIA_LIST_KEY).await;
        self.cache.remove_pattern(media_item_pattern()).await;
    }
}

#[async_trait]
impl<R> MediaRepository for CachedMediaRepository<R>
where
    R: MediaRepository + 'static,
{
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, &media_item_key(id), self.ttl, || {
            repository.get_media(id)
        })
        .await
    }

    async fn get_media_by_hash(&self, hash: &str) -> Result<Option<Media>> {
        self.repository.get_media_by_hash(hash).await
    }

    async fn get_media_by_file_name(&self, file_name: &str) -> Result<Option<Media>> {
        self.repository.get_media_by_file_name(file_name).await
    }

    async fn list_media(&self) -> Result<Vec<Media>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, MEDIA_LIST_KEY, self.ttl, || repository.list_media()).await
    }

    async fn list_media_paginated(&self, request: &PageRequest) -> Result<Page<Media>> {
        self.repository.list_media_paginated(request).await
    }

    async fn list_media_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Media>> {
        self.repository.list_media_children(parent_id).await
    }

    async fn list_media_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Media>> {
        self.repository
            .list_media_children_paginated(parent_id, request)
            .await
    }

    async fn create_media(&self, media: &Media, parent_id: Option<Uuid>) -> Result<Media> {
        let result = self.repository.create_media(media, parent_id).await;
        if may_have_written(&result) {
            self.invalidate_tree().await;
        }
        let created = result?;
        tracing::debug!(media_id = %created.id, "Media created, cache invalidated");
        Ok(created)
    }

    async fn update_media(&self, media: &Media) -> Result<()> {
        let result = self.repository.update_media(media).await;
        if may_have_written(&result) {
            self.cache.remove(MEDIA_LIST_KEY).await;
            self.cache.remove(&media_item_key(media.id)).await;
        }
        result?;
        tracing::debug!(media_id = %media.id, "Media updated, cache invalidated");
        Ok(())
    }

    async fn move_media(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Media> {
        let result = self.repository.move_media(id, new_parent).await;
        if may_have_written(&result) {
            self.invalidate_tree().await;
        }
        let moved = result?;
        tracing::debug!(media_id = %id, "Media moved, cache invalidated");
        Ok(moved)
    }

    async fn delete_media(&self, id: Uuid) -> Result<()> {
        let result = self.repository.delete_media(id).await;
        if may_have_written(&result) {
            self.invalidate_tree().await;
        }
        result?;
        tracing::debug!(media_id = %id, "Media deleted, cache invalidated");
        Ok(())
    }

    async fn media_subtree(&self, id: Uuid) -> Result<Vec<Media>> {
        self.repository.media_subtree(id).await
    }

    async fn media_ancestors(&self, id: Uuid) -> Result<Vec<Media>> {
        self.repository.media_ancestors(id).await
    }
}
