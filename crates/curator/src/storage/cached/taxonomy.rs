//! Cached taxonomy repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use curator_core::cache::{taxonomy_item_key, taxonomy_item_pattern, TAXONOMIES_LIST_KEY};
use curator_core::pagination::{Page, PageRequest};
use curator_core::records::Taxonomy;
use curator_core::storage::{Result, TaxonomyRepository};

use super::{may_have_written, remember_decoded};
use crate::cache::CacheAside;

/// Cached taxonomy repository decorator. Same invalidation rules as
/// [`super::CachedMediaRepository`].
pub struct CachedTaxonomyRepository<R>
where
    R: TaxonomyRepository,
{
    repository: Arc<R>,
    cache: Arc<CacheAside>,
    ttl: Duration,
}

impl<R> CachedTaxonomyRepository<R>
where
    R: TaxonomyRepository,
{
    pub fn new(repository: Arc<R>, cache: Arc<CacheAside>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    async fn invalidate_tree(&self) {
        self.cache.remove(TAXONOMIES_LIST_KEY).await;
        self.cache.remove_pattern(taxonomy_item_pattern()).await;
    }
}

#[async_trait]
impl<R> TaxonomyRepository for CachedTaxonomyRepository<R>
where
    R: TaxonomyRepository + 'static,
{
    async fn get_taxonomy(&self, id: Uuid) -> Result<Option<Taxonomy>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, &taxonomy_item_key(id), self.ttl, || {
            repository.get_taxonomy(id)
        })
        .await
    }

    async fn get_taxonomy_by_slug(&self, slug: &str) -> Result<Option<Taxonomy>> {
        self.repository.get_taxonomy_by_slug(slug).await
    }

    async fn list_taxonomies(&self) -> Result<Vec<Taxonomy>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, TAXONOMIES_LIST_KEY, self.ttl, || {
            repository.list_taxonomies()
        })
        .await
    }

    async fn list_taxonomies_paginated(&self, request: &PageRequest) -> Result<Page<Taxonomy>> {
        self.repository.list_taxonomies_paginated(request).await
    }

    async fn list_taxonomy_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Taxonomy>> {
        self.repository.list_taxonomy_children(parent_id).await
    }

    async fn list_taxonomy_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Taxonomy>> {
        self.repository
            .list_taxonomy_children_paginated(parent_id, request)
            .await
    }

    async fn create_taxonomy(
        &self,
        taxonomy: &Taxonomy,
        parent_id: Option<Uuid>,
    ) -> Result<Taxonomy> {
        let result = self.repository.create_taxonomy(taxonomy, parent_id).await;
        if may_have_written(&result) {
            self.invalidate_tree().await;
        }
        let created = result?;
        tracing::debug!(taxonomy_id = %created.id, slug = %created.slug, "Taxonomy created, cache invalidated");
        Ok(created)
    }

    async fn update_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()> {
        let result = self.repository.update_taxonomy(taxonomy).await;
        if may_have_written(&result) {
            self.cache.remove(TAXONOMIES_LIST_KEY).await;
            self.cache.remove(&taxonomy_item_key(taxonomy.id)).await;
        }
        result?;
        tracing::debug!(taxonomy_id = %taxonomy.id, "Taxonomy updated, cache invalidated");
        Ok(())
    }

    async fn move_taxonomy(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Taxonomy> {
        let result = self.repository.move_taxonomy(id, new_parent).await;
        if may_have_written(&result) {
            self.invalidate_tree().await;
        }
        let moved = result?;
        tracing::debug!(taxonomy_id = %id, "Taxonomy moved, cache invalidated");
        Ok(moved)
    }

    async fn delete_taxonomy(&self, id: Uuid) -> Result<()> {
        let result = self.repository.delete_taxonomy(id).await;
        if may_have_written(&result) {
            self.invalidate_tree().await;
        }
        result?;
        tracing::debug!(taxonomy_id = %id, "Taxonomy deleted, cache invalidated");
        Ok(())
    }

    async fn taxonomy_subtree(&self, id: Uuid) -> Result<Vec<Taxonomy>> {
        self.repository.taxonomy_subtree(id).await
    }

    async fn taxonomy_ancestors(&self, id: Uuid) -> Result<Vec<Taxonomy>> {
        self.repository.taxonomy_ancestors(id).await
    }
}
