//! Media and taxonomy repositories over the nested-set tables.
//!
//! Reads are plain statements. Creates, moves and deletes open an
//! `IMMEDIATE` transaction so that the interval shifts planned in
//! [`super::tree`] are applied by exactly one writer at a time; any error
//! drops the transaction and rolls every shift back.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::TransactionBehavior;
use uuid::Uuid;

use curator_core::pagination::{like_pattern, Page, PageRequest};
use curator_core::records::{Media, Taxonomy};
use curator_core::storage::{MediaRepository, Result, TaxonomyRepository};

use super::conversions::{
    format_datetime, format_json, format_optional_datetime, row_to_media, row_to_taxonomy,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id, wrap_err};
use super::repository::{count, expect_affected, query_all, query_optional, SqliteRepository};
use super::schema;
use super::tree::{MEDIA_TREE, TAXONOMY_TREE};

// ============================================================================
// MediaRepository implementation
// ============================================================================

#[async_trait]
impl MediaRepository for SqliteRepository {
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>> {
        let id_str = id.to_string();

        self.call(move |conn| query_optional(conn, schema::SELECT_MEDIA_BY_ID, [&id_str], row_to_media))
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", id.to_string()))
    }

    async fn get_media_by_hash(&self, hash: &str) -> Result<Option<Media>> {
        let hash = hash.to_string();

        self.call(move |conn| query_optional(conn, schema::SELECT_MEDIA_BY_HASH, [&hash], row_to_media))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Media"))
    }

    async fn get_media_by_file_name(&self, file_name: &str) -> Result<Option<Media>> {
        let file_name = file_name.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_MEDIA_BY_FILE_NAME, [&file_name], row_to_media)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Media"))
    }

    async fn list_media(&self) -> Result<Vec<Media>> {
        self.call(|conn| query_all(conn, schema::SELECT_MEDIA, [], row_to_media))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Media"))
    }

    async fn list_media_paginated(&self, request: &PageRequest) -> Result<Page<Media>> {
        let query = request.query().to_string();
        let like = like_pattern(&query);
        let limit = request.limit();
        let offset = request.offset();

        let (total, media) = self
            .call(move |conn| {
                let total = count(
                    conn,
                    schema::COUNT_MEDIA_MATCHING,
                    rusqlite::params![query, like],
                )?;
                let media = query_all(
                    conn,
                    schema::SELECT_MEDIA_MATCHING,
                    rusqlite::params![query, like, limit, offset],
                    row_to_media,
                )?;
                Ok((total, media))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Media"))?;

        Ok(Page::new(request, total, media))
    }

    async fn list_media_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Media>> {
        let parent = parent_id.map(|id| id.to_string());

        self.call(move |conn| {
            if let Some(parent_id) = parent_id {
                MEDIA_TREE.live_position(conn, parent_id)?;
            }
            query_all(conn, schema::SELECT_MEDIA_CHILDREN, [&parent], row_to_media)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Media"))
    }

    async fn list_media_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Media>> {
        let parent = parent_id.map(|id| id.to_string());
        let query = request.query().to_string();
        let like = like_pattern(&query);
        let limit = request.limit();
        let offset = request.offset();

        let (total, media) = self
            .call(move |conn| {
                if let Some(parent_id) = parent_id {
                    MEDIA_TREE.live_position(conn, parent_id)?;
                }
                let total = count(
                    conn,
                    schema::COUNT_MEDIA_CHILDREN_MATCHING,
                    rusqlite::params![parent, query, like],
                )?;
                let media = query_all(
                    conn,
                    schema::SELECT_MEDIA_CHILDREN_MATCHING,
                    rusqlite::params![parent, query, like, limit, offset],
                    row_to_media,
                )?;
                Ok((total, media))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Media"))?;

        Ok(Page::new(request, total, media))
    }

    async fn create_media(&self, media: &Media, parent_id: Option<Uuid>) -> Result<Media> {
        let mut created = media.clone();
        let id = media.id.to_string();
        let parent = parent_id.map(|id| id.to_string());
        let name = media.name.clone();
        let hash = media.hash.clone();
        let file_name = media.file_name.clone();
        let disk = media.disk.clone();
        let mime_type = media.mime_type.clone();
        let size = media.size;
        let custom_attributes = format_json(media.custom_attributes.as_ref())?;
        let ordering = media.record_ordering;
        let created_at = format_datetime(&media.created_at);
        let updated_at = format_datetime(&media.updated_at);
        let deleted_at = format_optional_datetime(media.deleted_at.as_ref());
        let media_id = media.id.to_string();

        let position = self
            .write(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let position = MEDIA_TREE.make_room(&tx, parent_id)?;
                tx.execute(
                    schema::INSERT_MEDIA,
                    rusqlite::params![
                        id,
                        parent,
                        name,
                        hash,
                        file_name,
                        disk,
                        mime_type,
                        size,
                        custom_attributes,
                        position.left,
                        position.right,
                        position.depth,
                        ordering,
                        created_at,
                        updated_at,
                        deleted_at
                    ],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(position)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", media_id))?;

        created.position = position;
        Ok(created)
    }

    async fn update_media(&self, media: &Media) -> Result<()> {
        let id = media.id.to_string();
        let name = media.name.clone();
        let hash = media.hash.clone();
        let file_name = media.file_name.clone();
        let disk = media.disk.clone();
        let mime_type = media.mime_type.clone();
        let size = media.size;
        let custom_attributes = format_json(media.custom_attributes.as_ref())?;
        let ordering = media.record_ordering;
        let updated_at = format_datetime(&media.updated_at);
        let media_id = media.id.to_string();

        self.write(move |conn| {
            let rows = conn
                .execute(
                    schema::UPDATE_MEDIA,
                    rusqlite::params![
                        id,
                        name,
                        hash,
                        file_name,
                        disk,
                        mime_type,
                        size,
                        custom_attributes,
                        ordering,
                        updated_at
                    ],
                )
                .map_err(wrap_err)?;
            expect_affected(rows)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", media_id))
    }

    async fn move_media(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Media> {
        let updated_at = format_datetime(&Utc::now());

        self.write(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(wrap_err)?;
            MEDIA_TREE.relocate(&tx, id, new_parent, &updated_at)?;
            let moved = tx
                .query_row(schema::SELECT_MEDIA_BY_ID, [id.to_string()], row_to_media)
                .map_err(wrap_err)?;
            tx.commit().map_err(wrap_err)?;
            Ok(moved)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", id.to_string()))
    }

    async fn delete_media(&self, id: Uuid) -> Result<()> {
        let deleted_at = format_datetime(&Utc::now());

        let removed = self
            .write(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let removed = MEDIA_TREE.remove(&tx, id, &deleted_at)?;
                tx.commit().map_err(wrap_err)?;
                Ok(removed)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", id.to_string()))?;

        tracing::debug!(media_id = %id, removed, "Media subtree deleted");
        Ok(())
    }

    async fn media_subtree(&self, id: Uuid) -> Result<Vec<Media>> {
        self.call(move |conn| {
            let root = MEDIA_TREE.live_position(conn, id)?;
            query_all(
                conn,
                schema::SELECT_MEDIA_SUBTREE,
                [root.left, root.right],
                row_to_media,
            )
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", id.to_string()))
    }

    async fn media_ancestors(&self, id: Uuid) -> Result<Vec<Media>> {
        self.call(move |conn| {
            let node = MEDIA_TREE.live_position(conn, id)?;
            query_all(
                conn,
                schema::SELECT_MEDIA_ANCESTORS,
                [node.left, node.right],
                row_to_media,
            )
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Media", id.to_string()))
    }
}

// ============================================================================
// TaxonomyRepository implementation
// ============================================================================

#[async_trait]
impl TaxonomyRepository for SqliteRepository {
    async fn get_taxonomy(&self, id: Uuid) -> Result<Option<Taxonomy>> {
        let id_str = id.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_TAXONOMY_BY_ID, [&id_str], row_to_taxonomy)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", id.to_string()))
    }

    async fn get_taxonomy_by_slug(&self, slug: &str) -> Result<Option<Taxonomy>> {
        let slug = slug.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_TAXONOMY_BY_SLUG, [&slug], row_to_taxonomy)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Taxonomy"))
    }

    async fn list_taxonomies(&self) -> Result<Vec<Taxonomy>> {
        self.call(|conn| query_all(conn, schema::SELECT_TAXONOMIES, [], row_to_taxonomy))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Taxonomy"))
    }

    async fn list_taxonomies_paginated(&self, request: &PageRequest) -> Result<Page<Taxonomy>> {
        let query = request.query().to_string();
        let like = like_pattern(&query);
        let limit = request.limit();
        let offset = request.offset();

        let (total, taxonomies) = self
            .call(move |conn| {
                let total = count(
                    conn,
                    schema::COUNT_TAXONOMIES_MATCHING,
                    rusqlite::params![query, like],
                )?;
                let taxonomies = query_all(
                    conn,
                    schema::SELECT_TAXONOMIES_MATCHING,
                    rusqlite::params![query, like, limit, offset],
                    row_to_taxonomy,
                )?;
                Ok((total, taxonomies))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Taxonomy"))?;

        Ok(Page::new(request, total, taxonomies))
    }

    async fn list_taxonomy_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Taxonomy>> {
        let parent = parent_id.map(|id| id.to_string());

        self.call(move |conn| {
            if let Some(parent_id) = parent_id {
                TAXONOMY_TREE.live_position(conn, parent_id)?;
            }
            query_all(conn, schema::SELECT_TAXONOMY_CHILDREN, [&parent], row_to_taxonomy)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Taxonomy"))
    }

    async fn list_taxonomy_children_paginated(
        &self,
        parent_id: Option<Uuid>,
        request: &PageRequest,
    ) -> Result<Page<Taxonomy>> {
        let parent = parent_id.map(|id| id.to_string());
        let query = request.query().to_string();
        let like = like_pattern(&query);
        let limit = request.limit();
        let offset = request.offset();

        let (total, taxonomies) = self
            .call(move |conn| {
                if let Some(parent_id) = parent_id {
                    TAXONOMY_TREE.live_position(conn, parent_id)?;
                }
                let total = count(
                    conn,
                    schema::COUNT_TAXONOMY_CHILDREN_MATCHING,
                    rusqlite::params![parent, query, like],
                )?;
                let taxonomies = query_all(
                    conn,
                    schema::SELECT_TAXONOMY_CHILDREN_MATCHING,
                    rusqlite::params![parent, query, like, limit, offset],
                    row_to_taxonomy,
                )?;
                Ok((total, taxonomies))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Taxonomy"))?;

        Ok(Page::new(request, total, taxonomies))
    }

    async fn create_taxonomy(
        &self,
        taxonomy: &Taxonomy,
        parent_id: Option<Uuid>,
    ) -> Result<Taxonomy> {
        let mut created = taxonomy.clone();
        let id = taxonomy.id.to_string();
        let parent = parent_id.map(|id| id.to_string());
        let name = taxonomy.name.clone();
        let slug = taxonomy.slug.clone();
        let code = taxonomy.code.clone();
        let description = taxonomy.description.clone();
        let ordering = taxonomy.record_ordering;
        let created_at = format_datetime(&taxonomy.created_at);
        let updated_at = format_datetime(&taxonomy.updated_at);
        let deleted_at = format_optional_datetime(taxonomy.deleted_at.as_ref());
        let taxonomy_id = taxonomy.id.to_string();

        let position = self
            .write(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let position = TAXONOMY_TREE.make_room(&tx, parent_id)?;
                tx.execute(
                    schema::INSERT_TAXONOMY,
                    rusqlite::params![
                        id,
                        parent,
                        name,
                        slug,
                        code,
                        description,
                        position.left,
                        position.right,
                        position.depth,
                        ordering,
                        created_at,
                        updated_at,
                        deleted_at
                    ],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(position)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", taxonomy_id))?;

        created.position = position;
        Ok(created)
    }

    async fn update_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()> {
        let id = taxonomy.id.to_string();
        let name = taxonomy.name.clone();
        let slug = taxonomy.slug.clone();
        let code = taxonomy.code.clone();
        let description = taxonomy.description.clone();
        let ordering = taxonomy.record_ordering;
        let updated_at = format_datetime(&taxonomy.updated_at);
        let taxonomy_id = taxonomy.id.to_string();

        self.write(move |conn| {
            let rows = conn
                .execute(
                    schema::UPDATE_TAXONOMY,
                    rusqlite::params![id, name, slug, code, description, ordering, updated_at],
                )
                .map_err(wrap_err)?;
            expect_affected(rows)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", taxonomy_id))
    }

    async fn move_taxonomy(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Taxonomy> {
        let updated_at = format_datetime(&Utc::now());

        self.write(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(wrap_err)?;
            TAXONOMY_TREE.relocate(&tx, id, new_parent, &updated_at)?;
            let moved = tx
                .query_row(schema::SELECT_TAXONOMY_BY_ID, [id.to_string()], row_to_taxonomy)
                .map_err(wrap_err)?;
            tx.commit().map_err(wrap_err)?;
            Ok(moved)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", id.to_string()))
    }

    async fn delete_taxonomy(&self, id: Uuid) -> Result<()> {
        let deleted_at = format_datetime(&Utc::now());

        let removed = self
            .write(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let removed = TAXONOMY_TREE.remove(&tx, id, &deleted_at)?;
                tx.commit().map_err(wrap_err)?;
                Ok(removed)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", id.to_string()))?;

        tracing::debug!(taxonomy_id = %id, removed, "Taxonomy subtree deleted");
        Ok(())
    }

    async fn taxonomy_subtree(&self, id: Uuid) -> Result<Vec<Taxonomy>> {
        self.call(move |conn| {
            let root = TAXONOMY_TREE.live_position(conn, id)?;
            query_all(
                conn,
                schema::SELECT_TAXONOMY_SUBTREE,
                [root.left, root.right],
                row_to_taxonomy,
            )
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", id.to_string()))
    }

    async fn taxonomy_ancestors(&self, id: Uuid) -> Result<Vec<Taxonomy>> {
        self.call(move |conn| {
            let node = TAXONOMY_TREE.live_position(conn, id)?;
            query_all(
                conn,
                schema::SELECT_TAXONOMY_ANCESTORS,
                [node.left, node.right],
                row_to_taxonomy,
            )
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Taxonomy", id.to_string()))
    }
}
