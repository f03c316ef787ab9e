//! Nested-set structural statements shared by the `media` and `taxonomies` tables.
//!
//! Every function here expects to run inside an `IMMEDIATE` transaction
//! opened by the caller: the interval shifts touch many rows and must
//! commit or roll back as one unit. Interval arithmetic comes from
//! `curator_core::hierarchy`; this module only turns it into `UPDATE`s.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use curator_core::hierarchy::{
    plan_insert, plan_move, plan_removal, HierarchyError, MovePlan, Shift, TreePosition,
};
use curator_core::storage::RepositoryError;

use super::error::{domain_err, wrap_err};

/// A table carrying `parent_id`, `record_left`, `record_right`, `record_depth`
/// and `deleted_at` columns.
#[derive(Debug, Clone, Copy)]
pub struct TreeTable {
    pub table: &'static str,
    pub entity: &'static str,
}

pub const MEDIA_TREE: TreeTable = TreeTable {
    table: "media",
    entity: "Media",
};

pub const TAXONOMY_TREE: TreeTable = TreeTable {
    table: "taxonomies",
    entity: "Taxonomy",
};

/// A row's position plus whether it is soft-deleted.
struct StoredNode {
    position: TreePosition,
    deleted: bool,
}

impl TreeTable {
    fn hierarchy_err(&self, err: HierarchyError) -> tokio_rusqlite::Error {
        domain_err(RepositoryError::from_hierarchy(self.entity, err))
    }

    fn lookup(&self, conn: &Connection, id: Uuid) -> tokio_rusqlite::Result<Option<StoredNode>> {
        let sql = format!(
            "SELECT parent_id, record_left, record_right, record_depth, deleted_at \
             FROM {} WHERE id = ?1",
            self.table
        );
        let row = conn
            .query_row(&sql, [id.to_string()], |row| {
                let parent_id: Option<String> = row.get(0)?;
                let deleted_at: Option<String> = row.get(4)?;
                Ok((
                    parent_id,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    deleted_at.is_some(),
                ))
            })
            .optional()
            .map_err(wrap_err)?;

        let Some((parent_id, left, right, depth, deleted)) = row else {
            return Ok(None);
        };
        let parent_id = match parent_id {
            Some(raw) => Some(Uuid::parse_str(&raw).map_err(|e| {
                domain_err(RepositoryError::QueryFailed(format!(
                    "corrupt parent_id in {}: {e}",
                    self.table
                )))
            })?),
            None => None,
        };

        Ok(Some(StoredNode {
            position: TreePosition {
                parent_id,
                left,
                right,
                depth,
            },
            deleted,
        }))
    }

    /// Position of a live node, or NotFound.
    pub fn live_position(&self, conn: &Connection, id: Uuid) -> tokio_rusqlite::Result<TreePosition> {
        match self.lookup(conn, id)? {
            Some(node) if !node.deleted => Ok(node.position),
            _ => Err(self.hierarchy_err(HierarchyError::NodeNotFound(id))),
        }
    }

    fn live_parent(&self, conn: &Connection, parent_id: Uuid) -> tokio_rusqlite::Result<TreePosition> {
        match self.lookup(conn, parent_id)? {
            None => Err(self.hierarchy_err(HierarchyError::ParentNotFound(parent_id))),
            Some(node) if node.deleted => {
                Err(self.hierarchy_err(HierarchyError::ParentDeleted(parent_id)))
            }
            Some(node) => Ok(node.position),
        }
    }

    /// Largest live `record_right`, optionally ignoring the subtree `[left, right]`.
    fn max_right(&self, conn: &Connection, excluding: Option<&TreePosition>) -> tokio_rusqlite::Result<i64> {
        let result = match excluding {
            None => conn.query_row(
                &format!(
                    "SELECT COALESCE(MAX(record_right), 0) FROM {} WHERE deleted_at IS NULL",
                    self.table
                ),
                [],
                |row| row.get(0),
            ),
            Some(subtree) => conn.query_row(
                &format!(
                    "SELECT COALESCE(MAX(record_right), 0) FROM {} \
                     WHERE deleted_at IS NULL AND NOT (record_left >= ?1 AND record_right <= ?2)",
                    self.table
                ),
                params![subtree.left, subtree.right],
                |row| row.get(0),
            ),
        };
        result.map_err(wrap_err)
    }

    fn apply_shift(&self, conn: &Connection, shift: Shift) -> tokio_rusqlite::Result<()> {
        for column in ["record_left", "record_right"] {
            conn.execute(
                &format!(
                    "UPDATE {table} SET {column} = {column} + ?2 \
                     WHERE deleted_at IS NULL AND {column} >= ?1",
                    table = self.table
                ),
                params![shift.from, shift.delta],
            )
            .map_err(wrap_err)?;
        }
        Ok(())
    }

    /// Opens a gap for a new node under `parent_id` (or after the last root)
    /// and returns the position the caller must insert it at.
    pub fn make_room(&self, conn: &Connection, parent_id: Option<Uuid>) -> tokio_rusqlite::Result<TreePosition> {
        let parent = match parent_id {
            Some(id) => Some((id, self.live_parent(conn, id)?)),
            None => None,
        };
        let max_right = self.max_right(conn, None)?;
        let plan = plan_insert(parent.as_ref().map(|(id, p)| (*id, p)), max_right);

        if let Some(shift) = plan.shift {
            self.apply_shift(conn, shift)?;
        }
        Ok(plan.position)
    }

    /// Soft-deletes the subtree rooted at `id` and closes its gap.
    ///
    /// Returns the number of rows marked deleted; 0 when `id` already was.
    pub fn remove(&self, conn: &Connection, id: Uuid, deleted_at: &str) -> tokio_rusqlite::Result<usize> {
        let node = match self.lookup(conn, id)? {
            None => return Err(self.hierarchy_err(HierarchyError::NodeNotFound(id))),
            Some(node) if node.deleted => return Ok(0),
            Some(node) => node.position,
        };

        let removed = conn
            .execute(
                &format!(
                    "UPDATE {} SET deleted_at = ?3, updated_at = ?3 \
                     WHERE deleted_at IS NULL AND record_left >= ?1 AND record_right <= ?2",
                    self.table
                ),
                params![node.left, node.right, deleted_at],
            )
            .map_err(wrap_err)?;

        self.apply_shift(conn, plan_removal(&node))?;
        Ok(removed)
    }

    /// Moves the subtree rooted at `id` under `new_parent` (or to the roots).
    ///
    /// The subtree is first parked at negated intervals so the gap-closing
    /// and gap-opening shifts only see the rest of the tree.
    pub fn relocate(
        &self,
        conn: &Connection,
        id: Uuid,
        new_parent: Option<Uuid>,
        updated_at: &str,
    ) -> tokio_rusqlite::Result<TreePosition> {
        let node = self.live_position(conn, id)?;
        let target = match new_parent {
            Some(parent_id) => Some((parent_id, self.live_parent(conn, parent_id)?)),
            None => None,
        };
        let max_right_outside = self.max_right(conn, Some(&node))?;

        let plan: MovePlan = plan_move(
            id,
            &node,
            target.as_ref().map(|(id, p)| (*id, p)),
            max_right_outside,
        )
        .map_err(|e| self.hierarchy_err(e))?;

        conn.execute(
            &format!(
                "UPDATE {} SET record_left = -record_left, record_right = -record_right \
                 WHERE deleted_at IS NULL AND record_left >= ?1 AND record_right <= ?2",
                self.table
            ),
            params![node.left, node.right],
        )
        .map_err(wrap_err)?;

        self.apply_shift(conn, plan.close)?;
        if let Some(open) = plan.open {
            self.apply_shift(conn, open)?;
        }

        conn.execute(
            &format!(
                "UPDATE {} SET record_left = -record_left + ?1, record_right = -record_right + ?1, \
                 record_depth = record_depth + ?2 \
                 WHERE deleted_at IS NULL AND record_left < 0",
                self.table
            ),
            params![plan.offset, plan.depth_delta],
        )
        .map_err(wrap_err)?;

        conn.execute(
            &format!(
                "UPDATE {} SET parent_id = ?2, updated_at = ?3 WHERE id = ?1",
                self.table
            ),
            params![
                id.to_string(),
                plan.root.parent_id.map(|p| p.to_string()),
                updated_at
            ],
        )
        .map_err(wrap_err)?;

        Ok(plan.root)
    }

    /// `(id, position)` of every live node, for invariant checks.
    #[cfg(test)]
    pub fn live_positions(&self, conn: &Connection) -> rusqlite::Result<Vec<(Uuid, TreePosition)>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, parent_id, record_left, record_right, record_depth \
             FROM {} WHERE deleted_at IS NULL",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let parent_id: Option<String> = row.get(1)?;
            Ok((
                id,
                parent_id,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut positions = Vec::new();
        for row in rows {
            let (id, parent_id, left, right, depth) = row?;
            let id = Uuid::parse_str(&id).unwrap_or_default();
            let parent_id = parent_id.and_then(|p| Uuid::parse_str(&p).ok());
            positions.push((
                id,
                TreePosition {
                    parent_id,
                    left,
                    right,
                    depth,
                },
            ));
        }
        Ok(positions)
    }
}
