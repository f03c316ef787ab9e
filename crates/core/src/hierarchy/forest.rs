use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{plan_insert, plan_move, plan_removal, HierarchyError, TreePosition};

/// A record that carries a nested-set position.
pub trait TreeNode {
    fn id(&self) -> Uuid;
    fn position(&self) -> &TreePosition;
    fn position_mut(&mut self) -> &mut TreePosition;
    fn is_deleted(&self) -> bool;
    fn mark_deleted(&mut self, at: DateTime<Utc>);

    /// Optional sibling sort key, independent of the interval.
    fn ordering(&self) -> Option<i64> {
        None
    }
}

/// An in-memory nested-set forest.
///
/// Nodes are kept in insertion order, soft-deleted ones included, so list
/// order matches a table scan by row id.
#[derive(Debug, Clone)]
pub struct NestedForest<T> {
    nodes: Vec<T>,
}

impl<T: TreeNode> Default for NestedForest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TreeNode> NestedForest<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_deleted()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets a live node.
    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.get_any(id).filter(|n| !n.is_deleted())
    }

    /// Gets a node whether or not it is soft-deleted.
    pub fn get_any(&self, id: Uuid) -> Option<&T> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Every node, soft-deleted ones included, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter()
    }

    /// Mutable access to a live node's attributes.
    ///
    /// Callers must not touch the position; use [`NestedForest::move_node`].
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.nodes
            .iter_mut()
            .find(|n| n.id() == id && !n.is_deleted())
    }

    /// Live nodes in listing order: by `ordering` (unset last), then insertion order.
    pub fn live(&self) -> Vec<&T> {
        sorted_for_listing(self.nodes.iter().filter(|n| !n.is_deleted()).collect())
    }

    /// Live direct children of `parent_id` (roots when `None`) in listing order.
    pub fn children(&self, parent_id: Option<Uuid>) -> Vec<&T> {
        sorted_for_listing(
            self.nodes
                .iter()
                .filter(|n| !n.is_deleted() && n.position().parent_id == parent_id)
                .collect(),
        )
    }

    /// The live subtree rooted at `id` (the node included) in pre-order.
    pub fn subtree(&self, id: Uuid) -> Result<Vec<&T>, HierarchyError> {
        let root = *self
            .get(id)
            .ok_or(HierarchyError::NodeNotFound(id))?
            .position();
        let mut nodes: Vec<&T> = self
            .nodes
            .iter()
            .filter(|n| !n.is_deleted() && root.encloses(n.position()))
            .collect();
        nodes.sort_by_key(|n| n.position().left);
        Ok(nodes)
    }

    /// The live ancestors of `id`, root first, parent last.
    pub fn ancestors(&self, id: Uuid) -> Result<Vec<&T>, HierarchyError> {
        let node = *self
            .get(id)
            .ok_or(HierarchyError::NodeNotFound(id))?
            .position();
        let mut nodes: Vec<&T> = self
            .nodes
            .iter()
            .filter(|n| !n.is_deleted() && n.position().contains(&node))
            .collect();
        nodes.sort_by_key(|n| n.position().left);
        Ok(nodes)
    }

    /// `(id, position)` of every live node, for [`super::validate_forest`].
    pub fn positions(&self) -> Vec<(Uuid, TreePosition)> {
        self.nodes
            .iter()
            .filter(|n| !n.is_deleted())
            .map(|n| (n.id(), *n.position()))
            .collect()
    }

    /// Inserts `node` as the last child of `parent_id`, or as a new root.
    ///
    /// The node's incoming position is overwritten.
    pub fn insert(
        &mut self,
        mut node: T,
        parent_id: Option<Uuid>,
    ) -> Result<TreePosition, HierarchyError> {
        let parent = match parent_id {
            Some(parent_id) => Some((parent_id, self.live_parent(parent_id)?)),
            None => None,
        };
        let plan = plan_insert(
            parent.as_ref().map(|(id, position)| (*id, position)),
            self.max_right(|_| false),
        );

        if let Some(shift) = plan.shift {
            for existing in self.nodes.iter_mut().filter(|n| !n.is_deleted()) {
                shift.apply_to(existing.position_mut());
            }
        }

        *node.position_mut() = plan.position;
        self.nodes.push(node);
        Ok(plan.position)
    }

    /// Soft-deletes the subtree rooted at `id` and closes its gap.
    ///
    /// Returns how many nodes were deleted; an already deleted node yields 0.
    pub fn remove(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<usize, HierarchyError> {
        let node = self.get_any(id).ok_or(HierarchyError::NodeNotFound(id))?;
        if node.is_deleted() {
            return Ok(0);
        }
        let position = *node.position();

        let mut removed = 0;
        for member in self
            .nodes
            .iter_mut()
            .filter(|n| !n.is_deleted() && position.encloses(n.position()))
        {
            member.mark_deleted(at);
            removed += 1;
        }

        let shift = plan_removal(&position);
        for remaining in self.nodes.iter_mut().filter(|n| !n.is_deleted()) {
            shift.apply_to(remaining.position_mut());
        }

        Ok(removed)
    }

    /// Moves the subtree rooted at `id` to be the last child of `new_parent`
    /// (or a new root), keeping its internal shape.
    pub fn move_node(
        &mut self,
        id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<TreePosition, HierarchyError> {
        let position = *self
            .get(id)
            .ok_or(HierarchyError::NodeNotFound(id))?
            .position();
        let target = match new_parent {
            Some(parent_id) => Some((parent_id, self.live_parent(parent_id)?)),
            None => None,
        };

        let moved: HashSet<Uuid> = self
            .nodes
            .iter()
            .filter(|n| !n.is_deleted() && position.encloses(n.position()))
            .map(|n| n.id())
            .collect();
        let max_right_outside = self.max_right(|n| moved.contains(&n.id()));

        let plan = plan_move(
            id,
            &position,
            target.as_ref().map(|(id, position)| (*id, position)),
            max_right_outside,
        )?;

        for node in self.nodes.iter_mut().filter(|n| !n.is_deleted()) {
            let node_id = node.id();
            let position = node.position_mut();
            if moved.contains(&node_id) {
                plan.relocate(position);
            } else {
                plan.close.apply_to(position);
                if let Some(open) = plan.open {
                    open.apply_to(position);
                }
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.position_mut().parent_id = plan.root.parent_id;
        }

        Ok(plan.root)
    }

    fn live_parent(&self, parent_id: Uuid) -> Result<TreePosition, HierarchyError> {
        match self.get_any(parent_id) {
            None => Err(HierarchyError::ParentNotFound(parent_id)),
            Some(parent) if parent.is_deleted() => Err(HierarchyError::ParentDeleted(parent_id)),
            Some(parent) => Ok(*parent.position()),
        }
    }

    fn max_right(&self, skip: impl Fn(&T) -> bool) -> i64 {
        self.nodes
            .iter()
            .filter(|n| !n.is_deleted() && !skip(*n))
            .map(|n| n.position().right)
            .max()
            .unwrap_or(0)
    }
}

fn sorted_for_listing<T: TreeNode>(mut nodes: Vec<&T>) -> Vec<&T> {
    // Stable sort keeps insertion order among equal keys.
    nodes.sort_by_key(|n| (n.ordering().is_none(), n.ordering()));
    nodes
}
