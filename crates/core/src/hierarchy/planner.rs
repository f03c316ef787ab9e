//! Pure interval arithmetic for structural mutations.
//!
//! Every mutation is described as one or more [`Shift`]s over the live
//! nodes of a tree. Backends apply them verbatim: SQLite turns each shift
//! into two `UPDATE`s, the in-memory forest walks its nodes.

use uuid::Uuid;

use super::{HierarchyError, TreePosition};

/// Moves every `left`/`right` value that is `>= from` by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: i64,
    pub delta: i64,
}

impl Shift {
    pub fn apply(&self, value: i64) -> i64 {
        if value >= self.from {
            value + self.delta
        } else {
            value
        }
    }

    pub fn apply_to(&self, position: &mut TreePosition) {
        position.left = self.apply(position.left);
        position.right = self.apply(position.right);
    }
}

/// Where a new node lands and which gap has to be opened first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPlan {
    pub position: TreePosition,
    /// Applied to every live node before the new one is written. `None` for roots.
    pub shift: Option<Shift>,
}

/// Plans inserting a node as the last child of `parent`, or as a new root.
///
/// `max_right` is the largest `right` among live nodes (0 for an empty tree)
/// and is only consulted for roots.
pub fn plan_insert(parent: Option<(Uuid, &TreePosition)>, max_right: i64) -> InsertPlan {
    match parent {
        Some((parent_id, parent)) => InsertPlan {
            position: TreePosition {
                parent_id: Some(parent_id),
                left: parent.right,
                right: parent.right + 1,
                depth: parent.depth + 1,
            },
            shift: Some(Shift {
                from: parent.right,
                delta: 2,
            }),
        },
        None => InsertPlan {
            position: TreePosition::root(max_right + 1),
            shift: None,
        },
    }
}

/// Plans closing the gap left by soft-deleting the subtree rooted at `node`.
///
/// Ancestors are shifted too (their `right` lies past the gap), so their
/// width keeps matching their live descendant count.
pub fn plan_removal(node: &TreePosition) -> Shift {
    Shift {
        from: node.right + 1,
        delta: -node.width(),
    }
}

/// Relocation of a subtree: close its old gap, open one under the new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    /// Applied to every live node outside the moved subtree.
    pub close: Shift,
    /// Applied after `close` to every live node outside the moved subtree.
    pub open: Option<Shift>,
    /// Added to `left` and `right` of every node inside the moved subtree.
    pub offset: i64,
    /// Added to `depth` of every node inside the moved subtree.
    pub depth_delta: i64,
    /// Final position of the moved subtree's root.
    pub root: TreePosition,
}

impl MovePlan {
    /// Applies the offset and depth delta to a member of the moved subtree.
    pub fn relocate(&self, position: &mut TreePosition) {
        position.left += self.offset;
        position.right += self.offset;
        position.depth += self.depth_delta;
    }
}

/// Plans moving the subtree rooted at `node` to become the last child of
/// `target` (or a new root when `target` is `None`).
///
/// Positions are read before the move. `max_right_outside` is the largest
/// `right` among live nodes that are not part of the moved subtree.
pub fn plan_move(
    node_id: Uuid,
    node: &TreePosition,
    target: Option<(Uuid, &TreePosition)>,
    max_right_outside: i64,
) -> Result<MovePlan, HierarchyError> {
    let width = node.width();
    let close = plan_removal(node);

    let (root, open) = match target {
        Some((target_id, target)) => {
            if target_id == node_id || node.encloses(target) {
                return Err(HierarchyError::MoveIntoOwnSubtree {
                    node: node_id,
                    target: target_id,
                });
            }
            let left = close.apply(target.right);
            let root = TreePosition {
                parent_id: Some(target_id),
                left,
                right: left + width - 1,
                depth: target.depth + 1,
            };
            (
                root,
                Some(Shift {
                    from: left,
                    delta: width,
                }),
            )
        }
        None => {
            let left = close.apply(max_right_outside) + 1;
            let root = TreePosition {
                parent_id: None,
                left,
                right: left + width - 1,
                depth: 0,
            };
            (root, None)
        }
    };

    Ok(MovePlan {
        close,
        open,
        offset: root.left - node.left,
        depth_delta: root.depth - node.depth,
        root,
    })
}
