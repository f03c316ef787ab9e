use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placement of a node inside a nested-set tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreePosition {
    pub parent_id: Option<Uuid>,
    pub left: i64,
    pub right: i64,
    pub depth: i64,
}

impl TreePosition {
    /// Position of a root occupying `[left, left + 1]`.
    pub fn root(left: i64) -> Self {
        Self {
            parent_id: None,
            left,
            right: left + 1,
            depth: 0,
        }
    }

    /// Returns true if `other` is a strict descendant of this node.
    pub fn contains(&self, other: &TreePosition) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// Returns true if `other` is this node or one of its descendants.
    pub fn encloses(&self, other: &TreePosition) -> bool {
        self.left <= other.left && other.right <= self.right
    }

    /// Number of interval slots the subtree occupies (`right - left + 1`).
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    /// Number of descendants implied by the interval.
    pub fn descendant_count(&self) -> i64 {
        (self.right - self.left - 1) / 2
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }
}
