use thiserror::Error;
use uuid::Uuid;

/// Rejections raised by structural mutations on a nested-set tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),
    #[error("Parent not found: {0}")]
    ParentNotFound(Uuid),
    #[error("Parent is deleted: {0}")]
    ParentDeleted(Uuid),
    #[error("Cannot move {node} under itself or one of its descendants ({target})")]
    MoveIntoOwnSubtree { node: Uuid, target: Uuid },
}
