//! Nested-set hierarchy model.
//!
//! A tree is encoded as `(left, right)` intervals: a node is an ancestor of
//! another iff its interval strictly contains the other's. The planners in
//! [`planner`] compute every interval shift as a pure value so the SQLite
//! backend (set-based `UPDATE`s) and [`NestedForest`] (in-memory) apply the
//! exact same arithmetic.

mod error;
mod forest;
mod planner;
mod position;
mod validate;

pub use error::HierarchyError;
pub use forest::{NestedForest, TreeNode};
pub use planner::{plan_insert, plan_move, plan_removal, InsertPlan, MovePlan, Shift};
pub use position::TreePosition;
pub use validate::{validate_forest, Violation};
