//! Integrity checks for a nested-set forest.

use uuid::Uuid;

use super::TreePosition;

/// A broken nested-set invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `left` must be positive and strictly less than `right`.
    InvalidInterval { id: Uuid, left: i64, right: i64 },
    /// `right - left` must equal `2 * descendants + 1`.
    WidthMismatch {
        id: Uuid,
        width: i64,
        descendants: i64,
    },
    /// Two intervals cross without one containing the other.
    Overlap { first: Uuid, second: Uuid },
    /// `parent_id` disagrees with the nearest enclosing interval.
    WrongParent {
        id: Uuid,
        expected: Option<Uuid>,
        actual: Option<Uuid>,
    },
    /// A child's depth must be its parent's depth plus one (roots are 0).
    WrongDepth { id: Uuid, expected: i64, actual: i64 },
}

/// Checks containment, sibling disjointness, width and depth of every node.
///
/// Only live nodes should be passed in. Returns every violation found; an
/// empty vector means the forest is consistent.
pub fn validate_forest(nodes: &[(Uuid, TreePosition)]) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut sorted: Vec<&(Uuid, TreePosition)> = nodes.iter().collect();
    sorted.sort_by_key(|(_, p)| p.left);
    let lefts: Vec<i64> = sorted.iter().map(|(_, p)| p.left).collect();

    let mut stack: Vec<&(Uuid, TreePosition)> = Vec::new();
    for entry in &sorted {
        let (id, position) = *entry;
        if position.left < 1 || position.left >= position.right {
            violations.push(Violation::InvalidInterval {
                id: *id,
                left: position.left,
                right: position.right,
            });
            continue;
        }

        let descendants = (lefts.partition_point(|l| *l < position.right)
            - lefts.partition_point(|l| *l <= position.left)) as i64;
        if position.right - position.left != 2 * descendants + 1 {
            violations.push(Violation::WidthMismatch {
                id: *id,
                width: position.right - position.left,
                descendants,
            });
        }

        while stack.last().is_some_and(|(_, top)| top.right < position.left) {
            stack.pop();
        }
        if let Some((top_id, top)) = stack.last() {
            if !top.contains(position) {
                violations.push(Violation::Overlap {
                    first: *top_id,
                    second: *id,
                });
            }
        }

        let parent = stack.iter().rev().find(|(_, p)| p.contains(position));
        let expected_parent = parent.map(|(parent_id, _)| *parent_id);
        if position.parent_id != expected_parent {
            violations.push(Violation::WrongParent {
                id: *id,
                expected: expected_parent,
                actual: position.parent_id,
            });
        }
        let expected_depth = parent.map_or(0, |(_, p)| p.depth + 1);
        if position.depth != expected_depth {
            violations.push(Violation::WrongDepth {
                id: *id,
                expected: expected_depth,
                actual: position.depth,
            });
        }

        stack.push(*entry);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn node(n: u128, parent: Option<u128>, left: i64, right: i64, depth: i64) -> (Uuid, TreePosition) {
        (
            id(n),
            TreePosition {
                parent_id: parent.map(id),
                left,
                right,
                depth,
            },
        )
    }

    #[test]
    fn test_valid_forest() {
        let nodes = vec![
            node(1, None, 1, 6, 0),
            node(2, Some(1), 2, 3, 1),
            node(3, Some(1), 4, 5, 1),
            node(4, None, 7, 8, 0),
        ];
        assert!(validate_forest(&nodes).is_empty());
    }

    #[test]
    fn test_empty_forest_is_valid() {
        assert!(validate_forest(&[]).is_empty());
    }

    #[test]
    fn test_invalid_interval() {
        let nodes = vec![node(1, None, 3, 3, 0)];
        assert_eq!(
            validate_forest(&nodes),
            vec![Violation::InvalidInterval {
                id: id(1),
                left: 3,
                right: 3
            }]
        );
    }

    #[test]
    fn test_width_mismatch_after_unclosed_gap() {
        // Child removed without closing the gap: root is two slots too wide.
        let nodes = vec![node(1, None, 1, 6, 0), node(3, Some(1), 4, 5, 1)];
        assert_eq!(
            validate_forest(&nodes),
            vec![Violation::WidthMismatch {
                id: id(1),
                width: 5,
                descendants: 1
            }]
        );
    }

    #[test]
    fn test_overlapping_siblings() {
        let nodes = vec![
            node(1, None, 1, 8, 0),
            node(2, Some(1), 2, 5, 1),
            node(3, Some(1), 4, 7, 1),
        ];
        let violations = validate_forest(&nodes);
        assert!(violations.contains(&Violation::Overlap {
            first: id(2),
            second: id(3)
        }));
    }

    #[test]
    fn test_wrong_parent_and_depth() {
        let nodes = vec![
            node(1, None, 1, 4, 0),
            node(2, None, 2, 3, 2),
        ];
        assert_eq!(
            validate_forest(&nodes),
            vec![
                Violation::WrongParent {
                    id: id(2),
                    expected: Some(id(1)),
                    actual: None
                },
                Violation::WrongDepth {
                    id: id(2),
                    expected: 1,
                    actual: 2
                },
            ]
        );
    }
}
