//! Pre-flight checks run before allocation.

use crate::error::ValidationIssue;
use crate::model::{Constraint, ConstraintKind, Individual, IndividualId};
use std::collections::HashSet;

/// Checks already-built constraints against the roster.
///
/// Disabled constraints are not checked. Block ids missing from the roster
/// are fine (blocks usually cover seats of absent people too); co-location
/// and separation ids must be on the roster. A co-location cluster may
/// hold at most `ceil(roster / group_count)` members. Allocation should
/// only be attempted once this returns an empty list.
pub fn validate_constraints(
    roster: &[Individual],
    group_count: usize,
    constraints: &[Constraint],
) -> Vec<ValidationIssue> {
    let known: HashSet<IndividualId> = roster.iter().map(|i| i.id).collect();
    let capacity = roster.len().div_ceil(group_count.max(1));
    let mut issues = Vec::new();

    for constraint in constraints.iter().filter(|c| c.is_enabled()) {
        let kind = constraint.kind();
        if !matches!(kind, ConstraintKind::CoLocation | ConstraintKind::Separation) {
            continue;
        }

        for (i, ids) in constraint.clusters().iter().enumerate() {
            let cluster = i + 1;
            let mut seen: HashSet<IndividualId> = HashSet::new();
            let mut duplicate = false;

            for &id in ids {
                if !seen.insert(id) {
                    issues.push(ValidationIssue::DuplicateId { kind, cluster, id });
                    duplicate = true;
                    break;
                }
                if !known.contains(&id) {
                    issues.push(ValidationIssue::UnknownId { kind, cluster, id });
                }
            }
            if duplicate {
                continue;
            }

            if seen.len() < 2 {
                issues.push(ValidationIssue::TooFewMembers {
                    kind,
                    cluster,
                    found: seen.len(),
                });
            } else if kind == ConstraintKind::CoLocation && seen.len() > capacity {
                issues.push(ValidationIssue::ClusterTooLarge {
                    cluster,
                    size: seen.len(),
                    capacity,
                });
            }
        }
    }

    issues
}
