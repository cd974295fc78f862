//! Error and validation types.

use crate::model::{ConstraintKind, IndividualId};
use thiserror::Error;

/// Structural failure rejected at the call boundary.
///
/// Nothing caller-visible is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("group count must be at least 1")]
    NoGroups,

    #[error("roster is empty")]
    EmptyRoster,

    #[error("individual {0} appears more than once in the roster")]
    DuplicateIndividual(IndividualId),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no group with id {0}")]
    UnknownGroup(usize),

    #[error("individual {individual} is not a member of group {group}")]
    NotInGroup {
        group: usize,
        individual: IndividualId,
    },
}

/// Result type alias for allocation operations.
pub type Result<T> = std::result::Result<T, AllocationError>;

/// A configuration problem found before allocation runs.
///
/// `Display` renders the human-readable message shown to the user.
/// Clusters are numbered from 1 in the order they were entered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("{kind} cluster {cluster}: id {id} is listed more than once")]
    DuplicateId {
        kind: ConstraintKind,
        cluster: usize,
        id: IndividualId,
    },

    #[error("{kind} cluster {cluster}: needs at least 2 distinct ids, found {found}")]
    TooFewMembers {
        kind: ConstraintKind,
        cluster: usize,
        found: usize,
    },

    #[error("{kind} cluster {cluster}: cannot read `{token}`")]
    MalformedToken {
        kind: ConstraintKind,
        cluster: usize,
        token: String,
    },

    #[error("{kind} cluster {cluster}: id {id} is not on the roster")]
    UnknownId {
        kind: ConstraintKind,
        cluster: usize,
        id: IndividualId,
    },

    #[error("co-location cluster {cluster}: {size} members exceed the group capacity of {capacity}")]
    ClusterTooLarge {
        cluster: usize,
        size: usize,
        capacity: usize,
    },
}

impl ValidationIssue {
    /// The constraint kind the issue belongs to.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ValidationIssue::DuplicateId { kind, .. }
            | ValidationIssue::TooFewMembers { kind, .. }
            | ValidationIssue::MalformedToken { kind, .. }
            | ValidationIssue::UnknownId { kind, .. } => *kind,
            ValidationIssue::ClusterTooLarge { .. } => ConstraintKind::CoLocation,
        }
    }
}
