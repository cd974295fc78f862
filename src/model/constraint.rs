//! Soft constraints honored by the placement pipeline.

use super::types::IndividualId;
use std::fmt;

/// Discriminant of a [`Constraint`], also used to label stages and
/// validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ConstraintKind {
    BlockDistribution,
    CoLocation,
    Separation,
    GenderBalance,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConstraintKind::BlockDistribution => "block",
            ConstraintKind::CoLocation => "co-location",
            ConstraintKind::Separation => "separation",
            ConstraintKind::GenderBalance => "gender balance",
        };
        f.write_str(label)
    }
}

/// A soft constraint together with its enabled flag.
///
/// Clusters are lists of distinct ids; input order is kept because the
/// separation stage anchors on the first member it finds.
///
/// # Examples
///
/// ```
/// use u_grouping::model::{Constraint, ConstraintKind};
///
/// let c = Constraint::co_location(vec![vec![1, 2], vec![7, 9, 11]]);
/// assert_eq!(c.kind(), ConstraintKind::CoLocation);
/// assert!(c.is_active());
/// assert!(!c.with_enabled(false).is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum Constraint {
    /// Spread each block's members across all groups.
    BlockDistribution {
        enabled: bool,
        blocks: Vec<Vec<IndividualId>>,
    },

    /// Each cluster must end in a single group.
    CoLocation {
        enabled: bool,
        clusters: Vec<Vec<IndividualId>>,
    },

    /// Each cluster must end in at least two distinct groups.
    Separation {
        enabled: bool,
        clusters: Vec<Vec<IndividualId>>,
    },

    /// Balance categories among whoever is still unplaced.
    GenderBalance { enabled: bool },
}

impl Constraint {
    pub fn block_distribution(blocks: Vec<Vec<IndividualId>>) -> Self {
        Constraint::BlockDistribution {
            enabled: true,
            blocks,
        }
    }

    pub fn co_location(clusters: Vec<Vec<IndividualId>>) -> Self {
        Constraint::CoLocation {
            enabled: true,
            clusters,
        }
    }

    pub fn separation(clusters: Vec<Vec<IndividualId>>) -> Self {
        Constraint::Separation {
            enabled: true,
            clusters,
        }
    }

    pub fn gender_balance() -> Self {
        Constraint::GenderBalance { enabled: true }
    }

    /// Returns a copy with the enabled flag replaced.
    pub fn with_enabled(mut self, value: bool) -> Self {
        match &mut self {
            Constraint::BlockDistribution { enabled, .. }
            | Constraint::CoLocation { enabled, .. }
            | Constraint::Separation { enabled, .. }
            | Constraint::GenderBalance { enabled } => *enabled = value,
        }
        self
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::BlockDistribution { .. } => ConstraintKind::BlockDistribution,
            Constraint::CoLocation { .. } => ConstraintKind::CoLocation,
            Constraint::Separation { .. } => ConstraintKind::Separation,
            Constraint::GenderBalance { .. } => ConstraintKind::GenderBalance,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Constraint::BlockDistribution { enabled, .. }
            | Constraint::CoLocation { enabled, .. }
            | Constraint::Separation { enabled, .. }
            | Constraint::GenderBalance { enabled } => *enabled,
        }
    }

    /// The id clusters carried by this constraint (blocks for block
    /// distribution, empty for gender balance).
    pub fn clusters(&self) -> &[Vec<IndividualId>] {
        match self {
            Constraint::BlockDistribution { blocks, .. } => blocks,
            Constraint::CoLocation { clusters, .. } | Constraint::Separation { clusters, .. } => {
                clusters
            }
            Constraint::GenderBalance { .. } => &[],
        }
    }

    /// Enabled and carrying something to act on.
    pub fn is_active(&self) -> bool {
        match self {
            Constraint::GenderBalance { enabled } => *enabled,
            _ => self.is_enabled() && !self.clusters().is_empty(),
        }
    }
}

/// Returns the first active constraint of `kind`.
pub fn find_active(constraints: &[Constraint], kind: ConstraintKind) -> Option<&Constraint> {
    constraints
        .iter()
        .find(|c| c.kind() == kind && c.is_active())
}
