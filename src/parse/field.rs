//! Stateful input field that ignores edits which do not change meaning.

use super::clusters::{parse_clusters, ParsedClusters};
use crate::error::ValidationIssue;
use crate::model::{Constraint, ConstraintKind, IndividualId};

/// Holds the last accepted text of one constraint field and its parse.
///
/// Whitespace-only edits are skipped without re-parsing, so a form that
/// calls [`update`](ClusterField::update) on every keystroke sees no
/// spurious change.
///
/// # Examples
///
/// ```
/// use u_grouping::model::ConstraintKind;
/// use u_grouping::parse::ClusterField;
///
/// let mut field = ClusterField::new(ConstraintKind::Separation);
/// assert!(field.update("1,2; 3,4"));
/// assert!(!field.update(" 1, 2 ;3 ,4 "));
/// assert_eq!(field.clusters(), &[vec![1, 2], vec![3, 4]]);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterField {
    kind: ConstraintKind,
    normalized: String,
    parsed: ParsedClusters,
}

impl ClusterField {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            normalized: String::new(),
            parsed: ParsedClusters::default(),
        }
    }

    /// Accepts new text. Returns `true` when the parsed clusters changed.
    pub fn update(&mut self, input: &str) -> bool {
        let normalized = normalize(input);
        if normalized == self.normalized {
            return false;
        }
        let parsed = parse_clusters(&normalized, self.kind);
        let changed = parsed.clusters != self.parsed.clusters;
        self.normalized = normalized;
        self.parsed = parsed;
        changed
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn clusters(&self) -> &[Vec<IndividualId>] {
        &self.parsed.clusters
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.parsed.issues
    }

    /// Builds the constraint this field configures.
    pub fn to_constraint(&self, enabled: bool) -> Constraint {
        let clusters = self.parsed.clusters.clone();
        let constraint = match self.kind {
            ConstraintKind::BlockDistribution => Constraint::block_distribution(clusters),
            ConstraintKind::CoLocation => Constraint::co_location(clusters),
            ConstraintKind::Separation => Constraint::separation(clusters),
            ConstraintKind::GenderBalance => Constraint::gender_balance(),
        };
        constraint.with_enabled(enabled)
    }
}

/// Trims whitespace around every separator, keeping it inside tokens so
/// `"1 2"` stays malformed instead of collapsing to `12`.
fn normalize(input: &str) -> String {
    input
        .split(';')
        .map(|cluster| {
            cluster
                .split(',')
                .map(|token| {
                    token
                        .split('-')
                        .map(str::trim)
                        .collect::<Vec<_>>()
                        .join("-")
                })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(";")
}
