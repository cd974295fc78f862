//! Constraint input parsing and pre-flight validation.
//!
//! Turns human-entered cluster strings into id clusters and reports
//! configuration problems as [`ValidationIssue`](crate::error::ValidationIssue)s
//! before any allocation runs. Nothing here fails the pipeline: invalid
//! clusters are dropped and reported.

mod clusters;
mod field;
mod validation;

pub use clusters::{parse_clusters, ParsedClusters, MAX_RANGE_SPAN};
pub use field::ClusterField;
pub use validation::validate_constraints;
