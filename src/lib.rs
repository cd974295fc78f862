//! Constraint-aware roster partitioning.
//!
//! Splits a roster of individuals into a fixed number of equally sized
//! groups while honoring, in priority order:
//!
//! - **Block distribution**: members of a physical block (e.g. a seating
//!   row) are spread over all groups.
//! - **Co-location**: clusters that must share a group.
//! - **Separation**: clusters that must not share a group.
//! - **Gender balance**: a binary category split evenly across groups.
//!
//! Each constraint is handled by a single-pass greedy stage; there is no
//! backtracking. A mandatory final pass then guarantees group sizes that
//! differ by at most one.
//!
//! # Modules
//!
//! - [`model`]: individuals, groups, constraints, and the stored allocation
//! - [`parse`]: cluster string parsing and pre-flight validation
//! - [`pipeline`]: orchestration, configuration, and the final equalizer
//! - [`stages`]: the four placement policies
//! - [`random`]: injectable, seedable randomness
//!
//! # Example
//!
//! ```
//! use u_grouping::model::{Category, ConstraintKind, Individual};
//! use u_grouping::parse::{parse_clusters, validate_constraints};
//! use u_grouping::pipeline::{AllocationConfig, Allocator};
//! use u_grouping::random::SeededSource;
//! use u_grouping::model::Constraint;
//!
//! let roster: Vec<Individual> = (1..=12)
//!     .map(|id| Individual::new(id, if id % 3 == 0 { Category::B } else { Category::A }))
//!     .collect();
//!
//! let blocks = parse_clusters("1-6; 7-12", ConstraintKind::BlockDistribution);
//! let apart = parse_clusters("1, 2", ConstraintKind::Separation);
//! let constraints = vec![
//!     Constraint::block_distribution(blocks.clusters),
//!     Constraint::separation(apart.clusters),
//!     Constraint::gender_balance(),
//! ];
//! assert!(validate_constraints(&roster, 3, &constraints).is_empty());
//!
//! let outcome = Allocator::new(AllocationConfig::new(3))
//!     .allocate(&roster, &constraints, &mut SeededSource::new(7))
//!     .unwrap();
//! assert!(outcome.groups().iter().all(|g| g.len() == 4));
//! ```

pub mod error;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod random;
pub mod stages;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{AllocationError, Result, ValidationIssue};
