//! Allocation configuration.

use crate::error::{AllocationError, Result};
use crate::model::Group;

/// Soft cap on group size used when choosing a co-location target.
pub const DEFAULT_CO_LOCATION_CAP: usize = 8;

/// How the mandatory final pass treats the chain's placements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum FinalBalance {
    /// Clear every group and redistribute the whole roster by category.
    ///
    /// Only the ordering the chain leaves behind carries over; co-location
    /// and separation placements do not survive.
    #[default]
    Redistribute,

    /// Keep chain placements pinned and fill group slack from the pool.
    ///
    /// Groups over their target size first shed members that belong to no
    /// co-location or separation cluster.
    PreservePlacements,
}

/// Configuration for one allocation request.
///
/// # Examples
///
/// ```
/// use u_grouping::pipeline::{AllocationConfig, FinalBalance};
///
/// let config = AllocationConfig::new(4)
///     .with_co_location_cap(6)
///     .with_final_balance(FinalBalance::PreservePlacements)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.group_name(0), "Group 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct AllocationConfig {
    /// Number of output groups. Fixed for the whole run.
    pub group_count: usize,

    /// Soft cap for co-location targets. A cluster goes to the smallest
    /// group that stays within the cap, or the smallest group overall.
    pub co_location_cap: usize,

    /// Behavior of the final balancing pass.
    pub final_balance: FinalBalance,

    /// Display names are `"{prefix} {n}"` with `n` counting from 1.
    pub group_name_prefix: String,

    /// Random seed for [`Allocator::allocate_seeded`](super::Allocator::allocate_seeded).
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            group_count: 2,
            co_location_cap: DEFAULT_CO_LOCATION_CAP,
            final_balance: FinalBalance::default(),
            group_name_prefix: "Group".to_string(),
            seed: None,
        }
    }
}

impl AllocationConfig {
    pub fn new(group_count: usize) -> Self {
        Self {
            group_count,
            ..Self::default()
        }
    }

    pub fn with_group_count(mut self, n: usize) -> Self {
        self.group_count = n;
        self
    }

    pub fn with_co_location_cap(mut self, cap: usize) -> Self {
        self.co_location_cap = cap;
        self
    }

    pub fn with_final_balance(mut self, mode: FinalBalance) -> Self {
        self.final_balance = mode;
        self
    }

    pub fn with_group_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.group_name_prefix = prefix.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.group_count == 0 {
            return Err(AllocationError::NoGroups);
        }
        if self.co_location_cap == 0 {
            return Err(AllocationError::Config(
                "co_location_cap must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Display name of the group at `index`.
    pub fn group_name(&self, index: usize) -> String {
        format!("{} {}", self.group_name_prefix, index + 1)
    }

    /// Fresh, empty groups with ids `1..=group_count`.
    pub fn empty_groups(&self) -> Vec<Group> {
        (0..self.group_count)
            .map(|i| Group::new(i + 1, self.group_name(i)))
            .collect()
    }
}
