//! Pipeline orchestration.
//!
//! [`Allocator`] runs the stage chain in its fixed order, threading the
//! working state from one stage to the next, then always runs the final
//! equalizer over the whole roster.

use super::config::AllocationConfig;
use super::equalizer::equalize;
use super::types::{PlacementContext, PlacementStage, PlacementState};
use crate::error::{AllocationError, Result};
use crate::model::{Allocation, Constraint, Group, Individual, IndividualId};
use crate::random::{RandomSource, SeededSource};
use crate::stages::standard_stages;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Result of one allocation run.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// The final, size-balanced groups.
    pub allocation: Allocation,

    /// Whether any stage in the chain placed someone.
    pub handled: bool,

    /// One message per stage that ran, in chain order.
    pub messages: Vec<String>,

    /// Ids the chain dealt with before the final pass.
    pub processed: BTreeSet<IndividualId>,
}

impl AllocationOutcome {
    pub fn groups(&self) -> &[Group] {
        self.allocation.groups()
    }
}

/// Runs the constraint chain and the final equalizer.
///
/// # Usage
///
/// ```
/// use u_grouping::model::{Category, Constraint, Individual};
/// use u_grouping::pipeline::{AllocationConfig, Allocator};
/// use u_grouping::random::SeededSource;
///
/// let roster: Vec<Individual> = (1..=10)
///     .map(|id| Individual::new(id, if id % 2 == 0 { Category::B } else { Category::A }))
///     .collect();
/// let constraints = vec![
///     Constraint::separation(vec![vec![1, 3]]),
///     Constraint::gender_balance(),
/// ];
///
/// let allocator = Allocator::new(AllocationConfig::new(3));
/// let outcome = allocator
///     .allocate(&roster, &constraints, &mut SeededSource::new(42))
///     .unwrap();
/// assert_eq!(outcome.allocation.len(), 10);
/// assert!(outcome.allocation.size_spread() <= 1);
/// ```
pub struct Allocator {
    config: AllocationConfig,
    stages: Vec<Box<dyn PlacementStage>>,
}

impl Allocator {
    /// Creates an allocator with the standard chain.
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            config,
            stages: standard_stages(),
        }
    }

    /// Replaces the stage chain.
    pub fn with_stages(mut self, stages: Vec<Box<dyn PlacementStage>>) -> Self {
        self.stages = stages;
        self
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Returns the names of all stages in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Allocates with a source seeded from [`AllocationConfig::seed`].
    pub fn allocate_seeded(
        &self,
        roster: &[Individual],
        constraints: &[Constraint],
    ) -> Result<AllocationOutcome> {
        let mut rng = SeededSource::from_option(self.config.seed);
        self.allocate(roster, constraints, &mut rng)
    }

    /// Partitions `roster` into `config.group_count` groups.
    ///
    /// The caller's roster is not modified. A representative flagged on
    /// the input keeps its flag and is listed first in its output group;
    /// when two flagged members share a group only the first one placed
    /// keeps it.
    ///
    /// # Errors
    ///
    /// Invalid configuration, an empty roster, or a repeated roster id.
    pub fn allocate(
        &self,
        roster: &[Individual],
        constraints: &[Constraint],
        rng: &mut dyn RandomSource,
    ) -> Result<AllocationOutcome> {
        self.config.validate()?;
        if roster.is_empty() {
            return Err(AllocationError::EmptyRoster);
        }
        let mut ids: HashSet<IndividualId> = HashSet::with_capacity(roster.len());
        for individual in roster {
            if !ids.insert(individual.id) {
                return Err(AllocationError::DuplicateIndividual(individual.id));
            }
        }

        let snapshot: Vec<Individual> = roster.to_vec();

        info!(
            event = "allocation_start",
            roster = snapshot.len(),
            groups = self.config.group_count,
            active_constraints = constraints.iter().filter(|c| c.is_active()).count(),
        );

        let mut context = PlacementContext {
            roster: &snapshot,
            constraints,
            config: &self.config,
            state: PlacementState::new(&snapshot, self.config.empty_groups()),
        };

        let mut handled = false;
        let mut messages = Vec::new();
        for stage in &self.stages {
            if context.state.remaining.is_empty() {
                debug!(stage = stage.name(), "pool empty, chain stops");
                break;
            }
            let result = stage.try_place(&context, rng);
            debug!(
                event = "stage_end",
                stage = stage.name(),
                handled = result.handled,
                placed = result.state.placed_count(),
                remaining = result.state.remaining.len(),
            );
            handled |= result.handled;
            if !result.message.is_empty() {
                messages.push(result.message);
            }
            context.state = result.state;
        }
        debug_assert!(context.state.is_partition_of(&snapshot));

        let processed = context.state.processed.clone();
        let groups = equalize(context.state, self.config.final_balance, constraints, rng);
        let allocation = Allocation::new(groups);

        info!(
            event = "allocation_end",
            groups = allocation.groups().len(),
            assigned = allocation.len(),
            spread = allocation.size_spread(),
            handled = handled,
        );

        Ok(AllocationOutcome {
            allocation,
            handled,
            messages,
            processed,
        })
    }
}

/// Partitions `roster` into `group_count` groups with default settings.
///
/// # Examples
///
/// ```
/// use u_grouping::model::{Category, Individual};
/// use u_grouping::pipeline::allocate;
/// use u_grouping::random::FixedSource;
///
/// let roster = vec![
///     Individual::new(1, Category::A),
///     Individual::new(2, Category::B),
///     Individual::new(3, Category::A),
///     Individual::new(4, Category::B),
/// ];
/// let groups = allocate(&roster, 2, &[], &mut FixedSource::midpoint()).unwrap();
/// assert_eq!(groups[0].member_ids(), vec![1, 2]);
/// assert_eq!(groups[1].member_ids(), vec![3, 4]);
/// ```
pub fn allocate(
    roster: &[Individual],
    group_count: usize,
    constraints: &[Constraint],
    rng: &mut dyn RandomSource,
) -> Result<Vec<Group>> {
    let allocator = Allocator::new(AllocationConfig::new(group_count));
    let outcome = allocator.allocate(roster, constraints, rng)?;
    Ok(outcome.allocation.into_groups())
}
