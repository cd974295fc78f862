//! Working state threaded through the stages and the stage contract.

use super::config::AllocationConfig;
use crate::model::{find_active, Constraint, ConstraintKind, Group, Individual, IndividualId};
use crate::random::RandomSource;
use std::collections::{BTreeSet, HashSet};

/// Partial assignment owned by one in-flight allocation.
///
/// `remaining` and the union of all group memberships always partition
/// the roster the state was created from. All mutation goes through
/// [`place`](PlacementState::place) and [`evict`](PlacementState::evict),
/// which preserve that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementState {
    pub groups: Vec<Group>,
    pub remaining: Vec<Individual>,
    /// Ids some stage has already dealt with.
    pub processed: BTreeSet<IndividualId>,
}

impl PlacementState {
    /// Everyone unplaced, groups as given.
    pub fn new(roster: &[Individual], groups: Vec<Group>) -> Self {
        Self {
            groups,
            remaining: roster.to_vec(),
            processed: BTreeSet::new(),
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_remaining(&self, id: IndividualId) -> bool {
        self.remaining.iter().any(|i| i.id == id)
    }

    /// Index of the group holding `id`.
    pub fn group_of(&self, id: IndividualId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }

    /// Whether `id` is anywhere in this state.
    pub fn knows(&self, id: IndividualId) -> bool {
        self.is_remaining(id) || self.group_of(id).is_some()
    }

    /// Moves `id` from the pool into group `group`.
    ///
    /// Returns `false` (and changes nothing) if `id` is not in the pool or
    /// the index is out of range.
    pub fn place(&mut self, group: usize, id: IndividualId) -> bool {
        if group >= self.groups.len() {
            return false;
        }
        let Some(pos) = self.remaining.iter().position(|i| i.id == id) else {
            return false;
        };
        let individual = self.remaining.remove(pos);
        self.groups[group].insert(individual);
        self.processed.insert(id);
        true
    }

    /// Moves `id` from group `group` back into the pool.
    pub fn evict(&mut self, group: usize, id: IndividualId) -> bool {
        let Some(individual) = self.groups.get_mut(group).and_then(|g| g.remove(id)) else {
            return false;
        };
        self.remaining.push(individual);
        true
    }

    /// Smallest group, lowest index on ties.
    pub fn least_occupied(&self) -> Option<usize> {
        self.least_occupied_where(|_, _| true)
    }

    /// Smallest group among those accepted by `filter`, lowest index on ties.
    pub fn least_occupied_where<F>(&self, filter: F) -> Option<usize>
    where
        F: Fn(usize, &Group) -> bool,
    {
        self.groups
            .iter()
            .enumerate()
            .filter(|(idx, g)| filter(*idx, *g))
            .min_by_key(|(_, g)| g.len())
            .map(|(idx, _)| idx)
    }

    /// Number of individuals currently in groups.
    pub fn placed_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Checks the partition invariant against `roster`.
    pub fn is_partition_of(&self, roster: &[Individual]) -> bool {
        let mut seen: HashSet<IndividualId> = HashSet::with_capacity(roster.len());
        let members = self
            .groups
            .iter()
            .flat_map(|g| g.members().iter())
            .chain(self.remaining.iter());
        for individual in members {
            if !seen.insert(individual.id) {
                return false;
            }
        }
        seen.len() == roster.len() && roster.iter().all(|i| seen.contains(&i.id))
    }
}

/// Input to one stage: the fixed request plus the current state.
#[derive(Debug, Clone)]
pub struct PlacementContext<'a> {
    /// Everyone active at pipeline start.
    pub roster: &'a [Individual],
    pub constraints: &'a [Constraint],
    pub config: &'a AllocationConfig,
    pub state: PlacementState,
}

impl<'a> PlacementContext<'a> {
    /// The first enabled, non-empty constraint of `kind`.
    pub fn active(&self, kind: ConstraintKind) -> Option<&'a Constraint> {
        find_active(self.constraints, kind)
    }
}

/// What a stage hands back to the orchestrator.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Mirrors `handled`.
    pub success: bool,
    /// The stage placed or moved at least one individual.
    pub handled: bool,
    pub state: PlacementState,
    /// Human-readable summary; empty when the stage declined.
    pub message: String,
}

impl StageResult {
    /// The stage's constraint is disabled or empty: state passes through.
    pub fn declined(state: PlacementState) -> Self {
        Self {
            success: false,
            handled: false,
            state,
            message: String::new(),
        }
    }

    pub fn finished(state: PlacementState, handled: bool, message: String) -> Self {
        Self {
            success: handled,
            handled,
            state,
            message,
        }
    }
}

/// One policy in the ordered placement pipeline.
///
/// A stage inspects the context, and if its constraint is active returns
/// a new state with as many individuals placed as it could. It never
/// fails: an inactive constraint yields [`StageResult::declined`].
///
/// # Examples
///
/// ```
/// use u_grouping::model::ConstraintKind;
/// use u_grouping::pipeline::{PlacementContext, PlacementStage, StageResult};
/// use u_grouping::random::RandomSource;
///
/// /// Puts everyone left into the first group.
/// struct Dump;
///
/// impl PlacementStage for Dump {
///     fn name(&self) -> &str { "Dump" }
///     fn kind(&self) -> ConstraintKind { ConstraintKind::GenderBalance }
///     fn try_place(&self, ctx: &PlacementContext<'_>, _rng: &mut dyn RandomSource) -> StageResult {
///         let mut state = ctx.state.clone();
///         let ids: Vec<u32> = state.remaining.iter().map(|i| i.id).collect();
///         for id in &ids {
///             state.place(0, *id);
///         }
///         StageResult::finished(state, !ids.is_empty(), format!("dumped {}", ids.len()))
///     }
/// }
/// ```
pub trait PlacementStage: Send + Sync {
    /// Returns the name of this stage.
    fn name(&self) -> &str;

    /// The constraint kind this stage resolves.
    fn kind(&self) -> ConstraintKind;

    /// Attempts placement on a snapshot of the current state.
    fn try_place(&self, context: &PlacementContext<'_>, rng: &mut dyn RandomSource)
        -> StageResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn state(n: u32, groups: usize) -> (Vec<Individual>, PlacementState) {
        let roster: Vec<Individual> = (1..=n).map(|id| Individual::new(id, Category::A)).collect();
        let groups = (0..groups).map(|i| Group::new(i + 1, format!("G{}", i + 1))).collect();
        let state = PlacementState::new(&roster, groups);
        (roster, state)
    }

    #[test]
    fn test_place_and_evict_keep_partition() {
        let (roster, mut s) = state(4, 2);
        assert!(s.place(0, 1));
        assert!(s.place(1, 2));
        assert!(!s.place(1, 2), "already placed");
        assert!(!s.place(5, 3), "no such group");
        assert!(s.is_partition_of(&roster));
        assert_eq!(s.group_of(2), Some(1));

        assert!(s.evict(1, 2));
        assert!(!s.evict(1, 2));
        assert!(s.is_remaining(2));
        assert!(s.is_partition_of(&roster));
        assert!(s.processed.contains(&2));
    }

    #[test]
    fn test_least_occupied_prefers_low_index() {
        let (_, mut s) = state(6, 3);
        assert_eq!(s.least_occupied(), Some(0));
        s.place(0, 1);
        assert_eq!(s.least_occupied(), Some(1));
        assert_eq!(s.least_occupied_where(|idx, _| idx != 1), Some(2));
        assert_eq!(s.least_occupied_where(|_, _| false), None);
    }

    #[test]
    fn test_partition_detects_duplicates() {
        let (roster, mut s) = state(3, 2);
        s.place(0, 1);
        s.groups[1].insert(Individual::new(1, Category::A));
        assert!(!s.is_partition_of(&roster));
    }
}
