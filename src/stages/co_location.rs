//! Co-location: each cluster's unplaced members go to one group together.

use crate::model::{ConstraintKind, IndividualId};
use crate::pipeline::{PlacementContext, PlacementStage, StageResult};
use crate::random::RandomSource;
use tracing::debug;

/// Places each cluster atomically, in input order.
///
/// The target is the smallest group that stays within the configured soft
/// cap after taking the whole cluster, or the smallest group overall when
/// none does. Members placed by an earlier stage are left where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoLocation;

impl PlacementStage for CoLocation {
    fn name(&self) -> &str {
        "CoLocation"
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::CoLocation
    }

    fn try_place(&self, context: &PlacementContext<'_>, _rng: &mut dyn RandomSource) -> StageResult {
        let Some(constraint) = context.active(self.kind()) else {
            return StageResult::declined(context.state.clone());
        };
        let mut state = context.state.clone();
        let cap = context.config.co_location_cap;

        let mut placed = 0;
        let mut over_cap = Vec::new();
        for (i, cluster) in constraint.clusters().iter().enumerate() {
            let mut members: Vec<IndividualId> = Vec::with_capacity(cluster.len());
            for &id in cluster {
                if state.is_remaining(id) && !members.contains(&id) {
                    members.push(id);
                }
            }
            if members.is_empty() {
                continue;
            }

            let size = members.len();
            let within_cap = state.least_occupied_where(|_, g| g.len() + size <= cap);
            let Some(target) = within_cap.or_else(|| state.least_occupied()) else {
                break;
            };
            if within_cap.is_none() {
                debug!(cluster = i + 1, size, cap, "no group fits cluster under the soft cap");
                over_cap.push(i + 1);
            }

            for id in members {
                if state.place(target, id) {
                    placed += 1;
                }
            }
        }

        let mut message = format!("co-location: placed {placed} individuals");
        if !over_cap.is_empty() {
            message.push_str(&format!(
                "; clusters {over_cap:?} exceed the soft cap of {cap} per group"
            ));
        }
        StageResult::finished(state, placed > 0, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Constraint, Individual};
    use crate::pipeline::{AllocationConfig, PlacementState};
    use crate::random::FixedSource;

    fn roster(n: u32) -> Vec<Individual> {
        (1..=n).map(|id| Individual::new(id, Category::A)).collect()
    }

    fn run_with(
        roster: &[Individual],
        config: &AllocationConfig,
        state: PlacementState,
        constraints: &[Constraint],
    ) -> StageResult {
        let context = PlacementContext {
            roster,
            constraints,
            config,
            state,
        };
        CoLocation.try_place(&context, &mut FixedSource::midpoint())
    }

    #[test]
    fn test_cluster_lands_in_one_group() {
        let r = roster(8);
        let config = AllocationConfig::new(3);
        let constraints = vec![Constraint::co_location(vec![vec![2, 5, 7], vec![1, 8]])];
        let state = PlacementState::new(&r, config.empty_groups());
        let result = run_with(&r, &config, state, &constraints);

        assert!(result.handled);
        let s = &result.state;
        assert_eq!(s.group_of(2), Some(0));
        assert_eq!(s.group_of(5), Some(0));
        assert_eq!(s.group_of(7), Some(0));
        // second cluster goes to the emptiest group
        assert_eq!(s.group_of(1), Some(1));
        assert_eq!(s.group_of(8), Some(1));
        assert!(s.is_partition_of(&r));
    }

    #[test]
    fn test_prefers_group_within_cap() {
        let r = roster(12);
        let config = AllocationConfig::new(2).with_co_location_cap(4);
        let mut state = PlacementState::new(&r, config.empty_groups());
        // group 0 holds 1, group 1 holds 3
        state.place(0, 10);
        for id in [9, 11, 12] {
            state.place(1, id);
        }
        let constraints = vec![Constraint::co_location(vec![vec![1, 2, 3, 4]])];
        let result = run_with(&r, &config, state, &constraints);

        // 1 + 4 > 4 and 3 + 4 > 4: no group fits, fall back to the smallest
        assert_eq!(result.state.group_of(1), Some(0));
        assert!(result.message.contains("soft cap"));

        let config = AllocationConfig::new(2).with_co_location_cap(5);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(0, 10);
        for id in [9, 11, 12] {
            state.place(1, id);
        }
        let constraints = vec![Constraint::co_location(vec![vec![1, 2]])];
        let result = run_with(&r, &config, state, &constraints);
        assert_eq!(result.state.group_of(1), Some(0));
        assert_eq!(result.state.group_of(2), Some(0));
    }

    #[test]
    fn test_already_placed_members_untouched() {
        let r = roster(4);
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(1, 1);
        let constraints = vec![Constraint::co_location(vec![vec![1, 2, 3]])];
        let result = run_with(&r, &config, state, &constraints);

        assert_eq!(result.state.group_of(1), Some(1));
        assert_eq!(result.state.group_of(2), Some(0));
        assert_eq!(result.state.group_of(3), Some(0));
        assert!(result.state.processed.contains(&2));
    }

    #[test]
    fn test_nothing_left_to_place() {
        let r = roster(2);
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(0, 1);
        state.place(1, 2);
        let constraints = vec![Constraint::co_location(vec![vec![1, 2]])];
        let result = run_with(&r, &config, state, &constraints);
        assert!(!result.handled);
    }

    #[test]
    fn test_disabled_declines() {
        let r = roster(4);
        let config = AllocationConfig::new(2);
        let state = PlacementState::new(&r, config.empty_groups());
        let before = state.clone();
        let constraints = vec![Constraint::co_location(vec![vec![1, 2]]).with_enabled(false)];
        let result = run_with(&r, &config, state, &constraints);

        assert!(!result.handled);
        assert!(!result.success);
        assert!(result.message.is_empty());
        assert_eq!(result.state, before);
    }
}
