//! Separation: each cluster must end up in at least two groups.

use crate::model::{ConstraintKind, IndividualId};
use crate::pipeline::{PlacementContext, PlacementStage, PlacementState, StageResult};
use crate::random::RandomSource;
use std::collections::BTreeSet;
use tracing::debug;

/// Splits clusters apart, looking at placements made by earlier stages.
///
/// Per cluster:
/// - placed members already span two or more groups: nothing to do;
/// - placed members share one group: the first stays, every other one is
///   moved to a group the cluster does not use yet;
/// - unplaced members go one at a time to a group the cluster does not
///   use yet.
///
/// "Not used yet" prefers the smallest such group; once the cluster has
/// touched every group the smallest group overall is used. All cluster
/// members end up processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Separation;

impl PlacementStage for Separation {
    fn name(&self) -> &str {
        "Separation"
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Separation
    }

    fn try_place(&self, context: &PlacementContext<'_>, _rng: &mut dyn RandomSource) -> StageResult {
        let Some(constraint) = context.active(self.kind()) else {
            return StageResult::declined(context.state.clone());
        };
        let mut state = context.state.clone();
        let n = state.group_count();

        let mut moved = 0;
        let mut placed = 0;
        let mut already = 0;
        let mut crowded = Vec::new();

        for (i, cluster) in constraint.clusters().iter().enumerate() {
            let mut members: Vec<IndividualId> = Vec::with_capacity(cluster.len());
            for &id in cluster {
                if state.knows(id) && !members.contains(&id) {
                    members.push(id);
                }
            }
            if members.len() > n {
                debug!(cluster = i + 1, size = members.len(), groups = n, "cluster larger than group count");
                crowded.push(i + 1);
            }

            let located: Vec<(IndividualId, usize)> = members
                .iter()
                .filter_map(|&id| state.group_of(id).map(|g| (id, g)))
                .collect();
            let mut used: BTreeSet<usize> = located.iter().map(|&(_, g)| g).collect();

            if used.len() >= 2 {
                already += 1;
                state.processed.extend(members.iter().copied());
                continue;
            }

            if let Some(&(_, home)) = located.first() {
                for &(id, _) in located.iter().skip(1) {
                    state.evict(home, id);
                    let Some(target) = fresh_group(&state, &used) else {
                        continue;
                    };
                    state.place(target, id);
                    used.insert(target);
                    moved += 1;
                }
            }

            let unplaced: Vec<IndividualId> = members
                .iter()
                .copied()
                .filter(|&id| state.is_remaining(id))
                .collect();
            for id in unplaced {
                let Some(target) = fresh_group(&state, &used) else {
                    continue;
                };
                if state.place(target, id) {
                    used.insert(target);
                    placed += 1;
                }
            }

            state.processed.extend(members.iter().copied());
        }

        let mut message = format!(
            "separation: moved {moved}, placed {placed}, {already} clusters already apart"
        );
        if !crowded.is_empty() {
            message.push_str(&format!(
                "; clusters {crowded:?} have more members than the {n} groups"
            ));
        }
        StageResult::finished(state, moved + placed > 0, message)
    }
}

/// Smallest group not in `used`, or the smallest group overall.
fn fresh_group(state: &PlacementState, used: &BTreeSet<usize>) -> Option<usize> {
    state
        .least_occupied_where(|idx, _| !used.contains(&idx))
        .or_else(|| state.least_occupied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Constraint, Individual};
    use crate::pipeline::AllocationConfig;
    use crate::random::FixedSource;

    fn roster(n: u32) -> Vec<Individual> {
        (1..=n).map(|id| Individual::new(id, Category::A)).collect()
    }

    fn run(
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
        Separation.try_place(&context, &mut FixedSource::midpoint())
    }

    #[test]
    fn test_splits_preplaced_pair() {
        let r = roster(4);
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(0, 1);
        state.place(0, 2);
        let constraints = vec![Constraint::separation(vec![vec![1, 2]])];
        let result = run(&r, &config, state, &constraints);

        assert!(result.handled);
        let s = &result.state;
        assert_eq!(s.group_of(1), Some(0), "first member stays");
        assert_eq!(s.group_of(2), Some(1));
        assert!(s.is_partition_of(&r));
        assert!(s.processed.contains(&1) && s.processed.contains(&2));
    }

    #[test]
    fn test_already_apart_is_untouched() {
        let r = roster(4);
        let config = AllocationConfig::new(3);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(0, 1);
        state.place(2, 2);
        let before = state.clone();
        let constraints = vec![Constraint::separation(vec![vec![1, 2, 3]])];
        let result = run(&r, &config, state, &constraints);

        assert!(!result.handled);
        assert_eq!(result.state.groups, before.groups);
        assert!(result.state.is_remaining(3));
        assert!(result.state.processed.contains(&3));
    }

    #[test]
    fn test_unplaced_members_spread() {
        let r = roster(6);
        let config = AllocationConfig::new(3);
        let state = PlacementState::new(&r, config.empty_groups());
        let constraints = vec![Constraint::separation(vec![vec![4, 5, 6]])];
        let result = run(&r, &config, state, &constraints);

        let groups: BTreeSet<Option<usize>> =
            [4, 5, 6].iter().map(|&id| result.state.group_of(id)).collect();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(Option::is_some));
    }

    #[test]
    fn test_mixed_placed_and_unplaced() {
        let r = roster(6);
        let config = AllocationConfig::new(3);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(1, 1);
        state.place(1, 2);
        let constraints = vec![Constraint::separation(vec![vec![1, 2, 3]])];
        let result = run(&r, &config, state, &constraints);

        let s = &result.state;
        assert_eq!(s.group_of(1), Some(1));
        assert_eq!(s.group_of(2), Some(0));
        assert_eq!(s.group_of(3), Some(2));
    }

    #[test]
    fn test_more_members_than_groups_reuses_smallest() {
        let r = roster(5);
        let config = AllocationConfig::new(2);
        let state = PlacementState::new(&r, config.empty_groups());
        let constraints = vec![Constraint::separation(vec![vec![1, 2, 3]])];
        let result = run(&r, &config, state, &constraints);

        let s = &result.state;
        assert_eq!(s.group_of(1), Some(0));
        assert_eq!(s.group_of(2), Some(1));
        assert_eq!(s.group_of(3), Some(0));
        assert!(result.message.contains("more members than"));
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let r = roster(3);
        let config = AllocationConfig::new(2);
        let state = PlacementState::new(&r, config.empty_groups());
        let constraints = vec![Constraint::separation(vec![vec![1, 99]])];
        let result = run(&r, &config, state, &constraints);

        assert_eq!(result.state.group_of(1), Some(0));
        assert!(!result.state.processed.contains(&99));
        assert!(result.state.is_partition_of(&r));
    }

    #[test]
    fn test_evicted_members_fall_back_to_smallest_group() {
        let r = roster(3);
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        for id in [1, 2, 3] {
            state.place(0, id);
        }
        let constraints = vec![Constraint::separation(vec![vec![1, 2, 3]])];
        let result = run(&r, &config, state, &constraints);

        assert!(result.handled);
        let s = &result.state;
        assert_eq!(s.group_of(1), Some(0), "first member stays");
        assert_eq!(s.group_of(2), Some(1));
        // both groups used, sizes tied at one: lowest index wins
        assert_eq!(s.group_of(3), Some(0));
        assert!(s.is_partition_of(&r));
        assert!(result.message.contains("more members than"));
    }

    #[test]
    fn test_disabled_declines() {
        let r = roster(4);
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(0, 1);
        state.place(0, 2);
        let before = state.clone();
        let constraints = vec![Constraint::separation(vec![vec![1, 2]]).with_enabled(false)];
        let result = run(&r, &config, state, &constraints);

        assert!(!result.handled);
        assert!(!result.success);
        assert!(result.message.is_empty());
        assert_eq!(result.state, before);
    }
}
