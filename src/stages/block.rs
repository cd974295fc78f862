//! Block distribution: spread each block's members over all groups.

use crate::model::{ConstraintKind, IndividualId};
use crate::pipeline::{PlacementContext, PlacementStage, StageResult};
use crate::random::{shuffle, RandomSource};

/// Deals every block's unplaced members round-robin over the groups.
///
/// One cursor runs across all blocks of a single invocation: when a block
/// ends at group `k`, the next block starts at `k + 1 mod n`. Members are
/// shuffled within their block first. Individuals outside every block are
/// left in the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockDistribution;

impl PlacementStage for BlockDistribution {
    fn name(&self) -> &str {
        "BlockDistribution"
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::BlockDistribution
    }

    fn try_place(&self, context: &PlacementContext<'_>, rng: &mut dyn RandomSource) -> StageResult {
        let Some(constraint) = context.active(self.kind()) else {
            return StageResult::declined(context.state.clone());
        };
        let mut state = context.state.clone();
        let n = state.group_count();
        if n == 0 {
            return StageResult::declined(state);
        }

        let mut cursor = 0;
        let mut placed = 0;
        for block in constraint.clusters() {
            let mut members: Vec<IndividualId> = block
                .iter()
                .copied()
                .filter(|&id| state.is_remaining(id))
                .collect();
            shuffle(&mut members, rng);

            for id in members {
                if state.place(cursor, id) {
                    cursor = (cursor + 1) % n;
                    placed += 1;
                }
            }
        }

        let message = format!(
            "block: spread {placed} individuals from {} blocks over {n} groups",
            constraint.clusters().len()
        );
        StageResult::finished(state, placed > 0, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Constraint, Individual};
    use crate::pipeline::{AllocationConfig, PlacementState};
    use crate::random::{FixedSource, SeededSource};

    fn roster(n: u32) -> Vec<Individual> {
        (1..=n)
            .map(|id| {
                let c = if id % 2 == 0 { Category::B } else { Category::A };
                Individual::new(id, c)
            })
            .collect()
    }

    fn run(
        roster: &[Individual],
        groups: usize,
        constraints: &[Constraint],
        rng: &mut dyn RandomSource,
    ) -> StageResult {
        let config = AllocationConfig::new(groups);
        let context = PlacementContext {
            roster,
            constraints,
            config: &config,
            state: PlacementState::new(roster, config.empty_groups()),
        };
        BlockDistribution.try_place(&context, rng)
    }

    #[test]
    fn test_cursor_continues_across_blocks() {
        let r = roster(5);
        let constraints = vec![Constraint::block_distribution(vec![vec![1, 2, 3], vec![4, 5]])];
        let result = run(&r, 2, &constraints, &mut FixedSource::midpoint());

        assert!(result.handled);
        let groups = &result.state.groups;
        assert_eq!(groups[0].member_ids(), vec![1, 3, 5]);
        assert_eq!(groups[1].member_ids(), vec![2, 4]);
        // second block starts where the first left off
        assert_eq!(result.state.group_of(4), Some(1));
        assert!(result.state.remaining.is_empty());
    }

    #[test]
    fn test_members_outside_blocks_stay_unplaced() {
        let r = roster(6);
        let constraints = vec![Constraint::block_distribution(vec![vec![1, 2, 3, 40]])];
        let result = run(&r, 3, &constraints, &mut SeededSource::new(1));

        assert!(result.state.groups.iter().all(|g| g.len() == 1));
        let left: Vec<u32> = result.state.remaining.iter().map(|i| i.id).collect();
        assert_eq!(left, vec![4, 5, 6]);
        assert!(result.state.is_partition_of(&r));
    }

    #[test]
    fn test_block_spread_even() {
        let r = roster(12);
        let constraints = vec![Constraint::block_distribution(vec![
            (1..=6).collect(),
            (7..=12).collect(),
        ])];
        let result = run(&r, 4, &constraints, &mut SeededSource::new(11));
        let sizes: Vec<usize> = result.state.groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 3]);
        for group in &result.state.groups {
            let first = group.members().iter().filter(|m| m.id <= 6).count();
            assert!((1..=2).contains(&first), "block 1 should be spread out");
        }
    }

    #[test]
    fn test_disabled_declines() {
        let r = roster(4);
        let constraints =
            vec![Constraint::block_distribution(vec![vec![1, 2]]).with_enabled(false)];
        let result = run(&r, 2, &constraints, &mut FixedSource::midpoint());
        assert!(!result.handled);
        assert!(!result.success);
        assert!(result.message.is_empty());
        assert_eq!(result.state.remaining.len(), 4);
    }
}
