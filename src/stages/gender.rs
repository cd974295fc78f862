//! Category balance for whoever the earlier stages left unplaced.

use crate::model::{Category, ConstraintKind, IndividualId};
use crate::pipeline::{PlacementContext, PlacementStage, PlacementState, StageResult};
use crate::random::{shuffle, RandomSource};
use std::cmp::Reverse;

/// Places the remaining pool, category A first, then category B.
///
/// Each pool is shuffled, then every individual goes to the group ranked
/// best by, in order:
/// 1. least overflow past `ceil(roster / group_count)` after adding them,
/// 2. largest shortfall of their category (`other - same`),
/// 3. fewest members.
///
/// Remaining ties go to the earliest group in an order shuffled once per
/// run, so no group is favored across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenderBalance;

impl PlacementStage for GenderBalance {
    fn name(&self) -> &str {
        "GenderBalance"
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::GenderBalance
    }

    fn try_place(&self, context: &PlacementContext<'_>, rng: &mut dyn RandomSource) -> StageResult {
        if context.active(self.kind()).is_none() {
            return StageResult::declined(context.state.clone());
        }
        let mut state = context.state.clone();
        let n = state.group_count();
        if state.remaining.is_empty() || n == 0 {
            return StageResult::finished(state, false, "gender balance: nobody left to place".into());
        }

        let total = context.roster.len().max(state.placed_count() + state.remaining.len());
        let target = total.div_ceil(n);

        let mut pool_a: Vec<IndividualId> = Vec::new();
        let mut pool_b: Vec<IndividualId> = Vec::new();
        for individual in &state.remaining {
            match individual.category {
                Category::A => pool_a.push(individual.id),
                Category::B => pool_b.push(individual.id),
            }
        }
        shuffle(&mut pool_a, rng);
        shuffle(&mut pool_b, rng);
        let mut order: Vec<usize> = (0..n).collect();
        shuffle(&mut order, rng);

        let examined = pool_a.len() + pool_b.len();
        for (category, pool) in [(Category::A, pool_a), (Category::B, pool_b)] {
            for id in pool {
                if let Some(idx) = best_group(&state, &order, category, target) {
                    state.place(idx, id);
                }
            }
        }

        let message = format!("gender balance: placed {examined} individuals, target size {target}");
        StageResult::finished(state, true, message)
    }
}

/// Best group for one individual; `order` decides among equal scores.
fn best_group(
    state: &PlacementState,
    order: &[usize],
    category: Category,
    target: usize,
) -> Option<usize> {
    order.iter().copied().min_by_key(|&idx| {
        let g = &state.groups[idx];
        let overflow = (g.len() + 1).saturating_sub(target);
        let shortfall = g.count(category.other()) as i64 - g.count(category) as i64;
        (overflow, Reverse(shortfall), g.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, Individual};
    use crate::pipeline::AllocationConfig;
    use crate::random::{FixedSource, SeededSource};
    use std::collections::BTreeSet;

    fn alternating(n: u32) -> Vec<Individual> {
        (1..=n)
            .map(|id| {
                let c = if id % 2 == 0 { Category::B } else { Category::A };
                Individual::new(id, c)
            })
            .collect()
    }

    fn run(
        roster: &[Individual],
        config: &AllocationConfig,
        state: PlacementState,
        constraints: &[Constraint],
        rng: &mut dyn RandomSource,
    ) -> StageResult {
        let context = PlacementContext {
            roster,
            constraints,
            config,
            state,
        };
        GenderBalance.try_place(&context, rng)
    }

    #[test]
    fn test_balances_categories_and_sizes() {
        let r = alternating(12);
        let config = AllocationConfig::new(3);
        let state = PlacementState::new(&r, config.empty_groups());
        let constraints = vec![Constraint::gender_balance()];
        let result = run(&r, &config, state, &constraints, &mut SeededSource::new(3));

        assert!(result.handled);
        assert!(result.state.remaining.is_empty());
        for g in &result.state.groups {
            assert_eq!(g.len(), 4);
            assert_eq!(g.count(Category::A), 2);
            assert_eq!(g.count(Category::B), 2);
        }
    }

    #[test]
    fn test_fills_groups_short_on_category() {
        let r = alternating(6);
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        // group 0 already has two A, group 1 two B
        state.place(0, 1);
        state.place(0, 3);
        state.place(1, 2);
        state.place(1, 4);
        let constraints = vec![Constraint::gender_balance()];
        let result = run(&r, &config, state, &constraints, &mut FixedSource::midpoint());

        // 5 (A) goes to the B-heavy group, 6 (B) to the A-heavy group
        assert_eq!(result.state.group_of(5), Some(1));
        assert_eq!(result.state.group_of(6), Some(0));
    }

    #[test]
    fn test_avoids_overflow_first() {
        let r: Vec<Individual> = (1..=4).map(|id| Individual::new(id, Category::A)).collect();
        let config = AllocationConfig::new(2);
        let mut state = PlacementState::new(&r, config.empty_groups());
        state.place(0, 1);
        state.place(0, 2);
        let constraints = vec![Constraint::gender_balance()];
        let result = run(&r, &config, state, &constraints, &mut FixedSource::midpoint());

        // target 2: group 0 is full, both go to group 1
        assert_eq!(result.state.groups[1].member_ids(), vec![3, 4]);
    }

    #[test]
    fn test_disabled_declines() {
        let r = alternating(4);
        let config = AllocationConfig::new(2);
        let state = PlacementState::new(&r, config.empty_groups());
        let constraints = vec![Constraint::gender_balance().with_enabled(false)];
        let result = run(&r, &config, state, &constraints, &mut FixedSource::midpoint());
        assert!(!result.handled);
        assert_eq!(result.state.remaining.len(), 4);
    }

    #[test]
    fn test_ties_not_biased_to_first_groups() {
        let r: Vec<Individual> = (1..=3).map(|id| Individual::new(id, Category::A)).collect();
        let config = AllocationConfig::new(6);
        let constraints = vec![Constraint::gender_balance()];

        let mut used = BTreeSet::new();
        for seed in 0..20 {
            let state = PlacementState::new(&r, config.empty_groups());
            let result = run(&r, &config, state, &constraints, &mut SeededSource::new(seed));
            for id in 1..=3 {
                if let Some(idx) = result.state.group_of(id) {
                    used.insert(idx);
                }
            }
        }
        assert!(used.iter().any(|&idx| idx >= 3), "used groups: {used:?}");
    }
}
