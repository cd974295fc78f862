//! Mandatory final balancing pass.
//!
//! Runs after the stage chain no matter what the chain reported. Group
//! sizes come out exact: with `total` individuals in `n` groups every group
//! holds `floor(total / n)` and `total mod n` of them hold one more.

use super::config::FinalBalance;
use super::types::PlacementState;
use crate::model::{Category, Constraint, ConstraintKind, Group, Individual, IndividualId};
use crate::random::{shuffle, RandomSource};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Per-group target sizes, the first `total mod n` groups taking the extra.
pub fn target_sizes(total: usize, group_count: usize) -> Vec<usize> {
    if group_count == 0 {
        return Vec::new();
    }
    let base = total / group_count;
    let extra = total % group_count;
    (0..group_count)
        .map(|i| base + usize::from(i < extra))
        .collect()
}

/// Balances the chain's output into the final groups.
pub fn equalize(
    state: PlacementState,
    mode: FinalBalance,
    constraints: &[Constraint],
    rng: &mut dyn RandomSource,
) -> Vec<Group> {
    match mode {
        FinalBalance::Redistribute => redistribute(state, rng),
        FinalBalance::PreservePlacements => preserve_placements(state, constraints, rng),
    }
}

/// Clears every group and deals the whole roster out again.
///
/// The roster is gathered in chain order (group by group, then the pool)
/// and split into one shuffled pool per category. If the larger pool can
/// cover every group, each group first receives one of its members; the
/// rest of that pool follows round-robin. The smaller pool is then dealt
/// round-robin, skipping groups already at their target size.
pub fn redistribute(mut state: PlacementState, rng: &mut dyn RandomSource) -> Vec<Group> {
    let mut everyone: Vec<Individual> = state.groups.iter_mut().flat_map(Group::drain).collect();
    everyone.append(&mut state.remaining);

    let mut groups = state.groups;
    let n = groups.len();
    if n == 0 {
        return groups;
    }
    let targets = target_sizes(everyone.len(), n);

    let (mut pool_a, mut pool_b): (Vec<Individual>, Vec<Individual>) = everyone
        .into_iter()
        .partition(|i| i.category == Category::A);
    shuffle(&mut pool_a, rng);
    shuffle(&mut pool_b, rng);

    let (majority, minority) = if pool_a.len() >= pool_b.len() {
        (pool_a, pool_b)
    } else {
        (pool_b, pool_a)
    };

    let mut majority = majority.into_iter();
    if majority.len() >= n {
        for group in groups.iter_mut() {
            if let Some(individual) = majority.next() {
                group.insert(individual);
            }
        }
    }

    let mut cursor = 0;
    for individual in majority {
        let idx = next_open(&groups, &targets, cursor);
        groups[idx].insert(individual);
        cursor = (idx + 1) % n;
    }

    cursor = 0;
    for individual in minority {
        let idx = next_open(&groups, &targets, cursor);
        groups[idx].insert(individual);
        cursor = (idx + 1) % n;
    }

    groups
}

/// First group at or after `cursor` (cyclically) still under target.
fn next_open(groups: &[Group], targets: &[usize], cursor: usize) -> usize {
    let n = groups.len();
    (0..n)
        .map(|step| (cursor + step) % n)
        .find(|&idx| groups[idx].len() < targets[idx])
        .unwrap_or_else(|| {
            groups
                .iter()
                .enumerate()
                .min_by_key(|(_, g)| g.len())
                .map_or(0, |(idx, _)| idx)
        })
}

/// Keeps the chain's placements and fills the remaining slack.
///
/// Target sizes go largest-first to the groups the chain filled most, so
/// as few members as possible need to move. Groups still over target shed
/// members outside every co-location and separation cluster first, highest
/// id first. The pool is then placed one individual at a time, each into
/// the open group where its category is least represented.
pub fn preserve_placements(
    mut state: PlacementState,
    constraints: &[Constraint],
    rng: &mut dyn RandomSource,
) -> Vec<Group> {
    let n = state.groups.len();
    if n == 0 {
        return state.groups;
    }
    let total = state.placed_count() + state.remaining.len();

    let mut by_size: Vec<usize> = (0..n).collect();
    by_size.sort_by_key(|&idx| Reverse(state.groups[idx].len()));
    let sizes = target_sizes(total, n);
    let mut targets = vec![0; n];
    for (rank, &idx) in by_size.iter().enumerate() {
        targets[idx] = sizes[rank];
    }

    let pinned = pinned_ids(constraints);
    for idx in 0..n {
        while state.groups[idx].len() > targets[idx] {
            let Some(victim) = eviction_candidate(&state.groups[idx], &pinned) else {
                break;
            };
            state.evict(idx, victim);
        }
    }

    let (mut pool_a, mut pool_b): (Vec<Individual>, Vec<Individual>) = state
        .remaining
        .drain(..)
        .partition(|i| i.category == Category::A);
    shuffle(&mut pool_a, rng);
    shuffle(&mut pool_b, rng);

    let mut groups = state.groups;
    for individual in interleave(pool_a, pool_b) {
        let category = individual.category;
        let idx = (0..n)
            .filter(|&idx| groups[idx].len() < targets[idx])
            .min_by_key(|&idx| {
                let g = &groups[idx];
                let lean = g.count(category) as i64 - g.count(category.other()) as i64;
                (lean, g.len())
            })
            .unwrap_or_else(|| next_open(&groups, &targets, 0));
        groups[idx].insert(individual);
    }

    groups
}

fn pinned_ids(constraints: &[Constraint]) -> HashSet<IndividualId> {
    constraints
        .iter()
        .filter(|c| c.is_active())
        .filter(|c| matches!(c.kind(), ConstraintKind::CoLocation | ConstraintKind::Separation))
        .flat_map(|c| c.clusters().iter().flatten().copied())
        .collect()
}

fn eviction_candidate(group: &Group, pinned: &HashSet<IndividualId>) -> Option<IndividualId> {
    let members = group.members();
    members
        .iter()
        .filter(|m| !pinned.contains(&m.id))
        .map(|m| m.id)
        .max()
        .or_else(|| members.iter().map(|m| m.id).max())
}

/// Alternates the two pools, starting with the larger one.
fn interleave(a: Vec<Individual>, b: Vec<Individual>) -> Vec<Individual> {
    let (first, second) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut second = second.into_iter();
    for individual in first {
        out.push(individual);
        if let Some(other) = second.next() {
            out.push(other);
        }
    }
    out.extend(second);
    out
}
