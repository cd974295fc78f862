//! The stored result of an allocation and its representative operations.

use super::types::{Group, IndividualId};
use crate::error::{AllocationError, Result};
use crate::random::{pick_index, RandomSource};

/// A complete group assignment.
///
/// Produced by the pipeline; afterwards only representative flags change.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    groups: Vec<Group>,
}

impl Allocation {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    /// Looks up a group by its id.
    pub fn group(&self, group_id: usize) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Total number of assigned individuals.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Group::is_empty)
    }

    /// `max(size) - min(size)` over all groups.
    pub fn size_spread(&self) -> usize {
        let max = self.groups.iter().map(Group::len).max().unwrap_or(0);
        let min = self.groups.iter().map(Group::len).min().unwrap_or(0);
        max - min
    }

    /// Id of the group holding `id`.
    pub fn group_of(&self, id: IndividualId) -> Option<usize> {
        self.groups.iter().find(|g| g.contains(id)).map(|g| g.id)
    }

    /// Flips the representative flag of `individual_id` in `group_id`.
    ///
    /// Turning it on clears any other representative in that group.
    /// Returns the new flag value.
    pub fn toggle_representative(
        &mut self,
        group_id: usize,
        individual_id: IndividualId,
    ) -> Result<bool> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(AllocationError::UnknownGroup(group_id))?;

        let member = group
            .members()
            .iter()
            .find(|m| m.id == individual_id)
            .ok_or(AllocationError::NotInGroup {
                group: group_id,
                individual: individual_id,
            })?;

        if member.is_representative {
            group.set_representative(None);
            Ok(false)
        } else {
            group.set_representative(Some(individual_id));
            Ok(true)
        }
    }

    /// Picks one member uniformly at random as representative of every
    /// non-empty group, replacing earlier choices.
    pub fn pick_random_representatives(&mut self, source: &mut dyn RandomSource) {
        for group in &mut self.groups {
            let Some(idx) = pick_index(group.len(), source) else {
                continue;
            };
            let chosen = group.members()[idx].id;
            group.set_representative(Some(chosen));
        }
    }
}
