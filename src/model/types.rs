//! Roster and group value types.

use std::fmt;

/// Identifier of an individual. Unique within the active roster, positive.
pub type IndividualId = u32;

/// Binary attribute used for balancing (e.g. gender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    A,
    B,
}

impl Category {
    /// Returns the other category.
    pub fn other(self) -> Self {
        match self {
            Category::A => Category::B,
            Category::B => Category::A,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::A => f.write_str("A"),
            Category::B => f.write_str("B"),
        }
    }
}

/// A member of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Individual {
    pub id: IndividualId,
    pub category: Category,

    /// Set by the representative operations, never by the placement stages.
    /// A flag on allocation input is carried through to the output group.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_representative: bool,
}

impl Individual {
    pub fn new(id: IndividualId, category: Category) -> Self {
        Self {
            id,
            category,
            is_representative: false,
        }
    }
}

/// One output group.
///
/// Members are kept ordered by id with the representative (if any) listed
/// first. The order is for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Group {
    pub id: usize,
    pub display_name: String,
    members: Vec<Individual>,
}

impl Group {
    pub fn new(id: usize, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            members: Vec::new(),
        }
    }

    /// Members in display order.
    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    /// Member ids in display order.
    pub fn member_ids(&self) -> Vec<IndividualId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: IndividualId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Number of members of the given category.
    pub fn count(&self, category: Category) -> usize {
        self.members
            .iter()
            .filter(|m| m.category == category)
            .count()
    }

    /// The current representative, if one is designated.
    pub fn representative(&self) -> Option<&Individual> {
        self.members.iter().find(|m| m.is_representative)
    }

    /// Adds a member. Returns `false` if the id is already present.
    ///
    /// A flagged member joining a group that already has a representative
    /// loses the flag.
    pub fn insert(&mut self, mut individual: Individual) -> bool {
        if self.contains(individual.id) {
            return false;
        }
        if individual.is_representative && self.representative().is_some() {
            individual.is_representative = false;
        }
        self.members.push(individual);
        self.reorder();
        true
    }

    /// Removes and returns the member with the given id.
    pub fn remove(&mut self, id: IndividualId) -> Option<Individual> {
        let pos = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(pos))
    }

    /// Removes every member, returning them in display order.
    pub fn drain(&mut self) -> Vec<Individual> {
        std::mem::take(&mut self.members)
    }

    /// Makes `id` the sole representative, or clears every flag when `id`
    /// is `None`.
    pub(crate) fn set_representative(&mut self, id: Option<IndividualId>) {
        for member in &mut self.members {
            member.is_representative = Some(member.id) == id;
        }
        self.reorder();
    }

    fn reorder(&mut self) {
        self.members
            .sort_by_key(|m| (!m.is_representative, m.id));
    }
}
