//! Roster, group, and constraint data model.
//!
//! - [`Individual`] / [`Category`]: roster members and the binary balance attribute
//! - [`Group`]: one output group, members ordered by id with the representative first
//! - [`Constraint`]: the four soft constraint kinds with their payloads
//! - [`Allocation`]: a finished assignment plus representative operations

mod allocation;
mod constraint;
mod types;

pub use allocation::Allocation;
pub use constraint::{find_active, Constraint, ConstraintKind};
pub use types::{Category, Group, Individual, IndividualId};
