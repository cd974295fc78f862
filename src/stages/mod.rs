//! The four placement policies, in pipeline priority order.
//!
//! 1. [`BlockDistribution`]: spread physical blocks over all groups
//! 2. [`CoLocation`]: keep clusters together
//! 3. [`Separation`]: pull clusters apart
//! 4. [`GenderBalance`]: balance categories among whoever is left
//!
//! Each stage declines when its constraint is disabled or empty.

mod block;
mod co_location;
mod gender;
mod separation;

pub use block::BlockDistribution;
pub use co_location::CoLocation;
pub use gender::GenderBalance;
pub use separation::Separation;

use crate::pipeline::PlacementStage;

/// The standard chain in priority order.
pub fn standard_stages() -> Vec<Box<dyn PlacementStage>> {
    vec![
        Box::new(BlockDistribution),
        Box::new(CoLocation),
        Box::new(Separation),
        Box::new(GenderBalance),
    ]
}
