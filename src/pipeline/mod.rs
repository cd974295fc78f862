//! Constraint-resolution pipeline.
//!
//! An allocation runs the stages of [`crate::stages`] in fixed priority
//! order over a [`PlacementState`], each stage receiving the state the
//! previous one returned. The chain stops early once nobody is left in
//! the pool. The final equalizer then always runs, guaranteeing group
//! sizes that differ by at most one.
//!
//! # Key Types
//!
//! - [`Allocator`]: orchestrates the chain and the final pass
//! - [`AllocationConfig`]: group count, soft cap, final-pass mode, seed
//! - [`PlacementStage`]: the contract every stage implements
//! - [`PlacementState`] / [`PlacementContext`] / [`StageResult`]: what flows between stages

mod config;
pub mod equalizer;
mod runner;
mod types;

pub use config::{AllocationConfig, FinalBalance, DEFAULT_CO_LOCATION_CAP};
pub use runner::{allocate, AllocationOutcome, Allocator};
pub use types::{PlacementContext, PlacementStage, PlacementState, StageResult};
