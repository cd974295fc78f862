//! Injectable randomness.
//!
//! Every shuffle and random pick in the crate draws from a
//! [`RandomSource`] passed in by the caller, so a run is reproducible
//! given the same source. [`shuffle`] is a random-key stable sort: a
//! constant source leaves the input order untouched, a uniform source
//! produces a uniform permutation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A stream of unit draws in `[0, 1)`.
pub trait RandomSource {
    /// Next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Seedable source backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from the thread-local generator.
    pub fn from_random_seed() -> Self {
        Self::new(rand::random())
    }

    /// Uses `seed` when given, a random seed otherwise.
    pub fn from_option(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None => Self::from_random_seed(),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Returns the same value on every draw. Used to pin outcomes in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource {
    value: f64,
}

impl FixedSource {
    /// `value` is clamped into `[0, 1)`.
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0 - f64::EPSILON),
        }
    }

    /// Always draws `0.5`.
    pub fn midpoint() -> Self {
        Self::new(0.5)
    }
}

impl RandomSource for FixedSource {
    fn next_unit(&mut self) -> f64 {
        self.value
    }
}

/// Reorders `items` by one random key per element (stable on ties).
pub fn shuffle<T>(items: &mut Vec<T>, source: &mut dyn RandomSource) {
    if items.len() < 2 {
        return;
    }
    let mut keyed: Vec<(f64, T)> = items
        .drain(..)
        .map(|item| (source.next_unit(), item))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}

/// Maps one draw onto `0..len`. `None` when `len == 0`.
pub fn pick_index(len: usize, source: &mut dyn RandomSource) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let idx = (source.next_unit() * len as f64) as usize;
    Some(idx.min(len - 1))
}
