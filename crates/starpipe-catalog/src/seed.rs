//! Injectable random-seed sources

use std::sync::atomic::{AtomicU32, Ordering};

/// Supplies default values for seed options
pub trait SeedSource: Send + Sync {
    /// Next seed
    fn next_seed(&self) -> u32;
}

/// Fresh random seed on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSeeds;

impl SeedSource for RandomSeeds {
    fn next_seed(&self) -> u32 {
        rand::random()
    }
}

/// Same seed on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSeed(pub u32);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> u32 {
        self.0
    }
}

/// Consecutive seeds starting from a base, for ensembles of runs
#[derive(Debug)]
pub struct SequentialSeeds {
    next: AtomicU32,
}

impl SequentialSeeds {
    /// Start at `base`
    #[inline]
    #[must_use]
    pub fn starting_at(base: u32) -> Self {
        Self {
            next: AtomicU32::new(base),
        }
    }
}

impl SeedSource for SequentialSeeds {
    fn next_seed(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
