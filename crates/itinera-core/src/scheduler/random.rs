//! Random source used for tie-breaking between eligible activities.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies the uniform choices the scheduler makes.
///
/// Tests inject a deterministic implementation; production code uses
/// [`DefaultRandom`].
pub trait Random {
    /// Returns an index uniformly distributed over `0..len`. Callers never
    /// pass `len == 0`. The scheduler treats an out-of-range answer as `0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// A [`Random`] backed by the standard RNG.
#[derive(Debug, Clone)]
pub struct DefaultRandom {
    rng: StdRng,
}

impl DefaultRandom {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for DefaultRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl Random for DefaultRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index called with an empty range");
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}
