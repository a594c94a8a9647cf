//! Deterministic Randomness
//!
//! Provides deterministic random number generation for replications,
//! ensuring reproducible trajectories with the same seed.

//-----------------------------------------------------------------------------
// Imports
//-----------------------------------------------------------------------------

use rand::prelude::{RngCore, SeedableRng, StdRng};
use rand::Error as RandError;

/// A wrapper around a seeded Pseudo-Random Number Generator (PRNG)
/// so that every replication owns an isolated, replayable stream.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: StdRng,
    seed: u64,
}

impl SeededRng {
    /// Creates a new RNG instance seeded with the given 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a new RNG instance from entropy.
    /// The seed is drawn from entropy and stored, so the stream can be replayed from it.
    pub fn from_entropy() -> Self {
        let mut entropy_rng = StdRng::from_entropy();
        Self::new(entropy_rng.next_u64())
    }

    /// RNG for replication `index`: `base_seed + index` when a base seed is given, otherwise entropy.
    pub fn for_replication(base_seed: Option<u64>, index: usize) -> Self {
        match base_seed {
            Some(seed) => Self::new(seed.wrapping_add(index as u64)),
            None => Self::from_entropy(),
        }
    }

    /// Returns the seed used to initialize this RNG.
    pub fn get_seed(&self) -> u64 {
        self.seed
    }
}

// Implement RngCore so that SeededRng can be handed to any rand distribution.
impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.rng.try_fill_bytes(dest)
    }
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------
