//! Seeded random number generation for search and evaluation.
//!
//! Every random draw in the crate (transition outcomes, tie-breaks,
//! branch-exploration decisions, rollout actions) goes through a
//! [`SearchRng`]. There is no global generator.
//!
//! ```
//! use mdp_mcts::core::SearchRng;
//!
//! let mut rng = SearchRng::new(42);
//!
//! // Fork for a rollout
//! let mut rollout_rng = rng.fork();
//! assert_ne!(rng.gen_range_usize(0..1 << 40), rollout_rng.gen_range_usize(0..1 << 40));
//!
//! // Streams are keyed, so per-state searches are reproducible in any order
//! let a = SearchRng::new(7).stream(3).gen_range_usize(0..1000);
//! let b = SearchRng::new(7).stream(3).gen_range_usize(0..1000);
//! assert_eq!(a, b);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic RNG with forking.
///
/// Uses ChaCha8 for speed while keeping good statistical quality.
#[derive(Clone, Debug)]
pub struct SearchRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl SearchRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork this RNG to create an independent branch.
    ///
    /// Each fork produces a different but deterministic sequence.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(GOLDEN_GAMMA));
        Self::new(fork_seed)
    }

    /// Independent stream keyed by `key`, without advancing this generator.
    ///
    /// The same seed and key always produce the same stream, which is what
    /// lets per-state searches run in any order or on any thread.
    #[must_use]
    pub fn stream(&self, key: u64) -> Self {
        Self::new(splitmix64(self.seed ^ splitmix64(key.wrapping_add(GOLDEN_GAMMA))))
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Uniform float in `[0, 1)`.
    pub fn gen_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Choose an index with probability proportional to its weight.
    ///
    /// Weights do not need to sum to 1.0. Returns `None` if weights are
    /// empty or sum to zero.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().sum();
        if weights.is_empty() || total <= 0.0 {
            return None;
        }

        let mut threshold = self.gen_f64() * total;

        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            threshold -= weight;
            if threshold < 0.0 {
                return Some(i);
            }
        }

        // Floating point edge case - return last non-zero weight
        weights.iter().rposition(|&w| w > 0.0)
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
