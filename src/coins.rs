//! Verifier challenge source.
//!
//! Soundness of the sum-check reductions assumes challenges drawn
//! uniformly from F_p. The source is injectable so tests and benchmark
//! runs can pin a deterministic stream; one instance serves a whole
//! process run.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::m61_field::M61_MODULUS;

/// Source of verifier coins: uniform field elements in [0, p).
pub trait CoinSource {
    fn coin(&mut self) -> u64;

    fn coins(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.coin()).collect()
    }
}

/// Coin source backed by a seeded `StdRng`.
pub struct SeededCoins {
    rng: StdRng,
}

impl SeededCoins {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl CoinSource for SeededCoins {
    /// Mask to 61 bits and reject the single non-canonical pattern, so
    /// draws are uniform over the full field.
    fn coin(&mut self) -> u64 {
        loop {
            let v = self.rng.next_u64() & M61_MODULUS;
            if v != M61_MODULUS {
                return v;
            }
        }
    }
}
