//! Deterministic random source.
//!
//! A 32-bit mulberry32 generator. Given the same seed and the same sequence of
//! calls it yields the same values on every platform, independent of wall
//! clock and OS entropy. Every stochastic decision of the simulation draws
//! from one instance of this type in a fixed call order.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Seedable generator of uniform, approximately-normal and Bernoulli draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    seed: u32,
    state: u32,
}

impl DeterministicRng {
    /// Creates a generator positioned at the start of `seed`'s sequence.
    pub fn seed(seed: u32) -> Self {
        Self { seed, state: seed }
    }

    /// The seed this generator was created with.
    pub fn initial_seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next uniform value in `[0, 1)`.
    #[inline]
    pub fn next(&mut self) -> f64 {
        f64::from(self.step()) / TWO_POW_32
    }

    /// Uniform value in `[min, max)`.
    #[inline]
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next()
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    ///
    /// Computed in `i128` so the full `i64` range does not overflow.
    pub fn integer(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min <= max, "integer range {min}..={max} is empty");
        let (lo, hi) = (i128::from(min), i128::from(max));
        let span = (hi - lo + 1) as f64;
        let offset = (self.next() * span).floor() as i128;
        (lo + offset).clamp(lo, hi) as i64
    }

    /// Approximately normal draw: six uniforms summed, centred and scaled.
    ///
    /// Not a true Gaussian. The construction is kept exactly so traces replay
    /// bit-for-bit; the tails are bounded at `mean ± 3 * stddev`.
    pub fn approx_normal(&mut self, mean: f64, stddev: f64) -> f64 {
        let mut sum = 0.0;
        for _ in 0..6 {
            sum += self.next();
        }
        mean + stddev * (sum - 3.0)
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next() < p
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for DeterministicRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seed(u32::from_le_bytes(seed))
    }
}
