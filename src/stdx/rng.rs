//! Tiny deterministic RNG for grid generation.
//!
//! XorShift64 with Lemire bounded sampling. Same seed, same grid: generated
//! inputs are reproducible across runs and platforms, which matters more
//! here than statistical quality.

/// Deterministic XorShift64 generator.
///
/// Not `Copy`: copying would silently duplicate the stream.
#[derive(Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Seed 0 is remapped to a non-zero constant (all-zero is a fixed point).
    #[inline]
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Next raw value. Shift triple (13, 7, 17) gives the full 2^64 - 1 period.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `[0, upper)`.
    ///
    /// # Panics
    /// Debug-panics if `upper` is 0.
    #[inline]
    pub fn next_usize(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0, "upper bound must be > 0");
        if upper.is_power_of_two() {
            return (self.next_u64() as usize) & (upper - 1);
        }
        // Lemire: multiply-high with rejection of the biased low zone.
        let upper = upper as u64;
        let threshold = upper.wrapping_neg() % upper;
        loop {
            let m = (self.next_u64() as u128) * (upper as u128);
            if (m as u64) >= threshold {
                return (m >> 64) as usize;
            }
        }
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_usize(i + 1);
            slice.swap(i, j);
        }
    }
}
