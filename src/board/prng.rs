/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Default state used by [`XoShiRo::new`].
const SEEDS: [u64; 4] = [
    0b1001000111000101101010110011110011101011111111010101101001110001,
    0b0000011010111010001001010011101110011101110110001001011111001101,
    0b1000000000010101101101011110010110011100110000100111010111101001,
    0b1111100011110100001001111111110001010100000100011101111001010011,
];

/// A pseudo-random number generator using the "xoshiro256**" algorithm.
///
/// Random setups and random piece picks go through this generator so that a seed always
/// reproduces the same result.
///
/// Adapted from <https://prng.di.unimi.it/xoshiro256starstar.c>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XoShiRo([u64; 4]);

impl XoShiRo {
    /// Construct a new generator from the library's seeds.
    #[inline(always)]
    pub const fn new() -> Self {
        Self(SEEDS)
    }

    /// Construct a generator whose whole state is derived from a single `seed`.
    ///
    /// The state is expanded with splitmix64, as recommended by the xoshiro authors.
    ///
    /// # Example
    /// ```
    /// # use xchess::XoShiRo;
    /// let mut a = XoShiRo::from_seed(960);
    /// let mut b = XoShiRo::from_seed(960);
    /// assert_eq!(a.next_u64(), b.next_u64());
    /// ```
    pub const fn from_seed(seed: u64) -> Self {
        let mut state = [0; 4];
        let mut x = seed;
        let mut i = 0;
        while i < 4 {
            x = x.wrapping_add(0x9E3779B97F4A7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
            state[i] = z ^ (z >> 31);
            i += 1;
        }
        Self(state)
    }

    /// Next number in the sequence.
    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let s = &mut self.0;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        result
    }

    /// A number in `0..n`. Returns `0` when `n` is `0`.
    #[inline(always)]
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        (self.next_u64() % n as u64) as usize
    }

    /// `true` with probability `p`.
    #[inline(always)]
    pub fn chance(&mut self, p: f64) -> bool {
        ((self.next_u64() >> 11) as f64 / (1u64 << 53) as f64) < p
    }
}

impl Default for XoShiRo {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
