//! Sub-pixel jitter table.
//!
//! The renderer never draws random numbers on the hot path: every jitter value
//! is a lookup into a square table of `u32` generated once from a seeded
//! ChaCha20 PRNG. Lookups are keyed by pixel, frame index and sample index, so
//! a frame is fully reproducible from its inputs.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Default edge length of the table.
pub const DEFAULT_NOISE_SIZE: u32 = 128;
/// Largest edge length a table is built with; bigger requests are clamped.
pub const MAX_NOISE_SIZE: u32 = 4096;

/// Square table of random `u32` values.
#[derive(Debug, Clone)]
pub struct NoiseTable {
    size: u32,
    values: Vec<u32>,
}

impl NoiseTable {
    /// Fill a `size * size` table from a ChaCha20 stream seeded with `seed`.
    ///
    /// `size` is clamped to `[1, MAX_NOISE_SIZE]`.
    pub fn new(seed: u64, size: u32) -> Self {
        let (size, count) = table_extent(size);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let values = (0..count).map(|_| rng.random::<u32>()).collect();
        Self { size, values }
    }

    /// Table whose every lookup lands on the pixel center.
    pub fn centered(size: u32) -> Self {
        let (size, count) = table_extent(size);
        Self {
            size,
            values: vec![1 << 31; count],
        }
    }

    /// Raw value at wrapped table coordinates.
    #[inline]
    fn value(&self, x: u32, y: u32) -> u32 {
        let size = self.size as usize;
        let idx = (y as usize % size) * size + x as usize % size;
        self.values[idx]
    }

    /// Sub-pixel offset in `[-0.5, 0.5)^2` for pixel `(x, y)`.
    ///
    /// The frame and sample indices scroll the lookup through the table so
    /// successive samples of the same pixel land on different values.
    #[inline]
    pub fn jitter(&self, x: u32, y: u32, frame_index: u64, sample: u64) -> Vec2 {
        let shift = frame_index
            .wrapping_mul(0x9E37_79B9)
            .wrapping_add(sample.wrapping_mul(0x85EB_CA6B));
        let sx = (shift % self.size as u64) as u32;
        let sy = ((shift >> 16) % self.size as u64) as u32;

        let jx = to_unit(self.value(x.wrapping_add(sx), y.wrapping_add(sy)));
        // second channel from the diagonally opposite quadrant
        let half = self.size / 2;
        let jy = to_unit(self.value(
            x.wrapping_add(sx).wrapping_add(half),
            y.wrapping_add(sy).wrapping_add(half + 1),
        ));
        Vec2::new(jx - 0.5, jy - 0.5)
    }
}

/// Clamped edge length and entry count of a table.
fn table_extent(size: u32) -> (u32, usize) {
    let size = size.clamp(1, MAX_NOISE_SIZE);
    (size, size as usize * size as usize)
}

/// Map the top 24 bits of `v` to `[0, 1)`.
#[inline(always)]
fn to_unit(v: u32) -> f32 {
    (v >> 8) as f32 * (1.0 / 16_777_216.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_table() {
        let a = NoiseTable::new(7, 32);
        let b = NoiseTable::new(7, 32);
        let c = NoiseTable::new(8, 32);
        assert_eq!(a.values, b.values);
        assert_ne!(a.values, c.values);
    }

    #[test]
    fn jitter_stays_inside_pixel() {
        let table = NoiseTable::new(1, 16);
        for y in 0..40 {
            for x in 0..40 {
                for sample in 1..4 {
                    let j = table.jitter(x, y, 3, sample);
                    assert!(j.x >= -0.5 && j.x < 0.5);
                    assert!(j.y >= -0.5 && j.y < 0.5);
                }
            }
        }
    }

    #[test]
    fn jitter_varies_across_samples() {
        let table = NoiseTable::new(42, DEFAULT_NOISE_SIZE);
        let a = table.jitter(10, 10, 0, 1);
        let b = table.jitter(10, 10, 0, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn oversized_table_is_clamped() {
        let table = NoiseTable::centered(70_000);
        assert_eq!(table.size, MAX_NOISE_SIZE);
        assert_eq!(table.values.len(), (MAX_NOISE_SIZE * MAX_NOISE_SIZE) as usize);
        assert_eq!(table.jitter(u32::MAX, u32::MAX, u64::MAX, u64::MAX), Vec2::ZERO);

        let zero = NoiseTable::new(0, 0);
        assert_eq!(zero.values.len(), 1);
    }

    #[test]
    fn centered_table_has_no_jitter() {
        let table = NoiseTable::centered(4);
        assert_eq!(table.jitter(123, 9, 5, 77), Vec2::ZERO);
    }
}
