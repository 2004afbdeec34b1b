//! # Perlin Noise Primitive
//!
//! Smooth, deterministic 2D coherent noise.
//!
//! ## Why a fixed permutation?
//!
//! The seed never touches the lattice. Every octave samples the same field
//! at a seed-derived offset (see [`crate::field`]), so terrain from one seed
//! lines up across chunk borders and across sessions.
//!
//! ## Determinism Guarantee
//!
//! The primitive is plain `f64` arithmetic over a constant table. Given the
//! same input it returns **exactly** the same bits on any platform.

use serde::{Deserialize, Serialize};

/// World seed for deterministic generation.
///
/// All per-octave offsets derive from this seed. Any `u64` is valid for
/// generation, but TOML integers are signed 64-bit, so a seed stored in a
/// config file must not exceed `i64::MAX`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Ken Perlin's reference permutation, doubled to avoid index wrapping.
const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243,
    141, 128, 195, 78, 66, 215, 61, 156, 180,
];

/// 2D improved Perlin noise.
///
/// Produces smooth, continuous values in approximately `[0, 1]`,
/// exactly `0.5` on integer lattice points.
///
/// # Example
///
/// ```rust
/// use strata_procedural::PerlinNoise;
///
/// let noise = PerlinNoise::new();
/// let value = noise.sample(12.3, 45.6);
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Clone)]
pub struct PerlinNoise {
    perm: [u8; 512],
}

impl PerlinNoise {
    /// Builds the doubled permutation table.
    #[must_use]
    pub fn new() -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = PERMUTATION[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn hash(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }

    /// Samples noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in approximately `[0, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();

        // Two's-complement masking wraps negative cells onto the lattice.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let xi = (x_floor as i64 & 255) as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let yi = (y_floor as i64 & 255) as usize;

        let xf = x - x_floor;
        let yf = y - y_floor;
        let u = fade(xf);
        let v = fade(yf);

        let a = self.hash(xi) + yi;
        let b = self.hash(xi + 1) + yi;

        let bottom = lerp(
            grad(self.hash(a), xf, yf),
            grad(self.hash(b), xf - 1.0, yf),
            u,
        );
        let top = lerp(
            grad(self.hash(a + 1), xf, yf - 1.0),
            grad(self.hash(b + 1), xf - 1.0, yf - 1.0),
            u,
        );

        (lerp(bottom, top, v) + 1.0) * 0.5
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of four diagonal gradients.
#[inline]
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = PerlinNoise::new();
        let noise2 = PerlinNoise::new();

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            assert_eq!(
                noise1.sample(x, y).to_bits(),
                noise2.sample(x, y).to_bits(),
                "Noise should be deterministic"
            );
        }
    }

    #[test]
    fn test_lattice_points_are_midpoint() {
        let noise = PerlinNoise::new();
        for i in -20..20 {
            let v = noise.sample(f64::from(i), f64::from(i * 3));
            assert!((v - 0.5).abs() < 1e-12, "lattice sample {v} should be 0.5");
        }
    }

    #[test]
    fn test_range() {
        let noise = PerlinNoise::new();

        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let y = f64::from(i) * 0.13 - 650.0;
            let value = noise.sample(x, y);

            assert!(
                (0.0..=1.0).contains(&value),
                "Value {value} out of range at ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_continuity() {
        let noise = PerlinNoise::new();

        let x = 100.37;
        let y = 100.81;
        let delta = 0.001;

        let v1 = noise.sample(x, y);
        let v2 = noise.sample(x + delta, y);
        let v3 = noise.sample(x, y + delta);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_large_negative_coordinates() {
        let noise = PerlinNoise::new();
        let far = noise.sample(-99_999.25, -4_321.75);
        let wrapped = noise.sample(-99_999.25 + 256.0 * 400.0, -4_321.75 + 256.0 * 20.0);

        assert!((0.0..=1.0).contains(&far));
        assert!((far - wrapped).abs() < 1e-9, "lattice repeats every 256 cells");
    }
}
