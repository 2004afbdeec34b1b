//! # Noise Field
//!
//! Multi-octave height maps built from [`PerlinNoise`].
//!
//! ## Octave Offsets
//!
//! A `ChaCha8` stream seeded from the [`WorldSeed`] yields one integer
//! offset pair per octave in `[-100000, 100000)`. The caller's world offset
//! is added on X and subtracted on Y, so neighbouring chunks sample one
//! continuous field.
//!
//! ## Normalization
//!
//! ```text
//! Global:  h = (noise + 1) / (2 * max_possible / 1.75)
//! Local:   h = inverse_lerp(grid_min, grid_max, noise)
//! ```
//!
//! `Global` depends only on the octave progression, never on the samples,
//! which is what lets independently generated chunks meet without seams.
//! The 1.75 headroom is empirical: a few values may land outside `[0, 1]`
//! when persistence is high. That is expected, not a bug.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::chunk::WorldPos;
use crate::error::{TerrainError, TerrainResult};
use crate::noise::{PerlinNoise, WorldSeed};

/// Number of octaves summed per sample.
pub const OCTAVES: usize = 5;

/// Headroom divisor for global normalization.
pub const GLOBAL_HEADROOM: f64 = 1.75;

/// Bound of the per-octave random offset (exclusive on the upper side).
const OFFSET_RANGE: i32 = 100_000;

/// How raw octave sums are mapped into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Fixed denominator from the amplitude progression. Seamless across chunks.
    #[default]
    Global,
    /// Stretch each grid between its own min and max. Previews only.
    Local,
}

/// Parameters of the noise field, immutable once validated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Seed for octave offsets.
    pub seed: WorldSeed,
    /// World units per noise period. Must be > 0.
    pub scale: f64,
    /// Amplitude decay per octave, in `[0, 1]`.
    pub persistence: f64,
    /// Frequency growth per octave, `>= 1`.
    pub lacunarity: f64,
    /// Constant offset added to every chunk's world offset.
    pub offset: [f64; 2],
    /// Normalization strategy.
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: WorldSeed::default(),
            scale: 50.0,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl NoiseSettings {
    /// Creates settings with the default progression for a seed.
    #[must_use]
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Checks every parameter the noise math depends on.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidScale`], [`TerrainError::InvalidOctaves`]
    /// or [`TerrainError::InvalidOffset`].
    pub fn validate(&self) -> TerrainResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TerrainError::InvalidScale(self.scale));
        }
        let persistence_ok = (0.0..=1.0).contains(&self.persistence);
        let lacunarity_ok = self.lacunarity.is_finite() && self.lacunarity >= 1.0;
        if !persistence_ok || !lacunarity_ok {
            return Err(TerrainError::InvalidOctaves {
                persistence: self.persistence,
                lacunarity: self.lacunarity,
            });
        }
        let [x, y] = self.offset;
        if !x.is_finite() || !y.is_finite() {
            return Err(TerrainError::InvalidOffset { x, y });
        }
        Ok(())
    }

    /// Sum of octave amplitudes, the global normalization numerator.
    #[must_use]
    pub fn max_possible_height(&self) -> f64 {
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..OCTAVES {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }
}

/// Row-major grid of normalized heights.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    /// Indexed as `y * width + x`.
    values: Vec<f32>,
}

impl HeightGrid {
    /// Wraps raw row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::CorruptSnapshot`] if `values` does not hold
    /// exactly `width * height` entries.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> TerrainResult<Self> {
        if values.len() != width * height {
            return Err(TerrainError::CorruptSnapshot(format!(
                "height grid {width}x{height} needs {} values, got {}",
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Grid width in points.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in points.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a zero-area grid.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Height at `(x, y)`, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Raw row-major values.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Generates a `width` x `height` normalized height grid.
///
/// `world_offset` shifts the sampled window; X is added to each octave's
/// offset and Y subtracted.
///
/// # Errors
///
/// Returns the validation error of `settings` (e.g. a non-positive scale)
/// before any noise is sampled.
///
/// # Example
///
/// ```rust
/// use strata_procedural::{generate_noise_map, NoiseSettings, WorldPos, WorldSeed};
///
/// let settings = NoiseSettings::with_seed(WorldSeed::new(7));
/// let grid = generate_noise_map(33, 33, &settings, WorldPos::ORIGIN).unwrap();
/// assert_eq!(grid.len(), 33 * 33);
/// ```
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn generate_noise_map(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
    world_offset: WorldPos,
) -> TerrainResult<HeightGrid> {
    settings.validate()?;

    let noise = PerlinNoise::new();
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed.value());

    let offset_x = settings.offset[0] + world_offset.x;
    let offset_y = settings.offset[1] + world_offset.y;

    let mut octave_offsets = [(0.0f64, 0.0f64); OCTAVES];
    for slot in &mut octave_offsets {
        let ox = f64::from(rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE)) + offset_x;
        let oy = f64::from(rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE)) - offset_y;
        *slot = (ox, oy);
    }
    let max_possible = settings.max_possible_height();

    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut raw = Vec::with_capacity(width * height);
    let mut min_raw = f64::MAX;
    let mut max_raw = f64::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut noise_height = 0.0;

            for &(ox, oy) in &octave_offsets {
                let sample_x = (x as f64 - half_width + ox) / settings.scale * frequency;
                let sample_y = (y as f64 - half_height + oy) / settings.scale * frequency;

                let value = noise.sample(sample_x, sample_y) * 2.0 - 1.0;
                noise_height += value * amplitude;

                amplitude *= settings.persistence;
                frequency *= settings.lacunarity;
            }

            min_raw = min_raw.min(noise_height);
            max_raw = max_raw.max(noise_height);
            raw.push(noise_height);
        }
    }

    let values = match settings.normalize_mode {
        NormalizeMode::Global => {
            let denominator = 2.0 * max_possible / GLOBAL_HEADROOM;
            raw.iter()
                .map(|&n| ((n + 1.0) / denominator) as f32)
                .collect()
        }
        NormalizeMode::Local => raw
            .iter()
            .map(|&n| inverse_lerp(min_raw, max_raw, n) as f32)
            .collect(),
    };

    Ok(HeightGrid {
        width,
        height,
        values,
    })
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`; 0 when `a == b`.
#[inline]
fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if (b - a).abs() <= f64::EPSILON {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(seed: u64) -> NoiseSettings {
        NoiseSettings {
            seed: WorldSeed::new(seed),
            scale: 40.0,
            ..NoiseSettings::default()
        }
    }

    #[test]
    fn test_bit_identical_for_same_inputs() {
        let s = settings(1234);
        let offset = WorldPos::new(512.0, -256.0);
        let a = generate_noise_map(65, 65, &s, offset).unwrap();
        let b = generate_noise_map(65, 65, &s, offset).unwrap();

        let bits_a: Vec<u32> = a.values().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = b.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_noise_map(17, 17, &settings(1), WorldPos::ORIGIN).unwrap();
        let b = generate_noise_map(17, 17, &settings(2), WorldPos::ORIGIN).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut s = settings(1);
        s.scale = 0.0;
        assert_eq!(
            generate_noise_map(4, 4, &s, WorldPos::ORIGIN),
            Err(TerrainError::InvalidScale(0.0))
        );
        s.scale = -3.0;
        assert!(matches!(s.validate(), Err(TerrainError::InvalidScale(_))));
        s.scale = f64::NAN;
        assert!(matches!(s.validate(), Err(TerrainError::InvalidScale(_))));
    }

    #[test]
    fn test_octave_progression_rejected() {
        let mut s = settings(1);
        s.persistence = 1.5;
        assert!(matches!(s.validate(), Err(TerrainError::InvalidOctaves { .. })));

        let mut s = settings(1);
        s.lacunarity = 0.5;
        assert!(matches!(s.validate(), Err(TerrainError::InvalidOctaves { .. })));
    }

    #[test]
    fn test_max_possible_height() {
        let s = settings(1);
        assert!((s.max_possible_height() - 1.9375).abs() < 1e-12);

        let flat = NoiseSettings {
            persistence: 0.0,
            ..settings(1)
        };
        assert!((flat.max_possible_height() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_x_offset_shifts_window() {
        // Moving the offset by whole grid steps along X slides the samples.
        let s = settings(99);
        let base = generate_noise_map(16, 4, &s, WorldPos::ORIGIN).unwrap();
        let shifted = generate_noise_map(16, 4, &s, WorldPos::new(4.0, 0.0)).unwrap();

        for y in 0..4 {
            for x in 0..12 {
                assert_eq!(shifted.get(x, y), base.get(x + 4, y));
            }
        }
    }

    #[test]
    fn test_local_normalization_spans_unit_range() {
        let s = NoiseSettings {
            normalize_mode: NormalizeMode::Local,
            ..settings(5)
        };
        let grid = generate_noise_map(64, 64, &s, WorldPos::ORIGIN).unwrap();
        let min = grid.values().iter().copied().fold(f32::MAX, f32::min);
        let max = grid.values().iter().copied().fold(f32::MIN, f32::max);

        assert!(min.abs() < 1e-6);
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_grid() {
        let grid = generate_noise_map(0, 0, &settings(1), WorldPos::ORIGIN).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.get(0, 0), None);
    }

    #[test]
    fn test_from_values_checks_length() {
        assert!(HeightGrid::from_values(2, 2, vec![0.0; 4]).is_ok());
        assert!(matches!(
            HeightGrid::from_values(2, 2, vec![0.0; 3]),
            Err(TerrainError::CorruptSnapshot(_))
        ));
    }
}
