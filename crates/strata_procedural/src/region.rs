//! # Region Classification
//!
//! Maps normalized heights to colours through an ordered threshold table.
//!
//! Regions are matched first-wins against ascending thresholds, so the
//! table is validated once at construction instead of being sorted:
//!
//! - at least one region
//! - thresholds finite, within `[0, 1]`, non-decreasing
//! - the last threshold is `1.0`, so every clamped height is covered

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::field::HeightGrid;

/// Linear RGBA colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
#[repr(C)]
pub struct Colour {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Colour {
    /// Fully transparent black.
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Creates a colour from all four channels.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque colour.
    #[inline]
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Quantizes to 8 bits per channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl From<[f32; 4]> for Colour {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Colour> for [f32; 4] {
    fn from(c: Colour) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// One classification rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Display name.
    pub name: String,
    /// Upper height bound (inclusive) of this region.
    pub height: f32,
    /// Colour assigned to matching points.
    pub colour: Colour,
}

impl Region {
    /// Creates a region.
    #[must_use]
    pub fn new(name: impl Into<String>, height: f32, colour: Colour) -> Self {
        Self {
            name: name.into(),
            height,
            colour,
        }
    }
}

/// Validated, ascending list of regions.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Validates and wraps an ordered region list.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidRegions`] if the list is empty, has a
    /// threshold outside `[0, 1]`, is not ascending, or stops short of `1.0`.
    pub fn new(regions: Vec<Region>) -> TerrainResult<Self> {
        let Some(last) = regions.last() else {
            return Err(TerrainError::InvalidRegions("no regions".to_string()));
        };
        if last.height < 1.0 {
            return Err(TerrainError::InvalidRegions(format!(
                "last region '{}' ends at {}, heights up to 1.0 would be unclassified",
                last.name, last.height
            )));
        }

        let mut previous = f32::NEG_INFINITY;
        for region in &regions {
            if !(0.0..=1.0).contains(&region.height) {
                return Err(TerrainError::InvalidRegions(format!(
                    "region '{}' threshold {} outside [0, 1]",
                    region.name, region.height
                )));
            }
            if region.height < previous {
                return Err(TerrainError::InvalidRegions(format!(
                    "region '{}' threshold {} is below the previous threshold {previous}",
                    region.name, region.height
                )));
            }
            previous = region.height;
        }

        Ok(Self { regions })
    }

    /// Classic landmass palette: deep water through snow.
    #[must_use]
    pub fn landmass() -> Self {
        Self {
            regions: vec![
                Region::new("Deep Water", 0.3, Colour::rgb(0.20, 0.38, 0.78)),
                Region::new("Shallow Water", 0.4, Colour::rgb(0.21, 0.40, 0.85)),
                Region::new("Sand", 0.45, Colour::rgb(0.82, 0.82, 0.49)),
                Region::new("Grass", 0.55, Colour::rgb(0.34, 0.60, 0.10)),
                Region::new("Grass Upland", 0.6, Colour::rgb(0.24, 0.42, 0.07)),
                Region::new("Rock", 0.7, Colour::rgb(0.35, 0.27, 0.24)),
                Region::new("Rock Upland", 0.9, Colour::rgb(0.29, 0.23, 0.22)),
                Region::new("Snow", 1.0, Colour::WHITE),
            ],
        }
    }

    /// Regions in match order.
    #[inline]
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Index of the first region covering `height` after clamping to `[0, 1]`.
    ///
    /// `None` only for NaN heights.
    #[inline]
    #[must_use]
    pub fn region_index(&self, height: f32) -> Option<usize> {
        let clamped = height.clamp(0.0, 1.0);
        self.regions.iter().position(|r| clamped <= r.height)
    }

    /// Colours every point of `grid`, row-major like the grid itself.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::UnclassifiedHeight`] for the first point no
    /// region covers.
    pub fn classify(&self, grid: &HeightGrid) -> TerrainResult<Vec<Colour>> {
        let width = grid.width().max(1);
        grid.values()
            .iter()
            .enumerate()
            .map(|(i, &height)| {
                self.region_index(height)
                    .map(|idx| self.regions[idx].colour)
                    .ok_or(TerrainError::UnclassifiedHeight {
                        x: i % width,
                        y: i / width,
                        height,
                    })
            })
            .collect()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::landmass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_band() -> RegionTable {
        RegionTable::new(vec![
            Region::new("Water", 0.4, Colour::rgb(0.0, 0.0, 1.0)),
            Region::new("Land", 0.8, Colour::rgb(0.0, 1.0, 0.0)),
            Region::new("Peak", 1.0, Colour::WHITE),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let table = three_band();
        assert_eq!(table.region_index(0.0), Some(0));
        assert_eq!(table.region_index(0.4), Some(0));
        assert_eq!(table.region_index(0.41), Some(1));
        assert_eq!(table.region_index(0.8), Some(1));
        assert_eq!(table.region_index(0.99), Some(2));
    }

    #[test]
    fn test_out_of_range_heights_are_clamped() {
        let table = three_band();
        assert_eq!(table.region_index(-0.3), Some(0));
        assert_eq!(table.region_index(1.2), Some(2));
    }

    #[test]
    fn test_nan_is_unclassified() {
        let table = three_band();
        assert_eq!(table.region_index(f32::NAN), None);

        let grid = HeightGrid::from_values(2, 2, vec![0.1, 0.2, f32::NAN, 0.9]).unwrap();
        match table.classify(&grid) {
            Err(TerrainError::UnclassifiedHeight { x, y, .. }) => assert_eq!((x, y), (0, 1)),
            other => panic!("expected unclassified error, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_keeps_grid_indexing() {
        let table = three_band();
        let grid = HeightGrid::from_values(3, 2, vec![0.1, 0.5, 0.9, 0.9, 0.5, 0.1]).unwrap();
        let colours = table.classify(&grid).unwrap();

        assert_eq!(colours.len(), grid.len());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let h = grid.get(x, y).unwrap();
                let expected = table.regions()[table.region_index(h).unwrap()].colour;
                assert_eq!(colours[y * grid.width() + x], expected, "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_monotonic_region_choice() {
        let table = RegionTable::landmass();
        let mut previous = 0;
        for step in 0..=1000 {
            let h = step as f32 / 1000.0;
            let idx = table.region_index(h).unwrap();
            assert!(idx >= previous, "index fell from {previous} to {idx} at {h}");
            previous = idx;
        }
    }

    #[test]
    fn test_rejects_malformed_tables() {
        assert!(matches!(
            RegionTable::new(Vec::new()),
            Err(TerrainError::InvalidRegions(_))
        ));
        assert!(matches!(
            RegionTable::new(vec![
                Region::new("High", 0.9, Colour::WHITE),
                Region::new("Low", 0.2, Colour::WHITE),
                Region::new("Top", 1.0, Colour::WHITE),
            ]),
            Err(TerrainError::InvalidRegions(_))
        ));
        assert!(matches!(
            RegionTable::new(vec![Region::new("Short", 0.7, Colour::WHITE)]),
            Err(TerrainError::InvalidRegions(_))
        ));
        assert!(matches!(
            RegionTable::new(vec![Region::new("Over", 1.5, Colour::WHITE)]),
            Err(TerrainError::InvalidRegions(_))
        ));
    }

    #[test]
    fn test_landmass_is_valid() {
        let table = RegionTable::landmass();
        assert_eq!(RegionTable::new(table.regions().to_vec()), Ok(table));
    }

    #[test]
    fn test_rgba8() {
        assert_eq!(Colour::WHITE.to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(Colour::new(0.5, 0.0, 2.0, 0.0).to_rgba8(), [128, 0, 255, 0]);
    }
}
