//! # Chunk System
//!
//! Terrain is organized into square chunks keyed by integer grid
//! coordinates. A chunk of size `N` covers `N` world units per side and
//! carries `(N + 1)²` height samples, so neighbouring chunks share their
//! border row and column.
//!
//! ## Axis Convention
//!
//! A chunk's noise window is offset by `(origin.y, -origin.x)`. The swap
//! and negation line the noise up with the host's world axes; changing
//! either one tears seams between chunks.

use std::sync::Arc;

use crate::error::{TerrainError, TerrainResult};
use crate::field::{generate_noise_map, HeightGrid, NoiseSettings};
use crate::region::{Colour, RegionTable};

/// A position on the horizontal world plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPos {
    /// World X.
    pub x: f64,
    /// World Y (the host's Z axis for Y-up engines).
    pub y: f64,
}

impl WorldPos {
    /// The world origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a world position.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not world units).
    pub x: i32,
    /// Y coordinate (in chunks, not world units).
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk whose centre is nearest to `pos`.
    ///
    /// Rounds `pos / chunk_size` per axis, ties to even.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world_pos(pos: WorldPos, chunk_size: u32) -> Self {
        let size = f64::from(chunk_size);
        Self {
            x: (pos.x / size).round_ties_even() as i32,
            y: (pos.y / size).round_ties_even() as i32,
        }
    }

    /// World position of this chunk's origin: `coord * chunk_size`.
    #[inline]
    #[must_use]
    pub fn world_origin(self, chunk_size: u32) -> WorldPos {
        let size = f64::from(chunk_size);
        WorldPos::new(f64::from(self.x) * size, f64::from(self.y) * size)
    }

    /// Coordinates within `radius` chunks on both axes, row by row.
    ///
    /// Coordinates past the edge of the `i32` grid are skipped, so a
    /// neighbourhood at the world's edge is smaller than `(2r + 1)²`.
    pub fn neighbourhood(self, radius: i32) -> impl Iterator<Item = Self> {
        (-radius..=radius).flat_map(move |dy| {
            (-radius..=radius).filter_map(move |dx| {
                Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
            })
        })
    }
}

/// A completed chunk: heights plus a parallel colour array.
///
/// Produced once per coordinate and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkPayload {
    coord: ChunkCoord,
    heights: HeightGrid,
    colours: Vec<Colour>,
}

impl ChunkPayload {
    /// Pairs a height grid with its colours.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::GridMismatch`] if the point counts differ.
    pub fn new(coord: ChunkCoord, heights: HeightGrid, colours: Vec<Colour>) -> TerrainResult<Self> {
        if heights.len() != colours.len() {
            return Err(TerrainError::GridMismatch {
                heights: heights.len(),
                colours: colours.len(),
            });
        }
        Ok(Self {
            coord,
            heights,
            colours,
        })
    }

    /// The chunk this payload belongs to.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Normalized heights.
    #[inline]
    #[must_use]
    pub const fn heights(&self) -> &HeightGrid {
        &self.heights
    }

    /// Colours, indexed like [`Self::heights`].
    #[inline]
    #[must_use]
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// Colour at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn colour_at(&self, x: usize, y: usize) -> Option<Colour> {
        if x < self.heights.width() && y < self.heights.height() {
            Some(self.colours[y * self.heights.width() + x])
        } else {
            None
        }
    }

    /// Splits into coordinate, heights and colours.
    #[must_use]
    pub fn into_parts(self) -> (ChunkCoord, HeightGrid, Vec<Colour>) {
        (self.coord, self.heights, self.colours)
    }
}

/// Builds chunk payloads from immutable generation parameters.
///
/// Cheap to share across worker threads behind an `Arc`.
#[derive(Clone, Debug)]
pub struct ChunkGenerator {
    settings: NoiseSettings,
    regions: Arc<RegionTable>,
    chunk_size: u32,
}

impl ChunkGenerator {
    /// Creates a generator after validating every parameter.
    ///
    /// # Errors
    ///
    /// Returns the noise validation error, or
    /// [`TerrainError::InvalidChunkSize`] for a zero chunk size.
    pub fn new(settings: NoiseSettings, regions: RegionTable, chunk_size: u32) -> TerrainResult<Self> {
        settings.validate()?;
        if chunk_size == 0 {
            return Err(TerrainError::InvalidChunkSize);
        }
        Ok(Self {
            settings,
            regions: Arc::new(regions),
            chunk_size,
        })
    }

    /// Noise parameters.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Region table.
    #[inline]
    #[must_use]
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Chunk edge length in world units.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Points per grid side: `chunk_size + 1`.
    #[inline]
    #[must_use]
    pub const fn grid_side(&self) -> usize {
        self.chunk_size as usize + 1
    }

    /// Noise-space offset of a chunk whose origin is `world_position`.
    #[inline]
    #[must_use]
    pub fn noise_offset(world_position: WorldPos) -> WorldPos {
        WorldPos::new(world_position.y, -world_position.x)
    }

    /// Generates the payload for `coord`, whose origin is `world_position`.
    ///
    /// # Errors
    ///
    /// Propagates noise and classification errors; nothing is retained on
    /// failure.
    pub fn generate(&self, coord: ChunkCoord, world_position: WorldPos) -> TerrainResult<ChunkPayload> {
        let side = self.grid_side();
        let heights = generate_noise_map(
            side,
            side,
            &self.settings,
            Self::noise_offset(world_position),
        )?;
        let colours = self.regions.classify(&heights)?;
        ChunkPayload::new(coord, heights, colours)
    }

    /// Generates `coord` at its grid origin.
    ///
    /// # Errors
    ///
    /// See [`Self::generate`].
    pub fn generate_at(&self, coord: ChunkCoord) -> TerrainResult<ChunkPayload> {
        self.generate(coord, coord.world_origin(self.chunk_size))
    }
}
