//! # Terrain Error Types
//!
//! All errors that can occur while synthesizing terrain.

use thiserror::Error;

/// Errors that can occur in terrain synthesis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// Noise scale must be a finite value greater than zero.
    #[error("invalid noise scale {0}: must be finite and > 0")]
    InvalidScale(f64),

    /// Persistence outside [0, 1] or lacunarity below 1.
    #[error("invalid octave progression: persistence {persistence}, lacunarity {lacunarity}")]
    InvalidOctaves {
        /// Per-octave amplitude decay.
        persistence: f64,
        /// Per-octave frequency growth.
        lacunarity: f64,
    },

    /// World offset contains NaN or infinity.
    #[error("world offset ({x}, {y}) is not finite")]
    InvalidOffset {
        /// Offset X.
        x: f64,
        /// Offset Y.
        y: f64,
    },

    /// Region table is empty, unsorted, or does not reach 1.0.
    #[error("invalid region table: {0}")]
    InvalidRegions(String),

    /// Chunk size of zero.
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    /// No region threshold covers a height value.
    #[error("height {height} at ({x}, {y}) matches no region")]
    UnclassifiedHeight {
        /// Grid X.
        x: usize,
        /// Grid Y.
        y: usize,
        /// The offending height.
        height: f32,
    },

    /// Height and colour grids disagree on point count.
    #[error("grid mismatch: {heights} heights, {colours} colours")]
    GridMismatch {
        /// Height point count.
        heights: usize,
        /// Colour point count.
        colours: usize,
    },

    /// A chunk snapshot could not be decoded.
    #[error("corrupt chunk snapshot: {0}")]
    CorruptSnapshot(String),

    /// Snapshot file I/O failed.
    #[error("snapshot i/o failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for TerrainError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
