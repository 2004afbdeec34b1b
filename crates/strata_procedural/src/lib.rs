//! # Strata Procedural Generation
//!
//! Deterministic terrain synthesis for streamed, endless height maps.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and parameters give bit-identical grids
//! 2. **Chunked**: Terrain is generated in fixed-size square chunks
//! 3. **Seamless**: Global normalization lets chunks meet without seams
//! 4. **Fail fast**: Invalid parameters are rejected before any noise runs
//!
//! ## Core Components
//!
//! - `PerlinNoise`: 2D coherent noise primitive
//! - `generate_noise_map`: Five-octave normalized height grid
//! - `RegionTable`: Height thresholds to colours
//! - `ChunkGenerator`: One `ChunkPayload` per chunk coordinate
//!
//! ## Example
//!
//! ```rust
//! use strata_procedural::{ChunkCoord, ChunkGenerator, NoiseSettings, RegionTable, WorldSeed};
//!
//! let generator = ChunkGenerator::new(
//!     NoiseSettings::with_seed(WorldSeed::new(12345)),
//!     RegionTable::landmass(),
//!     64,
//! )?;
//!
//! let payload = generator.generate_at(ChunkCoord::new(1, 0))?;
//! assert_eq!(payload.heights().len(), 65 * 65);
//! # Ok::<(), strata_procedural::TerrainError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod error;
pub mod field;
pub mod noise;
pub mod region;
pub mod snapshot;

pub use chunk::{ChunkCoord, ChunkGenerator, ChunkPayload, WorldPos};
pub use error::{TerrainError, TerrainResult};
pub use field::{generate_noise_map, HeightGrid, NoiseSettings, NormalizeMode, GLOBAL_HEADROOM, OCTAVES};
pub use noise::{PerlinNoise, WorldSeed};
pub use region::{Colour, Region, RegionTable};
