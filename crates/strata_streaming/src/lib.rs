//! # Strata Streaming
//!
//! Keeps a 3x3 neighbourhood of terrain chunks around a moving viewer,
//! generating them on background threads and handing finished payloads
//! back on the caller's thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐  GenerationJob   ┌──────────────┐
//! │ StreamingCoordinator │ ───────────────▶ │  WorkerPool  │
//! │  (caller's thread)   │                  │  N threads   │
//! │                      │ ◀─── drain ───── │ ResultQueue  │
//! └──────────┬───────────┘                  └──────────────┘
//!            │ create_placeholder / apply_payload
//!            ▼
//!     TerrainRenderer (host)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use strata_procedural::{ChunkCoord, ChunkPayload, WorldPos};
//! use strata_streaming::{StrataConfig, TerrainRenderer};
//!
//! struct Counter(usize);
//!
//! impl TerrainRenderer for Counter {
//!     type Placeholder = ChunkCoord;
//!
//!     fn create_placeholder(&mut self, coord: ChunkCoord, _origin: WorldPos) -> ChunkCoord {
//!         coord
//!     }
//!
//!     fn apply_payload(&mut self, _placeholder: &mut ChunkCoord, _payload: ChunkPayload) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let config = StrataConfig::from_toml_str("chunk_size = 16")?;
//! let mut world = config.build(Counter(0))?;
//! world.tick(WorldPos::ORIGIN);
//! assert_eq!(world.known_count(), 9);
//! # Ok::<(), strata_streaming::StreamingError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod pool;
pub mod queue;
pub mod renderer;

pub use config::{StrataConfig, DEFAULT_CHUNK_SIZE};
pub use coordinator::{
    ChunkState, StreamingConfig, StreamingCoordinator, StreamingStats, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_UPDATE_THRESHOLD, VIEW_RADIUS,
};
pub use error::{StreamingError, StreamingResult};
pub use pool::{ChunkSource, GenerationJob, WorkerPool};
pub use queue::{ChunkMessage, ResultQueue};
pub use renderer::TerrainRenderer;
