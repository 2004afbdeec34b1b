//! # Renderer Boundary
//!
//! The coordinator never builds meshes or textures. It asks the host for a
//! placeholder when a chunk is requested and later hands that placeholder
//! the finished payload. Both calls happen on the coordinator's thread.

use strata_procedural::{ChunkCoord, ChunkPayload, WorldPos};

/// Host-side consumer of streamed chunks.
pub trait TerrainRenderer {
    /// Whatever the host uses to represent a chunk in its scene.
    type Placeholder;

    /// Creates an empty chunk object at `origin`.
    fn create_placeholder(&mut self, coord: ChunkCoord, origin: WorldPos) -> Self::Placeholder;

    /// Applies the generated heights and colours to a placeholder.
    fn apply_payload(&mut self, placeholder: &mut Self::Placeholder, payload: ChunkPayload);

    /// Called once when a chunk could not be generated. Defaults to nothing.
    fn chunk_failed(&mut self, _placeholder: &mut Self::Placeholder, _coord: ChunkCoord, _reason: &str) {}
}
