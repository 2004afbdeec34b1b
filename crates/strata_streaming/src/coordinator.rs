//! # Streaming Coordinator
//!
//! Tick-driven owner of every chunk's lifecycle.
//!
//! ## Per Tick
//!
//! ```text
//! tick(viewer)
//!   ├─ moved > update_threshold since last recompute (or first tick)?
//!   │     └─ request every unknown chunk in the 3x3 around the viewer
//!   └─ drain the result queue, hand each payload to its placeholder
//! ```
//!
//! ## Chunk States
//!
//! ```text
//! (unknown) ──request──▶ Requested ──payload──▶ Delivered
//!                            └──────all attempts fail──▶ Failed
//! ```
//!
//! Nothing ever goes back to unknown: chunks are never evicted, so a
//! coordinate is generated at most once per coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_procedural::{ChunkCoord, ChunkPayload, WorldPos};

use crate::error::{StreamingError, StreamingResult};
use crate::pool::{ChunkSource, GenerationJob, WorkerPool};
use crate::queue::{ChunkMessage, ResultQueue};
use crate::renderer::TerrainRenderer;

/// Chunks requested on each side of the viewer's chunk.
pub const VIEW_RADIUS: i32 = 1;

/// Default viewer travel before the neighbourhood is rescanned.
pub const DEFAULT_UPDATE_THRESHOLD: f64 = 25.0;

/// Default attempts per chunk before it is reported failed.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Streaming parameters, immutable for a coordinator's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// World units the viewer must move before a rescan.
    pub update_threshold: f64,
    /// Background generation threads.
    pub worker_threads: usize,
    /// Generation attempts per chunk.
    pub max_attempts: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            update_threshold: DEFAULT_UPDATE_THRESHOLD,
            worker_threads: std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl StreamingConfig {
    /// Checks every streaming parameter.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> StreamingResult<()> {
        if !self.update_threshold.is_finite() || self.update_threshold < 0.0 {
            return Err(StreamingError::InvalidConfig(format!(
                "update_threshold {} must be finite and >= 0",
                self.update_threshold
            )));
        }
        if self.worker_threads == 0 {
            return Err(StreamingError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(StreamingError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Squared rescan distance.
    #[inline]
    #[must_use]
    pub fn update_threshold_squared(&self) -> f64 {
        self.update_threshold * self.update_threshold
    }
}

/// Lifecycle state of a known chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Job dispatched, no result drained yet.
    Requested,
    /// Payload drained (and applied, if the placeholder was still held).
    Delivered,
    /// Every attempt failed; the chunk is not requested again.
    Failed,
}

/// Streaming counters since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Chunks requested (jobs dispatched).
    pub requested: u64,
    /// Payloads applied to a placeholder.
    pub delivered: u64,
    /// Chunks reported failed.
    pub failed: u64,
    /// Payloads dropped because no placeholder was waiting.
    pub orphaned: u64,
    /// Neighbourhood rescans.
    pub recomputes: u64,
}

struct ChunkEntry<P> {
    state: ChunkState,
    placeholder: Option<P>,
}

/// Decides which chunks exist and merges finished ones back in.
///
/// All methods run on the owning thread; only the result queue is shared
/// with workers.
pub struct StreamingCoordinator<R: TerrainRenderer> {
    config: StreamingConfig,
    chunk_size: u32,
    renderer: R,
    chunks: HashMap<ChunkCoord, ChunkEntry<R::Placeholder>>,
    results: ResultQueue,
    pool: WorkerPool,
    last_update: Option<WorldPos>,
    stats: StreamingStats,
}

impl<R: TerrainRenderer> StreamingCoordinator<R> {
    /// Validates `config` and starts the worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidConfig`] for bad streaming
    /// parameters or a zero chunk size, or [`StreamingError::WorkerSpawn`].
    pub fn new(config: StreamingConfig, source: impl ChunkSource, renderer: R) -> StreamingResult<Self> {
        config.validate()?;
        let chunk_size = source.chunk_size();
        if chunk_size == 0 {
            return Err(StreamingError::InvalidConfig(
                "chunk size must be at least 1".to_string(),
            ));
        }

        let results = ResultQueue::new();
        let pool = WorkerPool::spawn(
            Arc::new(source),
            results.clone(),
            config.worker_threads,
            config.max_attempts,
        )?;

        Ok(Self {
            config,
            chunk_size,
            renderer,
            chunks: HashMap::new(),
            results,
            pool,
            last_update: None,
            stats: StreamingStats::default(),
        })
    }

    /// Advances one frame with the viewer at `viewer`.
    pub fn tick(&mut self, viewer: WorldPos) {
        if self.needs_update(viewer) {
            self.update_visible_chunks(viewer);
        }
        self.drain_results();
    }

    fn needs_update(&self, viewer: WorldPos) -> bool {
        self.last_update.map_or(true, |last| {
            last.distance_squared(viewer) > self.config.update_threshold_squared()
        })
    }

    /// Requests every unknown chunk in the viewer's neighbourhood,
    /// regardless of the movement threshold.
    pub fn update_visible_chunks(&mut self, viewer: WorldPos) {
        self.last_update = Some(viewer);
        self.stats.recomputes += 1;

        let centre = ChunkCoord::from_world_pos(viewer, self.chunk_size);
        tracing::debug!(x = centre.x, y = centre.y, "rescanning chunk neighbourhood");

        for coord in centre.neighbourhood(VIEW_RADIUS) {
            self.request(coord);
        }
    }

    /// Requests one chunk unless it is already known.
    fn request(&mut self, coord: ChunkCoord) {
        if self.chunks.contains_key(&coord) {
            return;
        }

        let origin = coord.world_origin(self.chunk_size);
        let placeholder = self.renderer.create_placeholder(coord, origin);
        let mut entry = ChunkEntry {
            state: ChunkState::Requested,
            placeholder: Some(placeholder),
        };

        self.stats.requested += 1;
        match self.pool.dispatch(GenerationJob { coord, origin }) {
            Ok(()) => tracing::debug!(x = coord.x, y = coord.y, "chunk requested"),
            Err(err) => {
                tracing::error!(x = coord.x, y = coord.y, %err, "chunk dispatch failed");
                entry.state = ChunkState::Failed;
                self.stats.failed += 1;
                if let Some(placeholder) = entry.placeholder.as_mut() {
                    self.renderer.chunk_failed(placeholder, coord, &err.to_string());
                }
            }
        }

        self.chunks.insert(coord, entry);
    }

    /// Forwards every queued result, oldest first.
    pub fn drain_results(&mut self) {
        for message in self.results.drain() {
            match message {
                ChunkMessage::Ready(payload) => self.deliver(payload),
                ChunkMessage::Failed {
                    coord,
                    attempts,
                    reason,
                } => self.fail(coord, attempts, &reason),
            }
        }
    }

    fn deliver(&mut self, payload: ChunkPayload) {
        let coord = payload.coord();
        let Some(entry) = self.chunks.get_mut(&coord) else {
            tracing::warn!(x = coord.x, y = coord.y, "payload for unknown chunk dropped");
            self.stats.orphaned += 1;
            return;
        };
        if entry.state != ChunkState::Requested {
            tracing::warn!(x = coord.x, y = coord.y, state = ?entry.state, "duplicate payload dropped");
            self.stats.orphaned += 1;
            return;
        }

        entry.state = ChunkState::Delivered;
        match entry.placeholder.as_mut() {
            Some(placeholder) => {
                self.renderer.apply_payload(placeholder, payload);
                self.stats.delivered += 1;
                tracing::debug!(x = coord.x, y = coord.y, "chunk delivered");
            }
            None => {
                tracing::debug!(x = coord.x, y = coord.y, "placeholder released, payload dropped");
                self.stats.orphaned += 1;
            }
        }
    }

    fn fail(&mut self, coord: ChunkCoord, attempts: u32, reason: &str) {
        tracing::warn!(x = coord.x, y = coord.y, attempts, reason, "chunk generation failed");
        self.stats.failed += 1;

        if let Some(entry) = self.chunks.get_mut(&coord) {
            entry.state = ChunkState::Failed;
            if let Some(placeholder) = entry.placeholder.as_mut() {
                self.renderer.chunk_failed(placeholder, coord, reason);
            }
        }
    }

    /// Takes back a chunk's placeholder, e.g. when the host destroyed it.
    ///
    /// The coordinate stays known; a payload that arrives later is dropped.
    pub fn release_placeholder(&mut self, coord: ChunkCoord) -> Option<R::Placeholder> {
        self.chunks.get_mut(&coord)?.placeholder.take()
    }

    /// Placeholder of a known chunk, if still held.
    #[must_use]
    pub fn placeholder(&self, coord: ChunkCoord) -> Option<&R::Placeholder> {
        self.chunks.get(&coord)?.placeholder.as_ref()
    }

    /// State of `coord`, `None` if never requested.
    #[must_use]
    pub fn state_of(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.chunks.get(&coord).map(|entry| entry.state)
    }

    /// Every requested coordinate, in no particular order.
    pub fn known_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Number of requested coordinates.
    #[must_use]
    pub fn known_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks whose result has not been drained yet.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.chunks
            .values()
            .filter(|entry| entry.state == ChunkState::Requested)
            .count()
    }

    /// Counters since construction.
    #[must_use]
    pub const fn stats(&self) -> StreamingStats {
        self.stats
    }

    /// Chunk edge length in world units.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Streaming parameters.
    #[must_use]
    pub const fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The renderer collaborator.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer collaborator.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
