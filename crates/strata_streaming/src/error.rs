//! # Streaming Error Types
//!
//! All errors that can occur while setting up or driving chunk streaming.
//! Nothing here is raised from inside `tick`; generation failures travel
//! through the result queue instead.

use strata_procedural::TerrainError;
use thiserror::Error;

/// Errors that can occur in the streaming layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamingError {
    /// Generation parameters were rejected.
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    /// Invalid configuration file or streaming parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread could not be started.
    #[error("failed to spawn chunk worker: {0}")]
    WorkerSpawn(String),

    /// The worker pool has shut down and accepts no more jobs.
    #[error("worker pool is closed")]
    PoolClosed,

    /// Reading a configuration file failed.
    #[error("config i/o failed: {0}")]
    Io(String),
}

/// Result type for streaming operations.
pub type StreamingResult<T> = Result<T, StreamingError>;
