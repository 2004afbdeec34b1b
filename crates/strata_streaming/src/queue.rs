//! # Result Queue
//!
//! FIFO mailbox between chunk workers and the coordinator.
//!
//! ```text
//!   worker 1 ──push──┐
//!   worker 2 ──push──┼──▶ [ Mutex<VecDeque<ChunkMessage>> ] ──drain──▶ coordinator
//!   worker N ──push──┘
//! ```
//!
//! Each push and each full drain is one critical section, so a drain sees
//! every message enqueued before it, in enqueue order, and nothing twice.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_procedural::{ChunkCoord, ChunkPayload};

/// Outcome of one generation job.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkMessage {
    /// The payload is ready for its placeholder.
    Ready(ChunkPayload),
    /// Every attempt failed.
    Failed {
        /// Chunk that could not be generated.
        coord: ChunkCoord,
        /// Attempts made before giving up.
        attempts: u32,
        /// Error or panic message of the last attempt.
        reason: String,
    },
}

impl ChunkMessage {
    /// Chunk this message is about.
    #[must_use]
    pub fn coord(&self) -> ChunkCoord {
        match self {
            Self::Ready(payload) => payload.coord(),
            Self::Failed { coord, .. } => *coord,
        }
    }
}

/// Shared handle to the result mailbox. Clones point at the same queue.
#[derive(Clone, Debug, Default)]
pub struct ResultQueue {
    inner: Arc<Mutex<VecDeque<ChunkMessage>>>,
}

impl ResultQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&self, message: ChunkMessage) {
        self.inner.lock().push_back(message);
    }

    /// Removes and returns every queued message, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<ChunkMessage> {
        let drained = std::mem::take(&mut *self.inner.lock());
        Vec::from(drained)
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
