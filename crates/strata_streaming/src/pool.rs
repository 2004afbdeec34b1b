//! # Chunk Worker Pool
//!
//! A fixed set of named threads pulling [`GenerationJob`]s from a
//! `crossbeam` channel and pushing [`ChunkMessage`]s onto the
//! [`ResultQueue`].
//!
//! Concurrency is capped by the thread count; extra jobs wait in the
//! channel. A job that errors or panics is retried up to `max_attempts`
//! times and then reported as [`ChunkMessage::Failed`]. The worker thread
//! itself survives and moves on to the next job.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use strata_procedural::{ChunkCoord, ChunkGenerator, ChunkPayload, TerrainResult, WorldPos};

use crate::error::{StreamingError, StreamingResult};
use crate::queue::{ChunkMessage, ResultQueue};

/// Something that can build a chunk payload off-thread.
pub trait ChunkSource: Send + Sync + 'static {
    /// Chunk edge length in world units.
    fn chunk_size(&self) -> u32;

    /// Builds the payload for `coord`, whose world origin is `origin`.
    ///
    /// # Errors
    ///
    /// Any generation error; it is contained by the worker.
    fn generate(&self, coord: ChunkCoord, origin: WorldPos) -> TerrainResult<ChunkPayload>;
}

impl ChunkSource for ChunkGenerator {
    fn chunk_size(&self) -> u32 {
        ChunkGenerator::chunk_size(self)
    }

    fn generate(&self, coord: ChunkCoord, origin: WorldPos) -> TerrainResult<ChunkPayload> {
        ChunkGenerator::generate(self, coord, origin)
    }
}

/// One unit of background work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationJob {
    /// Chunk to generate.
    pub coord: ChunkCoord,
    /// World origin of that chunk.
    pub origin: WorldPos,
}

/// Bounded pool of chunk generation threads.
pub struct WorkerPool {
    /// Job sender; `None` once shutdown has begun.
    job_tx: Option<Sender<GenerationJob>>,
    /// Worker handles, joined on drop.
    workers: Vec<JoinHandle<()>>,
    /// Tells workers to skip queued jobs during shutdown.
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Starts `threads` workers feeding `results`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidConfig`] for zero threads or zero
    /// attempts, or [`StreamingError::WorkerSpawn`] if the OS refuses a
    /// thread. Already started workers are stopped again.
    pub fn spawn(
        source: Arc<dyn ChunkSource>,
        results: ResultQueue,
        threads: usize,
        max_attempts: u32,
    ) -> StreamingResult<Self> {
        if threads == 0 {
            return Err(StreamingError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if max_attempts == 0 {
            return Err(StreamingError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let (job_tx, job_rx) = unbounded::<GenerationJob>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut pool = Self {
            job_tx: Some(job_tx),
            workers: Vec::with_capacity(threads),
            shutdown: Arc::clone(&shutdown),
        };

        for index in 0..threads {
            let source = Arc::clone(&source);
            let results = results.clone();
            let job_rx = job_rx.clone();
            let shutdown = Arc::clone(&shutdown);

            let handle = std::thread::Builder::new()
                .name(format!("strata-chunk-{index}"))
                .spawn(move || run_worker(&*source, &job_rx, &results, &shutdown, max_attempts))
                .map_err(|e| StreamingError::WorkerSpawn(e.to_string()))?;
            pool.workers.push(handle);
        }

        tracing::info!(threads, max_attempts, "chunk worker pool started");
        Ok(pool)
    }

    /// Number of worker threads.
    #[inline]
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job for the next free worker.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::PoolClosed`] if every worker has exited.
    pub fn dispatch(&self, job: GenerationJob) -> StreamingResult<()> {
        let tx = self.job_tx.as_ref().ok_or(StreamingError::PoolClosed)?;
        tx.send(job).map_err(|_| StreamingError::PoolClosed)
    }

    /// Stops every worker and waits for them. Queued jobs that have not
    /// started are discarded; later [`WorkerPool::dispatch`] calls fail.
    pub fn shutdown(&mut self) {
        if self.job_tx.is_none() {
            return;
        }
        self.shutdown.store(true, Ordering::Release);
        // Disconnect the channel so idle workers wake up and exit.
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("chunk worker exited by panic");
            }
        }
        tracing::info!("chunk worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    source: &dyn ChunkSource,
    jobs: &Receiver<GenerationJob>,
    results: &ResultQueue,
    shutdown: &AtomicBool,
    max_attempts: u32,
) {
    while let Ok(job) = jobs.recv() {
        if shutdown.load(Ordering::Acquire) {
            break;
        }
        results.push(run_job(source, job, max_attempts));
    }
}

/// Runs one job to a final message, retrying failed attempts.
fn run_job(source: &dyn ChunkSource, job: GenerationJob, max_attempts: u32) -> ChunkMessage {
    let mut reason = String::new();

    for attempt in 1..=max_attempts {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.generate(job.coord, job.origin)));
        match outcome {
            Ok(Ok(payload)) => return ChunkMessage::Ready(payload),
            Ok(Err(err)) => reason = err.to_string(),
            Err(panic_payload) => reason = panic_message(panic_payload.as_ref()),
        }
        tracing::warn!(
            x = job.coord.x,
            y = job.coord.y,
            attempt,
            max_attempts,
            %reason,
            "chunk generation attempt failed"
        );
    }

    ChunkMessage::Failed {
        coord: job.coord,
        attempts: max_attempts,
        reason,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: <non-string payload>".to_string()
    }
}
