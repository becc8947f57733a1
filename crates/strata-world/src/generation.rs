//! Background chunk generation on a fixed pool of worker threads.
//!
//! Jobs are plain coordinates. Each worker runs the shared
//! [`ChunkSource::load_or_generate`] and sends the outcome back on an
//! unbounded result channel, so a worker never blocks on delivery and a full
//! job queue always drains.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use strata_voxel::{Chunk, ChunkCoord};

use crate::error::WorldError;
use crate::source::{ChunkSource, Origin};

/// A finished job, successful or not.
#[derive(Debug)]
pub struct JobOutcome {
    pub coord: ChunkCoord,
    pub result: Result<(Chunk, Origin), WorldError>,
}

/// Owns the worker threads. Dropping the pool closes the job queue and joins
/// every worker once it finishes its current job.
pub struct GenerationPool {
    jobs: Option<Sender<ChunkCoord>>,
    results: Receiver<JobOutcome>,
    workers: Vec<JoinHandle<()>>,
}

impl GenerationPool {
    /// Spawns `workers` threads (at least one). A `queue_capacity` of zero
    /// means an unbounded job queue.
    pub fn new(
        source: Arc<ChunkSource>,
        workers: usize,
        queue_capacity: usize,
    ) -> Result<Self, WorldError> {
        let (job_tx, job_rx) = if queue_capacity == 0 {
            unbounded::<ChunkCoord>()
        } else {
            bounded::<ChunkCoord>(queue_capacity)
        };
        let (result_tx, result_rx) = unbounded::<JobOutcome>();

        let count = workers.max(1);
        let mut handles = Vec::with_capacity(count);
        for index in 0..count {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let source = Arc::clone(&source);
            let handle = std::thread::Builder::new()
                .name("chunk-gen-worker".into())
                .spawn(move || {
                    tracing::debug!(worker = index, "generation worker started");
                    while let Ok(coord) = jobs.recv() {
                        let result = source.load_or_generate(coord);
                        if results.send(JobOutcome { coord, result }).is_err() {
                            break;
                        }
                    }
                })?;
            handles.push(handle);
        }

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            workers: handles,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a coordinate. Blocks while a bounded queue is full.
    pub fn submit(&self, coord: ChunkCoord) -> Result<(), WorldError> {
        let jobs = self.jobs.as_ref().ok_or(WorldError::WorkerGone)?;
        jobs.send(coord).map_err(|_| WorldError::WorkerGone)
    }

    pub fn try_recv(&self) -> Option<JobOutcome> {
        self.results.try_recv().ok()
    }

    /// Waits up to `timeout` for the next outcome. `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<JobOutcome>, WorldError> {
        match self.results.recv_timeout(timeout) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorldError::WorkerGone),
        }
    }
}

impl Drop for GenerationPool {
    fn drop(&mut self) {
        self.jobs.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("generation worker panicked");
            }
        }
    }
}
