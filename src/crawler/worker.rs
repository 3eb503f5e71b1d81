//! Worker pool
//!
//! Each worker loops: dequeue, run the pipeline, mark the item done. A worker
//! exits when the frontier is closed. Worker indices only label log output;
//! every worker pulls from the same queue.

use crate::crawler::frontier::FrontierQueue;
use crate::crawler::pipeline::{Pipeline, ProcessOutcome};
use crate::state::CrawlState;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Per-worker count of processed items by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTally {
    pub succeeded: usize,
    pub failed: usize,
    pub errored: usize,
}

impl WorkerTally {
    fn record(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::Succeeded { .. } => self.succeeded += 1,
            ProcessOutcome::Failed { .. } => self.failed += 1,
            ProcessOutcome::Errored => self.errored += 1,
        }
    }

    /// Number of items processed
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.errored
    }
}

/// Spawns `count` identical workers onto a join set
pub fn spawn_workers(
    count: usize,
    pipeline: Arc<Pipeline>,
    state: Arc<CrawlState>,
) -> JoinSet<WorkerTally> {
    let mut workers = JoinSet::new();
    for worker_id in 0..count {
        let pipeline = Arc::clone(&pipeline);
        let state = Arc::clone(&state);
        let span = tracing::debug_span!("worker", id = worker_id);
        workers.spawn(run_worker(worker_id, pipeline, state).instrument(span));
    }
    workers
}

/// Runs one worker until the frontier closes
///
/// Returns what this worker processed, by outcome.
pub async fn run_worker(
    worker_id: usize,
    pipeline: Arc<Pipeline>,
    state: Arc<CrawlState>,
) -> WorkerTally {
    tracing::debug!("Start worker {}", worker_id);
    let mut tally = WorkerTally::default();

    while let Some(item) = state.frontier.dequeue().await {
        let _done = DoneGuard(&state.frontier);
        tally.record(pipeline.process(item).await);
    }

    tracing::debug!(
        "Worker {} stopped: {} ok, {} failed, {} errored",
        worker_id,
        tally.succeeded,
        tally.failed,
        tally.errored
    );
    tally
}

/// Marks one item done when dropped
///
/// Dropping also happens when processing panics or the task is aborted, so
/// the outstanding counter can never be left stuck above zero.
struct DoneGuard<'a>(&'a FrontierQueue);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.mark_done();
    }
}
