//! Main parallel processor
//!
//! Contains the ParallelProcessor struct that orchestrates a run: a fixed
//! pool of worker threads fed through a bounded queue, a join barrier, and
//! the finishing step that derives the average.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::bounded;
use std::thread;

use crate::aggregate::AnalysisReport;
use crate::error_handling::ErrorReporter;
use crate::readers::SourceError;
use crate::record::RawRow;
use crate::stats::ProcessingStats;

use super::batching::Batcher;
use super::tracker::GlobalTracker;
use super::types::{Batch, ParallelConfig, RunPhase};
use super::worker::{worker_thread, WorkerReport};

/// Main parallel processor
pub struct ParallelProcessor {
    config: ParallelConfig,
    global_tracker: GlobalTracker,
    phase: RunPhase,
    stats: ProcessingStats,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            config,
            global_tracker: GlobalTracker::new(),
            phase: RunPhase::Idle,
            stats: ProcessingStats::default(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Aggregate every row of `rows` and return the finalized report.
    ///
    /// At most `num_workers` batches are aggregated at the same time; the
    /// calling thread forms batches and blocks while the work queue is full.
    /// Returns only after every worker has finished. A processor runs once.
    pub fn process<I>(&mut self, rows: I, reporter: &mut ErrorReporter) -> Result<AnalysisReport>
    where
        I: Iterator<Item = Result<RawRow, SourceError>>,
    {
        if self.phase != RunPhase::Idle {
            return Err(anyhow!(
                "Processor already used (phase {:?}); create a new one per run",
                self.phase
            ));
        }
        if self.config.batch_size == 0 {
            return Err(anyhow!("Batch size must be greater than 0"));
        }

        self.stats = ProcessingStats::new();
        let num_workers = self.config.effective_workers();
        self.stats.workers = num_workers;

        let (work_sender, work_receiver) = bounded::<Batch>(self.config.effective_queue_depth());

        // Start worker threads
        let mut worker_handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let work_receiver = work_receiver.clone();
            let global_tracker = self.global_tracker.clone();

            let handle = thread::Builder::new()
                .name(format!("csvtally-worker-{}", worker_id))
                .spawn(move || worker_thread(worker_id, work_receiver, global_tracker))
                .with_context(|| format!("Failed to spawn worker thread {}", worker_id))?;
            worker_handles.push(handle);
        }
        drop(work_receiver);

        self.phase = RunPhase::Dispatching;
        let dispatch_result = self.dispatch(rows, reporter, &work_sender);

        // Drop sender to signal completion
        self.phase = RunPhase::Draining;
        drop(work_sender);

        let join_result = self.join_workers(worker_handles);
        self.stats.finish_processing();

        // Fatal source errors win over worker failures: they explain the run
        dispatch_result?;
        join_result?;

        let report = self.global_tracker.finalize();
        self.phase = RunPhase::Finalized;
        Ok(report)
    }

    /// Form batches on the calling thread and hand them to the workers
    fn dispatch<I>(
        &mut self,
        rows: I,
        reporter: &mut ErrorReporter,
        work_sender: &crossbeam_channel::Sender<Batch>,
    ) -> Result<()>
    where
        I: Iterator<Item = Result<RawRow, SourceError>>,
    {
        let mut batcher = Batcher::new(rows, self.config.batch_size, reporter);
        let mut result = Ok(());

        for batch in batcher.by_ref() {
            match batch {
                Ok(batch) => {
                    if let Err(e) = self.send_batch(work_sender, batch) {
                        result = Err(e);
                        break;
                    }
                }
                Err(e) => {
                    result = Err(anyhow::Error::new(e));
                    break;
                }
            }
        }

        self.stats.rows_read = batcher.rows_read();
        self.stats.rows_skipped = batcher.rows_skipped();
        result
    }

    /// Queue one batch; only batches a worker will see count as parsed
    fn send_batch(
        &mut self,
        work_sender: &crossbeam_channel::Sender<Batch>,
        batch: Batch,
    ) -> Result<()> {
        let len = batch.len();
        work_sender
            .send(batch)
            .map_err(|_| anyhow!("All worker threads exited before the input was consumed"))?;
        self.stats.rows_parsed += len;
        self.stats.batches_dispatched += 1;
        Ok(())
    }

    /// Wait for every worker; the first panic is reported after all are joined
    fn join_workers(
        &mut self,
        worker_handles: Vec<thread::JoinHandle<WorkerReport>>,
    ) -> Result<()> {
        let mut first_failure = None;
        self.stats.worker_batches = vec![0; worker_handles.len()];

        for (idx, handle) in worker_handles.into_iter().enumerate() {
            match handle.join() {
                Ok(report) => self.stats.worker_batches[idx] = report.batches,
                Err(_) => {
                    if first_failure.is_none() {
                        first_failure = Some(anyhow!("Worker thread {} panicked", idx));
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
