//! Worker thread for parallel processing
//!
//! Each worker pulls batches off the shared work queue, summarizes them, and
//! merges the summary into the global tracker.

use crossbeam_channel::Receiver;

use crate::aggregate::PartialSummary;

use super::tracker::GlobalTracker;
use super::types::Batch;

/// What one worker got through, returned when it exits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub batches: u64,
    pub records: u64,
}

/// Summarize a batch and fold it into the shared accumulator.
///
/// The batch is consumed; nothing of it outlives the merge.
pub(crate) fn worker_process_batch(batch: Batch, global_tracker: &GlobalTracker) -> u64 {
    let partial = PartialSummary::from_batch(&batch);
    drop(batch);

    let records = partial.count;
    global_tracker.merge(partial);
    records
}

/// Worker thread: processes batches until the queue is closed and drained
pub(crate) fn worker_thread(
    worker_id: usize,
    work_receiver: Receiver<Batch>,
    global_tracker: GlobalTracker,
) -> WorkerReport {
    let mut report = WorkerReport {
        worker_id,
        ..Default::default()
    };

    while let Ok(batch) = work_receiver.recv() {
        report.records += worker_process_batch(batch, &global_tracker);
        report.batches += 1;
    }

    report
}
