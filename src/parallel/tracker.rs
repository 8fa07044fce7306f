//! Thread-safe accumulator for parallel processing
//!
//! Contains GlobalTracker, the single shared aggregate that worker threads
//! merge their per-batch summaries into.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::aggregate::{AnalysisReport, PartialSummary};

/// Run-wide aggregate state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalAccumulator {
    pub summary: PartialSummary,
    pub batches_merged: u64,
}

/// Shared handle to the run's accumulator.
///
/// Cloning is cheap; every clone points at the same state. The mutex is the
/// only exclusive-access region in a run and is held just for the merge.
#[derive(Debug, Default, Clone)]
pub struct GlobalTracker {
    accumulator: Arc<Mutex<GlobalAccumulator>>,
}

impl GlobalTracker {
    pub fn new() -> Self {
        Self {
            accumulator: Arc::new(Mutex::new(GlobalAccumulator::default())),
        }
    }

    /// Lock the accumulator with poison recovery
    fn lock_accumulator(&self) -> MutexGuard<'_, GlobalAccumulator> {
        match self.accumulator.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                eprintln!(
                    "{}",
                    crate::config::format_error_message_auto(
                        "Worker thread panicked, recovering accumulator state"
                    )
                );
                poisoned.into_inner()
            }
        }
    }

    /// Absorb one batch's summary. Safe to call from any number of threads.
    pub fn merge(&self, partial: PartialSummary) {
        let mut accumulator = self.lock_accumulator();
        accumulator.summary.merge(partial);
        accumulator.batches_merged += 1;
    }

    /// Copy of the current state. Only meaningful once all workers are joined.
    pub fn snapshot(&self) -> GlobalAccumulator {
        self.lock_accumulator().clone()
    }

    pub fn batches_merged(&self) -> u64 {
        self.lock_accumulator().batches_merged
    }

    /// Take the accumulated summary and derive the final report.
    ///
    /// Must only be called after every worker has been joined; the
    /// accumulator is left empty.
    pub fn finalize(&self) -> AnalysisReport {
        let accumulator = std::mem::take(&mut *self.lock_accumulator());
        accumulator.summary.finalize()
    }
}
