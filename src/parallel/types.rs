//! Type definitions for parallel processing
//!
//! Contains data structures for batches, run phases, and configuration.

use crate::record::Record;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Concurrency bound; 0 means one worker per CPU
    pub num_workers: usize,
    pub batch_size: usize,
    /// Batches allowed to wait for a free worker; defaults to `num_workers`
    pub queue_depth: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            queue_depth: None,
        }
    }
}

impl ParallelConfig {
    pub fn effective_workers(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }

    pub fn effective_queue_depth(&self) -> usize {
        self.queue_depth
            .unwrap_or_else(|| self.effective_workers())
            .max(1)
    }
}

/// A batch of parsed records to be aggregated together
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub id: u64,
    pub records: Vec<Record>,
    /// Source line of the first record
    pub start_line_num: u64,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lifecycle of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    /// Batches are still being formed and handed to workers
    Dispatching,
    /// Everything is dispatched; waiting for workers to finish
    Draining,
    /// All merges observed, average derived
    Finalized,
}
