//! Parallel processing module for csvtally
//!
//! Splits a row source into batches and aggregates them on a fixed pool of
//! worker threads, merging every batch summary into one shared accumulator.
//!
//! # Module Structure
//!
//! - `types`: Data structures for batches, run phases, and configuration
//! - `tracker`: Thread-safe accumulator and merge logic
//! - `batching`: Lazy batch formation from raw rows
//! - `worker`: Worker thread for processing batches
//! - `processor`: Main ParallelProcessor orchestration

mod batching;
mod processor;
mod tracker;
mod types;
mod worker;

// Re-export public types
pub use batching::Batcher;
pub use processor::ParallelProcessor;
pub use tracker::{GlobalAccumulator, GlobalTracker};
pub use types::{Batch, ParallelConfig, RunPhase};
pub use worker::WorkerReport;
