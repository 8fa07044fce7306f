use std::time::{Duration, Instant};

/// Statistics collected while dispatching a run.
///
/// Filled in by the dispatching thread only; workers report their own
/// counts through their join handles.
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub rows_read: usize,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
    pub batches_dispatched: u64,
    pub workers: usize,
    /// Batches handled by each worker, indexed by worker id
    pub worker_batches: Vec<u64>,
    pub processing_time: Duration,
    pub start_time: Option<Instant>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn finish_processing(&mut self) {
        if let Some(start) = self.start_time {
            self.processing_time = start.elapsed();
        }
    }

    /// Fraction of data rows that were skipped; 0.0 for an empty source
    pub fn error_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            self.rows_skipped as f64 / self.rows_read as f64
        }
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Rows processed: {} total, {} parsed, {} skipped",
            self.rows_read, self.rows_parsed, self.rows_skipped
        );

        output.push_str(&format!(
            "; {} batches on {} workers",
            self.batches_dispatched, self.workers
        ));

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.rows_read > 0 {
            let rows_per_sec = (self.rows_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} rows/s)", rows_per_sec));
        }

        if let (Some(min), Some(max)) = (
            self.worker_batches.iter().min(),
            self.worker_batches.iter().max(),
        ) {
            if self.worker_batches.len() > 1 {
                output.push_str(&format!(", {}-{} batches per worker", min, max));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rate() {
        let mut stats = ProcessingStats::new();
        assert_eq!(stats.error_rate(), 0.0);

        stats.rows_read = 4;
        stats.rows_skipped = 1;
        assert_eq!(stats.error_rate(), 0.25);
    }

    #[test]
    fn test_format_stats() {
        let stats = ProcessingStats {
            rows_read: 10,
            rows_parsed: 8,
            rows_skipped: 2,
            batches_dispatched: 4,
            workers: 2,
            worker_batches: vec![1, 3],
            processing_time: Duration::from_millis(5),
            start_time: None,
        };
        assert_eq!(
            stats.format_stats(),
            "Rows processed: 10 total, 8 parsed, 2 skipped; 4 batches on 2 workers in 5ms (2000 rows/s), 1-3 batches per worker"
        );
    }

    #[test]
    fn test_format_stats_without_timing() {
        let stats = ProcessingStats {
            workers: 1,
            worker_batches: vec![0],
            ..Default::default()
        };
        assert_eq!(
            stats.format_stats(),
            "Rows processed: 0 total, 0 parsed, 0 skipped; 0 batches on 1 workers in 0ms"
        );
    }
}
