// Core library for the csvtally aggregation tool

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod error_handling;
pub mod formatters;
pub mod parallel;
pub mod platform;
pub mod readers;
pub mod record;
pub mod stats;
pub mod timestamp;

pub use aggregate::{AnalysisReport, PartialSummary};
pub use config::CsvTallyConfig;
pub use error_handling::ErrorReporter;
pub use parallel::{ParallelConfig, ParallelProcessor};
pub use readers::{RowSource, SourceError};
pub use record::{parse_record, ParseError, RawRow, Record};

use anyhow::Result;
use thiserror::Error;

use crate::stats::ProcessingStats;

/// Failures that are only known once the whole input has been seen
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error(
        "{skipped} of {read} rows skipped ({}), above the allowed {}",
        percent(.rate),
        percent(.limit)
    )]
    ErrorRateExceeded {
        skipped: usize,
        read: usize,
        rate: f64,
        limit: f64,
    },
}

fn percent(fraction: &f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Everything a finished run produced
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub stats: ProcessingStats,
    pub reporter: ErrorReporter,
}

impl AnalysisOutcome {
    /// Fail when more than `max_error_rate` of the rows read were skipped
    pub fn check_error_rate(&self, max_error_rate: Option<f64>) -> Result<(), AnalysisError> {
        let Some(limit) = max_error_rate else {
            return Ok(());
        };

        let rate = self.stats.error_rate();
        if rate > limit {
            return Err(AnalysisError::ErrorRateExceeded {
                skipped: self.stats.rows_skipped,
                read: self.stats.rows_read,
                rate,
                limit,
            });
        }
        Ok(())
    }
}

/// Open the configured input and aggregate it
pub fn run_analysis(config: &CsvTallyConfig) -> Result<AnalysisOutcome> {
    let source = RowSource::open(&config.input.file, config.input.delimiter)?;
    analyze_rows(source, config)
}

/// Aggregate an already opened row sequence with the configured workers
pub fn analyze_rows<I>(rows: I, config: &CsvTallyConfig) -> Result<AnalysisOutcome>
where
    I: Iterator<Item = Result<RawRow, SourceError>>,
{
    let mut reporter = ErrorReporter::new(config.processing.error_report.clone());
    let mut processor = ParallelProcessor::new(config.parallel_config());

    let report = processor.process(rows, &mut reporter)?;

    Ok(AnalysisOutcome {
        report,
        stats: processor.stats().clone(),
        reporter,
    })
}
