//! Batch formation for parallel processing
//!
//! The batcher pulls raw rows lazily, parses them, and groups the good ones
//! into batches of `batch_size`. Rows that fail to parse are reported and
//! dropped; they never count toward a batch.

use crate::error_handling::{ErrorReporter, RowError};
use crate::readers::SourceError;
use crate::record::{parse_record, ParseError, RawRow};

use super::types::Batch;

/// Lazy adapter from raw rows to batches of parsed records
pub struct Batcher<'a, I> {
    rows: I,
    batch_size: usize,
    reporter: &'a mut ErrorReporter,
    batch_id: u64,
    rows_read: usize,
    rows_skipped: usize,
    exhausted: bool,
}

impl<'a, I> Batcher<'a, I>
where
    I: Iterator<Item = Result<RawRow, SourceError>>,
{
    /// `batch_size` of 0 is treated as 1
    pub fn new(rows: I, batch_size: usize, reporter: &'a mut ErrorReporter) -> Self {
        Self {
            rows,
            batch_size: batch_size.max(1),
            reporter,
            batch_id: 0,
            rows_read: 0,
            rows_skipped: 0,
            exhausted: false,
        }
    }

    /// Data rows pulled from the source so far (good and bad)
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows dropped because they failed to parse
    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }

    /// Batches handed out so far
    pub fn batches_formed(&self) -> u64 {
        self.batch_id
    }

    fn skip_row(&mut self, line: u64, error: ParseError) {
        self.rows_skipped += 1;
        self.reporter.report_row_error(RowError { line, error });
    }
}

impl<I> Iterator for Batcher<'_, I>
where
    I: Iterator<Item = Result<RawRow, SourceError>>,
{
    type Item = Result<Batch, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let mut current_batch = Vec::with_capacity(self.batch_size);
        let mut batch_start_line = 0;

        while current_batch.len() < self.batch_size {
            match self.rows.next() {
                Some(Ok(row)) => {
                    self.rows_read += 1;
                    match parse_record(&row.fields) {
                        Ok(record) => {
                            if current_batch.is_empty() {
                                batch_start_line = row.line;
                            }
                            current_batch.push(record);
                        }
                        Err(error) => self.skip_row(row.line, error),
                    }
                }
                Some(Err(SourceError::Malformed { line, reason })) => {
                    self.rows_read += 1;
                    self.skip_row(line, ParseError::Malformed { reason });
                }
                Some(Err(fatal)) => {
                    self.exhausted = true;
                    return Some(Err(fatal));
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if current_batch.is_empty() {
            return None;
        }

        let batch = Batch {
            id: self.batch_id,
            records: current_batch,
            start_line_num: batch_start_line,
        };
        self.batch_id += 1;
        Some(Ok(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorReportConfig, ErrorReportStyle};

    fn quiet_reporter() -> ErrorReporter {
        ErrorReporter::new(ErrorReportConfig {
            style: ErrorReportStyle::Off,
            use_emoji: false,
        })
    }

    fn good_row(line: u64, id: i64) -> Result<RawRow, SourceError> {
        Ok(RawRow::new(
            line,
            vec![
                id.to_string(),
                format!("{}.5", id),
                "lbl".to_string(),
                "2024-01-01T00:00:00Z".to_string(),
            ],
        ))
    }

    fn bad_row(line: u64) -> Result<RawRow, SourceError> {
        Ok(RawRow::new(
            line,
            vec!["1", "not-a-number", "lbl", "2024-01-01T00:00:00Z"],
        ))
    }

    fn ids(batch: &Batch) -> Vec<i64> {
        batch.records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_full_batches_and_remainder() {
        let rows = (1..=5).map(|i| good_row(i as u64 + 1, i));
        let mut reporter = quiet_reporter();
        let batches: Vec<Batch> = Batcher::new(rows, 2, &mut reporter)
            .map(Result::unwrap)
            .collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(ids(&batches[0]), vec![1, 2]);
        assert_eq!(ids(&batches[1]), vec![3, 4]);
        assert_eq!(ids(&batches[2]), vec![5]);
        assert_eq!(
            batches.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_batch() {
        let rows = (1..=4).map(|i| good_row(i as u64, i));
        let mut reporter = quiet_reporter();
        let batches: Vec<Batch> = Batcher::new(rows, 2, &mut reporter)
            .map(Result::unwrap)
            .collect();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let rows = std::iter::empty();
        let mut reporter = quiet_reporter();
        let mut batcher = Batcher::new(rows, 10, &mut reporter);
        assert!(batcher.next().is_none());
        assert_eq!(batcher.rows_read(), 0);
        assert_eq!(batcher.batches_formed(), 0);
    }

    #[test]
    fn test_skipped_rows_do_not_count_toward_bound() {
        let rows = vec![
            good_row(2, 1),
            bad_row(3),
            good_row(4, 2),
            bad_row(5),
            good_row(6, 3),
        ];
        let mut reporter = quiet_reporter();
        let mut batcher = Batcher::new(rows.into_iter(), 2, &mut reporter);

        let first = batcher.next().unwrap().unwrap();
        assert_eq!(ids(&first), vec![1, 2]);
        assert_eq!(first.start_line_num, 2);

        let second = batcher.next().unwrap().unwrap();
        assert_eq!(ids(&second), vec![3]);
        assert_eq!(second.start_line_num, 6);

        assert!(batcher.next().is_none());
        assert_eq!(batcher.rows_read(), 5);
        assert_eq!(batcher.rows_skipped(), 2);
        drop(batcher);

        assert_eq!(reporter.count_for("InvalidValue"), 2);
        assert!(reporter.examples_for("InvalidValue")[0].starts_with("line 3:"));
    }

    #[test]
    fn test_all_rows_bad_yields_nothing() {
        let rows = vec![bad_row(2), bad_row(3)];
        let mut reporter = quiet_reporter();
        let batches: Vec<_> = Batcher::new(rows.into_iter(), 1, &mut reporter).collect();
        assert!(batches.is_empty());
        assert_eq!(reporter.error_count(), 2);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = vec![
            good_row(2, 1),
            Err(SourceError::Malformed {
                line: 3,
                reason: "invalid utf-8".to_string(),
            }),
            good_row(4, 2),
        ];
        let mut reporter = quiet_reporter();
        let batches: Vec<Batch> = Batcher::new(rows.into_iter(), 10, &mut reporter)
            .map(Result::unwrap)
            .collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(ids(&batches[0]), vec![1, 2]);
        assert_eq!(reporter.count_for("Malformed"), 1);
    }

    #[test]
    fn test_fatal_error_ends_sequence() {
        let rows = vec![
            good_row(2, 1),
            Err(SourceError::HeaderMissing {
                path: "x".to_string(),
                reason: "input is empty".to_string(),
            }),
            good_row(4, 2),
        ];
        let mut reporter = quiet_reporter();
        let mut batcher = Batcher::new(rows.into_iter(), 10, &mut reporter);

        assert!(matches!(
            batcher.next(),
            Some(Err(SourceError::HeaderMissing { .. }))
        ));
        assert!(batcher.next().is_none());
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let rows = (1..=3).map(|i| good_row(i as u64, i));
        let mut reporter = quiet_reporter();
        let batches: Vec<_> = Batcher::new(rows, 0, &mut reporter).collect();
        assert_eq!(batches.len(), 3);
    }
}
