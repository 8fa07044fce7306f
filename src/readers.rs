//! Row source: reads a delimited file once, top to bottom
//!
//! The header row is consumed when the source is opened; iteration yields the
//! data rows only, each tagged with its line number in the file.

use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::io::Read;
use thiserror::Error;

use crate::decompression::open_input;
use crate::record::RawRow;

/// Failures of the row source itself
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source cannot be opened at all
    #[error("cannot open '{path}': {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Empty input, or a header row that cannot be used
    #[error("no header row in '{path}': {reason}")]
    HeaderMissing { path: String, reason: String },

    /// The underlying reader failed part way through
    #[error("failed reading '{path}' near line {line}: {source}")]
    Read {
        path: String,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// One row could not be decoded (e.g. invalid UTF-8); the rest of the input is fine
    #[error("line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

impl SourceError {
    /// Whether the run can skip this and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SourceError::Malformed { .. })
    }
}

/// Finite, non-restartable sequence of raw rows
pub struct RowSource {
    path: String,
    header: Vec<String>,
    records: StringRecordsIntoIter<Box<dyn Read + Send>>,
    finished: bool,
}

impl RowSource {
    /// Open a file ("-" for stdin), detect compression and consume the header
    pub fn open(path: &str, delimiter: u8) -> Result<Self, SourceError> {
        let reader = open_input(path).map_err(|source| SourceError::Unavailable {
            path: path.to_string(),
            source,
        })?;
        Self::from_reader(path, reader, delimiter)
    }

    /// Build a source over an already opened reader; `name` is used in messages
    pub fn from_reader(
        name: &str,
        reader: Box<dyn Read + Send>,
        delimiter: u8,
    ) -> Result<Self, SourceError> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = match csv_reader.headers() {
            Ok(header) => header.iter().map(str::to_string).collect::<Vec<_>>(),
            Err(e) if e.is_io_error() => {
                return Err(SourceError::Read {
                    path: name.to_string(),
                    line: 1,
                    source: e,
                })
            }
            Err(e) => {
                return Err(SourceError::HeaderMissing {
                    path: name.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if header.is_empty() {
            return Err(SourceError::HeaderMissing {
                path: name.to_string(),
                reason: "input is empty".to_string(),
            });
        }

        Ok(Self {
            path: name.to_string(),
            header,
            records: csv_reader.into_records(),
            finished: false,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Iterator for RowSource {
    type Item = Result<RawRow, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.records.next()? {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                Some(Ok(RawRow::new(line, record.iter())))
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                if e.is_io_error() {
                    self.finished = true;
                    Some(Err(SourceError::Read {
                        path: self.path.clone(),
                        line,
                        source: e,
                    }))
                } else {
                    Some(Err(SourceError::Malformed {
                        line,
                        reason: e.to_string(),
                    }))
                }
            }
        }
    }
}
