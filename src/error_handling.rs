use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{format_warning_message, ErrorReportConfig, ErrorReportStyle};
use crate::record::ParseError;

/// Examples kept per error kind for the end-of-run summary
const MAX_EXAMPLES: usize = 3;

/// A row that was skipped, with its position in the source
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: u64,
    pub error: ParseError,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

/// Diagnostic sink for recoverable row errors.
///
/// Rows that fail to parse are skipped by the batcher and handed here. Nothing
/// reported here ever fails the run on its own.
#[derive(Debug)]
pub struct ErrorReporter {
    pub config: ErrorReportConfig,
    error_count: usize,
    error_counts: BTreeMap<&'static str, usize>,
    error_examples: BTreeMap<&'static str, Vec<String>>,
}

impl ErrorReporter {
    pub fn new(config: ErrorReportConfig) -> Self {
        Self {
            config,
            error_count: 0,
            error_counts: BTreeMap::new(),
            error_examples: BTreeMap::new(),
        }
    }

    /// Record a skipped row according to the configured style
    pub fn report_row_error(&mut self, error: RowError) {
        if self.config.style == ErrorReportStyle::Print {
            eprintln!(
                "{}",
                format_warning_message(
                    &format!("skipping {}", error),
                    !self.config.use_emoji
                )
            );
        }
        self.track_error(&error);
    }

    /// Track error for summary reporting
    fn track_error(&mut self, error: &RowError) {
        let kind = error.error.kind();
        self.error_count += 1;
        *self.error_counts.entry(kind).or_insert(0) += 1;

        let examples = self.error_examples.entry(kind).or_default();
        if examples.len() < MAX_EXAMPLES {
            examples.push(error.to_string());
        }
    }

    /// Generate the end-of-run summary (summary style only)
    pub fn generate_summary(&self) -> Option<String> {
        if self.error_count == 0 || self.config.style != ErrorReportStyle::Summary {
            return None;
        }

        let mut summary = json!({});
        for (kind, count) in &self.error_counts {
            let examples = self.error_examples.get(kind).cloned().unwrap_or_default();
            summary[*kind] = json!({
                "count": count,
                "examples": examples
            });
        }

        Some(
            serde_json::to_string_pretty(&summary)
                .unwrap_or_else(|_| "Error serializing summary".to_string()),
        )
    }

    /// Check if any errors occurred at all
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get total error count
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Count for one error kind, e.g. `"InvalidValue"`
    pub fn count_for(&self, kind: &str) -> usize {
        self.error_counts.get(kind).copied().unwrap_or(0)
    }

    pub fn examples_for(&self, kind: &str) -> &[String] {
        self.error_examples
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_error(line: u64, input: &str) -> RowError {
        RowError {
            line,
            error: ParseError::InvalidValue {
                input: input.to_string(),
                reason: "invalid float literal".to_string(),
            },
        }
    }

    fn reporter(style: ErrorReportStyle) -> ErrorReporter {
        ErrorReporter::new(ErrorReportConfig {
            style,
            use_emoji: false,
        })
    }

    #[test]
    fn test_counts_by_kind() {
        let mut reporter = reporter(ErrorReportStyle::Off);
        reporter.report_row_error(row_error(2, "bad"));
        reporter.report_row_error(row_error(3, "worse"));
        reporter.report_row_error(RowError {
            line: 4,
            error: ParseError::MissingFields { found: 1 },
        });

        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 3);
        assert_eq!(reporter.count_for("InvalidValue"), 2);
        assert_eq!(reporter.count_for("MissingFields"), 1);
        assert_eq!(reporter.count_for("InvalidTimestamp"), 0);
    }

    #[test]
    fn test_examples_are_capped() {
        let mut reporter = reporter(ErrorReportStyle::Off);
        for line in 0..10 {
            reporter.report_row_error(row_error(line, "x"));
        }
        assert_eq!(reporter.examples_for("InvalidValue").len(), MAX_EXAMPLES);
        assert_eq!(
            reporter.examples_for("InvalidValue")[0],
            "line 0: invalid value 'x': invalid float literal"
        );
    }

    #[test]
    fn test_summary_only_in_summary_style() {
        let mut print = reporter(ErrorReportStyle::Off);
        print.report_row_error(row_error(2, "bad"));
        assert!(print.generate_summary().is_none());

        let mut summary = reporter(ErrorReportStyle::Summary);
        assert!(summary.generate_summary().is_none());
        summary.report_row_error(row_error(2, "bad"));

        let text = summary.generate_summary().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["InvalidValue"]["count"], 1);
        assert_eq!(
            parsed["InvalidValue"]["examples"][0],
            "line 2: invalid value 'bad': invalid float literal"
        );
    }

    #[test]
    fn test_no_errors() {
        let reporter = reporter(ErrorReportStyle::Print);
        assert!(!reporter.has_errors());
        assert_eq!(reporter.error_count(), 0);
        assert!(reporter.examples_for("InvalidValue").is_empty());
    }
}
