//! Report rendering for the terminal and for machines

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

use crate::aggregate::AnalysisReport;
use crate::config::OutputFormat;

/// Renders a finalized report together with the run's wall-clock time
pub trait ReportFormatter {
    fn format(&self, report: &AnalysisReport, elapsed: Duration) -> Result<String>;
}

/// Human-readable multi-line report
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_extreme(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &AnalysisReport, elapsed: Duration) -> Result<String> {
        let mut output = String::new();

        output.push_str("=== Analysis Results ===\n");
        output.push_str(&format!("Total Records: {}\n", report.count));
        output.push_str(&format!("Average Value: {:.2}\n", report.average));
        output.push_str(&format!("Min Value: {}\n", format_extreme(report.min)));
        output.push_str(&format!("Max Value: {}\n", format_extreme(report.max)));
        if let Some(range) = &report.time_range {
            output.push_str(&format!("Time Range: {}\n", range.format()));
        }

        output.push_str("\nLabel Distribution:\n");
        for (label, count) in &report.labels {
            output.push_str(&format!("  {}: {}\n", label, count));
        }

        output.push_str(&format!("\nAnalysis completed in: {:.2?}", elapsed));
        Ok(output)
    }
}

/// One JSON object: the report fields plus `elapsed_ms`
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &AnalysisReport, elapsed: Duration) -> Result<String> {
        let mut value = serde_json::to_value(report).context("Failed to serialize report")?;
        if let Value::Object(map) = &mut value {
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            map.insert("elapsed_ms".to_string(), Value::from(elapsed_ms));
        }
        serde_json::to_string(&value).context("Failed to serialize report")
    }
}

pub fn create_formatter(format: &OutputFormat) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::{parse_rfc3339, TimeRange};
    use std::collections::BTreeMap;

    fn sample_report() -> AnalysisReport {
        let mut labels = BTreeMap::new();
        labels.insert("b".to_string(), 1);
        labels.insert("a".to_string(), 1);
        AnalysisReport {
            count: 2,
            sum: 30.0,
            average: 15.0,
            min: Some(10.0),
            max: Some(20.0),
            labels,
            time_range: Some(TimeRange {
                earliest: parse_rfc3339("2024-01-01T00:00:00Z").unwrap(),
                latest: parse_rfc3339("2024-01-02T00:00:00Z").unwrap(),
            }),
        }
    }

    fn empty_report() -> AnalysisReport {
        AnalysisReport {
            count: 0,
            sum: 0.0,
            average: 0.0,
            min: None,
            max: None,
            labels: BTreeMap::new(),
            time_range: None,
        }
    }

    #[test]
    fn test_text_report() {
        let output = TextFormatter::new()
            .format(&sample_report(), Duration::from_millis(3))
            .unwrap();
        let expected = "=== Analysis Results ===\n\
                        Total Records: 2\n\
                        Average Value: 15.00\n\
                        Min Value: 10.00\n\
                        Max Value: 20.00\n\
                        Time Range: 2024-01-01T00:00:00Z .. 2024-01-02T00:00:00Z (1day)\n\
                        \n\
                        Label Distribution:\n  a: 1\n  b: 1\n\
                        \n\
                        Analysis completed in: 3.00ms";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_text_report_empty() {
        let output = TextFormatter::new()
            .format(&empty_report(), Duration::ZERO)
            .unwrap();
        assert!(output.contains("Total Records: 0\n"));
        assert!(output.contains("Average Value: 0.00\n"));
        assert!(output.contains("Min Value: n/a\n"));
        assert!(output.contains("Max Value: n/a\n"));
        assert!(!output.contains("Time Range"));
        assert!(output.contains("Label Distribution:\n\nAnalysis completed in:"));
    }

    #[test]
    fn test_json_report() {
        let output = JsonFormatter::new()
            .format(&sample_report(), Duration::from_millis(42))
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["count"], 2);
        assert_eq!(value["average"], 15.0);
        assert_eq!(value["min"], 10.0);
        assert_eq!(value["labels"]["a"], 1);
        assert!(value["time_range"]["earliest"]
            .as_str()
            .unwrap()
            .starts_with("2024-01-01T00:00:00"));
        assert_eq!(value["elapsed_ms"], 42);
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_json_report_empty_has_nulls() {
        let output = JsonFormatter::new()
            .format(&empty_report(), Duration::ZERO)
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert!(value["min"].is_null());
        assert!(value["time_range"].is_null());
    }

    #[test]
    fn test_create_formatter() {
        let report = sample_report();
        let text = create_formatter(&OutputFormat::Text)
            .format(&report, Duration::ZERO)
            .unwrap();
        assert!(text.starts_with("=== Analysis Results ==="));
        let json = create_formatter(&OutputFormat::Json)
            .format(&report, Duration::ZERO)
            .unwrap();
        assert!(json.starts_with('{'));
    }
}
