//! Aggregate summaries and the finalized report
//!
//! [`PartialSummary`] is the per-batch result and also the shape of the
//! run-wide accumulator. Merging two summaries is commutative and
//! associative, so partial results can be absorbed in any completion order.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::parallel::Batch;
use crate::record::Record;
use crate::timestamp::{earlier, later, TimeRange};

/// Count/sum/min/max/label tally over some set of records.
///
/// `min`, `max`, `earliest` and `latest` are `None` until the first record
/// is observed, so an empty summary never disturbs a populated one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialSummary {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub labels: HashMap<String, u64>,
    pub earliest: Option<DateTime<FixedOffset>>,
    pub latest: Option<DateTime<FixedOffset>>,
}

impl PartialSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize one batch. Touches nothing but the batch's own records.
    pub fn from_batch(batch: &Batch) -> Self {
        Self::from_records(&batch.records)
    }

    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Self::new();
        for record in records {
            summary.observe(record);
        }
        summary
    }

    /// Fold a single record into the summary
    pub fn observe(&mut self, record: &Record) {
        let value = record.value;
        self.count += 1;
        self.sum += value;

        *self.labels.entry(record.label.clone()).or_insert(0) += 1;

        // total_cmp orders -0.0 below 0.0, so equal-looking extremes still tie-break
        if self.min.map_or(true, |min| value.total_cmp(&min).is_lt()) {
            self.min = Some(value);
        }
        if self.max.map_or(true, |max| value.total_cmp(&max).is_gt()) {
            self.max = Some(value);
        }

        self.earliest = earlier(self.earliest, record.timestamp);
        self.latest = later(self.latest, record.timestamp);
    }

    /// Absorb another summary into this one.
    ///
    /// Extremes are only combined when the other side has seen a value.
    pub fn merge(&mut self, other: PartialSummary) {
        self.count += other.count;
        self.sum += other.sum;

        if let Some(other_min) = other.min {
            self.min = Some(match self.min {
                Some(min) if min.total_cmp(&other_min).is_le() => min,
                _ => other_min,
            });
        }
        if let Some(other_max) = other.max {
            self.max = Some(match self.max {
                Some(max) if max.total_cmp(&other_max).is_ge() => max,
                _ => other_max,
            });
        }

        for (label, count) in other.labels {
            *self.labels.entry(label).or_insert(0) += count;
        }

        if let Some(ts) = other.earliest {
            self.earliest = earlier(self.earliest, ts);
        }
        if let Some(ts) = other.latest {
            self.latest = later(self.latest, ts);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Derive the final report. `average` is 0.0 when nothing was counted.
    pub fn finalize(self) -> AnalysisReport {
        let average = if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        };

        let time_range = match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => Some(TimeRange { earliest, latest }),
            _ => None,
        };

        AnalysisReport {
            count: self.count,
            sum: self.sum,
            average,
            min: self.min,
            max: self.max,
            labels: self.labels.into_iter().collect(),
            time_range,
        }
    }
}

/// Finalized, read-only result of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub count: u64,
    pub sum: f64,
    pub average: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub labels: BTreeMap<String, u64>,
    pub time_range: Option<TimeRange>,
}
