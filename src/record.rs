//! Typed records and the row parser
//!
//! A raw row is the ordered list of text fields read from one CSV line. The
//! parser turns it into a [`Record`] using the fixed positional layout
//! `(id, value, label, timestamp)`. Extra trailing fields are ignored.

use chrono::{DateTime, FixedOffset};
use std::num::ParseIntError;
use thiserror::Error;

use crate::timestamp::parse_rfc3339;

/// Number of positional fields a row must carry
pub const REQUIRED_FIELDS: usize = 4;

/// One data point. Read-only after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub value: f64,
    pub label: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// A row as delivered by the row source, before type coercion
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source (the header is line 1)
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new<S: Into<String>>(line: u64, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            line,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Why a single row could not become a [`Record`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid id '{input}': {source}")]
    InvalidIdentifier {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid value '{input}': {reason}")]
    InvalidValue { input: String, reason: String },

    #[error("invalid timestamp '{input}': {source}")]
    InvalidTimestamp {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("expected at least 4 fields (id, value, label, timestamp), found {found}")]
    MissingFields { found: usize },

    #[error("malformed row: {reason}")]
    Malformed { reason: String },
}

impl ParseError {
    /// Stable name of the failure class, used for summaries
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::InvalidIdentifier { .. } => "InvalidIdentifier",
            ParseError::InvalidValue { .. } => "InvalidValue",
            ParseError::InvalidTimestamp { .. } => "InvalidTimestamp",
            ParseError::MissingFields { .. } => "MissingFields",
            ParseError::Malformed { .. } => "Malformed",
        }
    }

    /// The offending field, when the failure is tied to one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ParseError::InvalidIdentifier { .. } => Some("id"),
            ParseError::InvalidValue { .. } => Some("value"),
            ParseError::InvalidTimestamp { .. } => Some("timestamp"),
            ParseError::MissingFields { .. } | ParseError::Malformed { .. } => None,
        }
    }
}

/// Parse one row into a [`Record`].
///
/// Fields are taken verbatim, without trimming. Values must be finite: `NaN`
/// and infinities are rejected because they would poison the sum and the
/// min/max ordering.
pub fn parse_record<S: AsRef<str>>(fields: &[S]) -> Result<Record, ParseError> {
    if fields.len() < REQUIRED_FIELDS {
        return Err(ParseError::MissingFields {
            found: fields.len(),
        });
    }

    let id_str = fields[0].as_ref();
    let id = id_str
        .parse::<i64>()
        .map_err(|source| ParseError::InvalidIdentifier {
            input: id_str.to_string(),
            source,
        })?;

    let value_str = fields[1].as_ref();
    let value = parse_value(value_str)?;

    let label = fields[2].as_ref().to_string();

    let ts_str = fields[3].as_ref();
    let timestamp = parse_rfc3339(ts_str).map_err(|source| ParseError::InvalidTimestamp {
        input: ts_str.to_string(),
        source,
    })?;

    Ok(Record {
        id,
        value,
        label,
        timestamp,
    })
}

fn parse_value(value_str: &str) -> Result<f64, ParseError> {
    let value = value_str
        .parse::<f64>()
        .map_err(|e| ParseError::InvalidValue {
            input: value_str.to_string(),
            reason: e.to_string(),
        })?;

    if !value.is_finite() {
        return Err(ParseError::InvalidValue {
            input: value_str.to_string(),
            reason: "value is not a finite number".to_string(),
        });
    }

    Ok(value)
}
