use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Duration;

/// Parse an RFC 3339 timestamp such as `2024-03-01T12:00:00Z` or
/// `2024-03-01T12:00:00+09:00`. The offset is kept as written.
pub fn parse_rfc3339(ts_str: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(ts_str)
}

/// Earliest and latest timestamps observed across a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub earliest: DateTime<FixedOffset>,
    pub latest: DateTime<FixedOffset>,
}

impl TimeRange {
    /// Span between the earliest and latest timestamps
    pub fn span(&self) -> Duration {
        // latest >= earliest by construction, but stay safe on odd inputs
        (self.latest - self.earliest).to_std().unwrap_or_default()
    }

    pub fn format(&self) -> String {
        format!(
            "{} .. {} ({})",
            self.earliest.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.latest.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            humantime::format_duration(self.span())
        )
    }
}

/// Total order on timestamps: by instant, then by UTC offset.
///
/// The same instant written with different offsets compares unequal, so the
/// earliest/latest pick never depends on which one was seen first.
pub(crate) fn cmp_timestamps(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> Ordering {
    a.cmp(b)
        .then_with(|| a.offset().local_minus_utc().cmp(&b.offset().local_minus_utc()))
}

/// Keep the earlier of two optional timestamps
pub(crate) fn earlier(
    current: Option<DateTime<FixedOffset>>,
    candidate: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    match current {
        Some(existing) if cmp_timestamps(&existing, &candidate).is_le() => Some(existing),
        _ => Some(candidate),
    }
}

/// Keep the later of two optional timestamps
pub(crate) fn later(
    current: Option<DateTime<FixedOffset>>,
    candidate: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    match current {
        Some(existing) if cmp_timestamps(&existing, &candidate).is_ge() => Some(existing),
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_and_offset() {
        let utc = parse_rfc3339("2024-03-01T12:00:00Z").unwrap();
        let tokyo = parse_rfc3339("2024-03-01T21:00:00+09:00").unwrap();
        assert_eq!(utc, tokyo);
        assert_eq!(tokyo.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert!(parse_rfc3339("2024-03-01T12:00:00.123456Z").is_ok());
    }

    #[test]
    fn test_parse_rejects_non_rfc3339() {
        assert!(parse_rfc3339("2024-03-01 12:00:00").is_err());
        assert!(parse_rfc3339("2024-03-01T12:00:00").is_err());
        assert!(parse_rfc3339("yesterday").is_err());
        assert!(parse_rfc3339("").is_err());
    }

    #[test]
    fn test_earlier_and_later_compare_instants() {
        let a = parse_rfc3339("2024-03-01T12:00:00Z").unwrap();
        let b = parse_rfc3339("2024-03-01T20:00:00+09:00").unwrap(); // 11:00Z

        assert_eq!(earlier(None, a), Some(a));
        assert_eq!(earlier(Some(a), b), Some(b));
        assert_eq!(later(Some(a), b), Some(a));
        assert_eq!(later(None, b), Some(b));
    }

    #[test]
    fn test_same_instant_ties_break_on_offset() {
        let utc = parse_rfc3339("2024-03-01T12:00:00Z").unwrap();
        let tokyo = parse_rfc3339("2024-03-01T21:00:00+09:00").unwrap();
        let render = |ts: Option<DateTime<FixedOffset>>| ts.map(|t| t.to_rfc3339());

        assert_eq!(cmp_timestamps(&utc, &tokyo), Ordering::Less);
        assert_eq!(render(earlier(Some(utc), tokyo)), render(Some(utc)));
        assert_eq!(render(earlier(Some(tokyo), utc)), render(Some(utc)));
        assert_eq!(render(later(Some(utc), tokyo)), render(Some(tokyo)));
        assert_eq!(render(later(Some(tokyo), utc)), render(Some(tokyo)));
    }

    #[test]
    fn test_time_range_span_and_format() {
        let range = TimeRange {
            earliest: parse_rfc3339("2024-03-01T12:00:00Z").unwrap(),
            latest: parse_rfc3339("2024-03-01T13:30:00Z").unwrap(),
        };
        assert_eq!(range.span(), Duration::from_secs(90 * 60));
        assert_eq!(
            range.format(),
            "2024-03-01T12:00:00Z .. 2024-03-01T13:30:00Z (1h 30m)"
        );
    }
}
