//! Timestamp utilities
//!
//! Race windows in the canonical document are ISO-8601 strings; capture files
//! are named by epoch milliseconds. These helpers convert between the two.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 instant into epoch milliseconds.
///
/// Accepts RFC 3339 (`Z` or numeric offset), offset-less date-times and bare
/// dates; offset-less values are read as UTC. Absent or unparsable input yields
/// `None`.
pub fn parse_iso_millis(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Render epoch milliseconds as an RFC 3339 UTC string (millisecond precision)
pub fn format_millis(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_zulu() {
        assert_eq!(
            parse_iso_millis(Some("2024-02-24T03:00:00.000Z")),
            Some(1_708_743_600_000)
        );
        assert_eq!(parse_iso_millis(Some("2024-02-24T03:00:00Z")), Some(1_708_743_600_000));
    }

    #[test]
    fn test_parse_rfc3339_offset() {
        assert_eq!(
            parse_iso_millis(Some("2024-02-24T14:00:00+11:00")),
            Some(1_708_743_600_000)
        );
    }

    #[test]
    fn test_parse_naive_is_utc() {
        assert_eq!(parse_iso_millis(Some("2024-02-24T03:00:00")), Some(1_708_743_600_000));
        assert_eq!(parse_iso_millis(Some("2024-02-24 03:00:00.250")), Some(1_708_743_600_250));
        assert_eq!(parse_iso_millis(Some("2024-02-24")), Some(1_708_732_800_000));
    }

    #[test]
    fn test_parse_failure_is_none() {
        assert_eq!(parse_iso_millis(None), None);
        assert_eq!(parse_iso_millis(Some("")), None);
        assert_eq!(parse_iso_millis(Some("tomorrow at noon")), None);
        assert_eq!(parse_iso_millis(Some("2024-13-45T99:00:00Z")), None);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(
            format_millis(1_708_743_600_000).as_deref(),
            Some("2024-02-24T03:00:00.000Z")
        );
        assert_eq!(format_millis(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
    }
}
