//! Timestamp utilities

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};

/// Formats accepted for timestamps that omit a UTC offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Source of the reference "now" used when projecting shows
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall-clock time
    #[default]
    System,
    /// A pinned instant
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Parse a stored show start time
///
/// The value must carry an explicit offset. A well-formed timestamp without
/// one yields [`Error::NaiveTimestamp`]; anything else unreadable yields
/// [`Error::DataIntegrity`].
pub fn parse_start_time(raw: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed);
    }

    if is_naive(trimmed) {
        return Err(Error::NaiveTimestamp(raw.to_string()));
    }

    Err(Error::DataIntegrity(format!("unparseable start time {:?}", raw)))
}

/// Canonical storage form (RFC 3339, offset preserved)
pub fn format_start_time(at: &DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn is_naive(value: &str) -> bool {
    NAIVE_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_utc_suffix() {
        let parsed = parse_start_time("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_keeps_offset() {
        let parsed = parse_start_time("2024-01-01T10:00:00-05:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_is_rejected() {
        let err = parse_start_time("2024-01-01 10:00:00").unwrap_err();
        assert!(matches!(err, Error::NaiveTimestamp(_)));

        let err = parse_start_time("2024-01-01T10:00").unwrap_err();
        assert!(matches!(err, Error::NaiveTimestamp(_)));
    }

    #[test]
    fn test_parse_garbage_is_data_integrity() {
        let err = parse_start_time("next tuesday").unwrap_err();
        assert!(matches!(err, Error::DataIntegrity(_)));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_format_roundtrips_offset() {
        let parsed = parse_start_time("2035-04-01T20:00:00+02:00").unwrap();
        assert_eq!(format_start_time(&parsed), "2035-04-01T20:00:00+02:00");
    }

    #[test]
    fn test_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(Clock::Fixed(at).now(), at);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // After 2020-01-01 00:00:00 UTC
        assert!(Clock::System.now().timestamp() > 1_577_836_800);
    }
}
