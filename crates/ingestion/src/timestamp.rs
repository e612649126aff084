//! Wall-clock timestamp parsing

use chrono::{DateTime, NaiveDateTime};
use contracts::{Micros, MICROS_PER_SECOND};

/// Accepted naive layouts, tried in order
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parse a logged timestamp into microseconds since the Unix epoch.
///
/// Naive layouts are read as UTC, RFC 3339 offsets are converted to UTC and
/// a bare number is taken as epoch seconds.
pub fn parse_timestamp(raw: &str) -> Option<Micros> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().timestamp_micros());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_micros());
    }

    raw.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite())
        .map(|secs| (secs * MICROS_PER_SECOND as f64).round() as Micros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::format_timestamp;

    #[test]
    fn test_space_separated_with_fraction() {
        let t = parse_timestamp("2024-01-02 03:04:05.678123").unwrap();
        assert_eq!(t % MICROS_PER_SECOND, 678_123);
        assert_eq!(format_timestamp(t), "2024-01-02 03:04:05.678");
    }

    #[test]
    fn test_fraction_optional() {
        let t = parse_timestamp("2024-01-02 03:04:05").unwrap();
        assert_eq!(t % MICROS_PER_SECOND, 0);
    }

    #[test]
    fn test_iso_and_slash_layouts_agree() {
        let a = parse_timestamp("2024-01-02T03:04:05.5").unwrap();
        let b = parse_timestamp("2024/01/02 03:04:05.5").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rfc3339_offset_converted() {
        let utc = parse_timestamp("2024-01-02 03:04:05").unwrap();
        let offset = parse_timestamp("2024-01-02T05:04:05+02:00").unwrap();
        assert_eq!(utc, offset);
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(parse_timestamp("1.5"), Some(1_500_000));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("inf"), None);
    }
}
