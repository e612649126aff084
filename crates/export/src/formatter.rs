//! Precision formatter
//!
//! Every merged value renders with the fixed number of decimals of its
//! category. Missing and non-finite values render as the empty string.

use chrono::DateTime;
use contracts::{format_timestamp, ChannelCategory, Micros, MergedTable};

/// Header of the canonical time column
pub const TIMESTAMP_HEADER: &str = "timestamp";

/// Timestamp rendering of single-stream output (microsecond precision)
pub const PRECISE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Render one merged value
pub fn format_value(value: f64, category: ChannelCategory) -> String {
    if !value.is_finite() {
        return String::new();
    }
    format!("{:.*}", category.precision(), value)
}

/// Render a value with its shortest round-trip representation
pub fn format_plain(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

/// Render an instant with [`PRECISE_TIMESTAMP_FORMAT`]
pub fn format_precise_timestamp(t: Micros) -> String {
    match DateTime::from_timestamp_micros(t) {
        Some(dt) => dt.naive_utc().format(PRECISE_TIMESTAMP_FORMAT).to_string(),
        None => t.to_string(),
    }
}

/// Output header: `timestamp` then every merged column
pub fn header(table: &MergedTable) -> Vec<String> {
    std::iter::once(TIMESTAMP_HEADER.to_string())
        .chain(table.column_names().map(str::to_string))
        .collect()
}

/// Formatted cells of one row, in [`header`] order
pub fn format_row(table: &MergedTable, row: usize) -> Vec<String> {
    std::iter::once(format_timestamp(table.timestamps()[row]))
        .chain(
            table
                .columns()
                .iter()
                .map(|c| format_value(c.values[row], c.category)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MergedColumn, StreamKind};

    #[test]
    fn test_category_precision() {
        assert_eq!(format_value(12.3, ChannelCategory::Positional), "12.30000000");
        assert_eq!(format_value(0.123456789, ChannelCategory::Vector), "0.123457");
        assert_eq!(format_value(1.0, ChannelCategory::Generic), "1.0000");
        assert_eq!(format_value(-0.98766, ChannelCategory::AngularRate), "-0.9877");
    }

    #[test]
    fn test_missing_renders_empty() {
        assert_eq!(format_value(f64::NAN, ChannelCategory::Generic), "");
        assert_eq!(format_value(f64::INFINITY, ChannelCategory::Vector), "");
        assert_eq!(format_plain(f64::NAN), "");
        assert_eq!(format_plain(0.25), "0.25");
    }

    #[test]
    fn test_precise_timestamp() {
        assert_eq!(
            format_precise_timestamp(1_704_164_645_678_901),
            "2024-01-02 03:04:05.678901"
        );
    }

    #[test]
    fn test_row_layout() {
        let table = MergedTable::new(
            vec![1_704_164_645_670_000],
            vec![
                MergedColumn {
                    name: "longitude".into(),
                    category: ChannelCategory::Positional,
                    source: StreamKind::Ins,
                    values: vec![113.5],
                },
                MergedColumn {
                    name: "x".into(),
                    category: ChannelCategory::Vector,
                    source: StreamKind::Magnetometer,
                    values: vec![f64::NAN],
                },
            ],
        )
        .unwrap();
        assert_eq!(header(&table), vec!["timestamp", "longitude", "x"]);
        assert_eq!(
            format_row(&table, 0),
            vec!["2024-01-02 03:04:05.670", "113.50000000", ""]
        );
    }
}
