//! Sync diagnostics
//!
//! Everything a run reports besides the merged table itself. None of these
//! values feed back into reconstruction.

use serde::{Deserialize, Serialize};

use crate::StreamKind;

/// Interval drift diagnostics of one stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Rolling window length (in intervals)
    pub window: usize,

    /// Sample indices whose interval left the rolling band
    pub drifted: Vec<usize>,

    /// Inter-sample interval in seconds (`None` for sample 0)
    pub intervals: Vec<Option<f64>>,

    /// Rolling mean of the interval, `None` while undefined
    pub rolling_mean: Vec<Option<f64>>,

    /// Rolling standard deviation of the interval, `None` while undefined
    pub rolling_std: Vec<Option<f64>>,
}

impl DriftReport {
    /// Mean of all defined intervals (seconds)
    pub fn mean_interval(&self) -> Option<f64> {
        let defined: Vec<f64> = self.intervals.iter().flatten().copied().collect();
        if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        }
    }
}

/// Quality metrics of one channel over one window of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Channel name
    pub channel: String,

    /// Sequential window number
    pub window_index: usize,

    /// First row of the window
    pub start_row: usize,

    /// Population variance of present values (`None` if none present)
    pub variance: Option<f64>,

    /// Count of missing cells in the window
    pub missing: usize,

    /// mean / std, 0 when std is 0
    pub signal_noise_ratio: f64,
}

/// Kind of locally recovered numerical degradation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityNoteKind {
    /// Spline skipped, linear interpolation used instead
    SplineFallback { valid_points: usize },
    /// Points suppressed by the outlier band before fitting
    OutliersSuppressed { count: usize },
}

/// Quality note attached to a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityNote {
    pub stream: StreamKind,
    pub channel: String,
    #[serde(flatten)]
    pub kind: QualityNoteKind,
}

/// Per-stream load summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Records after preparation
    pub records: usize,

    /// Numeric channels taking part in reconstruction
    pub channels: Vec<String>,

    /// First record (formatted)
    pub first: Option<String>,

    /// Last record (formatted)
    pub last: Option<String>,

    /// Duplicate-timestamp records folded into their predecessor
    pub coalesced_duplicates: usize,

    /// Rows dropped because every channel was missing
    pub dropped_empty_rows: usize,

    /// Dense record pairs folded by the coalescer (magnetometer only)
    pub dense_pairs_merged: usize,

    /// Interval drift
    pub drift: DriftReport,
}

/// Full diagnostics of one synchronization run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// First grid instant (formatted)
    pub grid_start: String,

    /// Last grid instant (formatted)
    pub grid_end: String,

    /// Grid spacing in milliseconds
    pub interval_ms: u64,

    /// Validated overlap in seconds
    pub overlap_s: f64,

    /// Rows of the full grid
    pub grid_rows: usize,

    /// Rows written
    pub output_rows: usize,

    /// Trailing all-missing rows removed
    pub trimmed_rows: usize,

    /// Rows removed by the incomplete-row filter
    pub dropped_incomplete_rows: usize,

    /// Columns dropped as superseded device base-time fields
    pub dropped_columns: Vec<String>,

    pub ins: StreamSummary,
    pub magnetometer: StreamSummary,

    /// Windowed quality metrics
    pub quality: Vec<QualityScore>,

    /// Local numerical recoveries
    pub notes: Vec<QualityNote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_interval_skips_undefined() {
        let report = DriftReport {
            intervals: vec![None, Some(0.01), Some(0.03)],
            ..Default::default()
        };
        assert!((report.mean_interval().unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_note_serializes_flat() {
        let note = QualityNote {
            stream: StreamKind::Ins,
            channel: "angular_velocity_x (dps)".into(),
            kind: QualityNoteKind::SplineFallback { valid_points: 3 },
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["kind"], "spline_fallback");
        assert_eq!(json["valid_points"], 3);
        assert_eq!(json["stream"], "ins");
    }
}
