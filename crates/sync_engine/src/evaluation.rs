//! Interpolation evaluation
//!
//! Compares a raw magnetometer log against a merged output to show how much
//! reconstruction changed the signal.

use std::fmt;

use contracts::Channel;
use serde::Serialize;

use crate::cleaner::mean_std;

/// Magnetometer axes compared by [`evaluate`]
pub const AXES: [&str; 3] = ["x", "y", "z"];

/// Fixed interval used for the rate statistic (seconds)
pub const RATE_INTERVAL_S: f64 = 0.01;

/// Merged channels summarized by mean and deviation
const SUMMARIZED_MARKERS: [&str; 5] = [
    "acceleration",
    "angular_velocity",
    "temperature",
    "longitude",
    "latitude",
];

/// Distribution statistics of one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisStats {
    /// Median absolute deviation
    pub mad: f64,
    /// Interquartile range
    pub iqr: f64,
    /// Largest step between consecutive values per [`RATE_INTERVAL_S`]
    pub max_rate: f64,
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
}

/// Raw vs merged statistics of one axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisComparison {
    pub axis: String,
    pub raw: AxisStats,
    pub merged: AxisStats,
    pub mad_change_pct: f64,
    pub iqr_change_pct: f64,
    pub rate_change_pct: f64,
}

/// Mean and deviation of one merged channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub channel: String,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub axes: Vec<AxisComparison>,
    pub channels: Vec<ChannelStats>,
}

/// Compare raw magnetometer channels with the merged table's channels
///
/// An axis is compared when both sides carry at least one present value;
/// the merged side is looked up as `x` and then as `mag_x`.
pub fn evaluate(raw: &[Channel], merged: &[Channel]) -> EvaluationReport {
    let find = |channels: &[Channel], name: &str| -> Option<Vec<f64>> {
        channels
            .iter()
            .find(|c| c.name == name)
            .map(|c| present(&c.values))
    };

    let axes = AXES
        .iter()
        .filter_map(|&axis| {
            let raw_values = find(raw, axis)?;
            let merged_values =
                find(merged, axis).or_else(|| find(merged, &format!("mag_{axis}")))?;
            if raw_values.is_empty() || merged_values.is_empty() {
                return None;
            }
            Some(compare(axis, &raw_values, &merged_values))
        })
        .collect();

    let channels = merged
        .iter()
        .filter(|c| SUMMARIZED_MARKERS.iter().any(|m| c.name.contains(m)))
        .filter_map(|c| {
            let values = present(&c.values);
            if values.is_empty() {
                return None;
            }
            let (mean, std) = mean_std(&values);
            Some(ChannelStats {
                channel: c.name.clone(),
                mean,
                std,
            })
        })
        .collect();

    EvaluationReport { axes, channels }
}

fn compare(axis: &str, raw: &[f64], merged: &[f64]) -> AxisComparison {
    let raw = axis_stats(raw);
    let merged = axis_stats(merged);
    AxisComparison {
        axis: axis.to_string(),
        mad_change_pct: change_pct(raw.mad, merged.mad),
        iqr_change_pct: change_pct(raw.iqr, merged.iqr),
        rate_change_pct: change_pct(raw.max_rate, merged.max_rate),
        raw,
        merged,
    }
}

fn axis_stats(values: &[f64]) -> AxisStats {
    let median = percentile(values, 50.0);
    let deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();
    let max_step = values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max);
    let (mean, std) = mean_std(values);

    AxisStats {
        mad: percentile(&deviations, 50.0),
        iqr: percentile(values, 75.0) - percentile(values, 25.0),
        max_rate: max_step / RATE_INTERVAL_S,
        mean,
        std,
    }
}

/// Relative change in percent, 0 when the reference is 0
pub fn change_pct(reference: f64, value: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        (value - reference) / reference * 100.0
    }
}

/// Percentile with linear interpolation between closest ranks
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

fn present(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Interpolation Evaluation ===")?;
        for axis in &self.axes {
            writeln!(f)?;
            writeln!(f, "{} axis:", axis.axis)?;
            writeln!(
                f,
                "  MAD:      raw {:.8}  merged {:.8}  ({:+.2}%)",
                axis.raw.mad, axis.merged.mad, axis.mad_change_pct
            )?;
            writeln!(
                f,
                "  IQR:      raw {:.8}  merged {:.8}  ({:+.2}%)",
                axis.raw.iqr, axis.merged.iqr, axis.iqr_change_pct
            )?;
            writeln!(
                f,
                "  Max rate: raw {:.8}/s  merged {:.8}/s  ({:+.2}%)",
                axis.raw.max_rate, axis.merged.max_rate, axis.rate_change_pct
            )?;
            writeln!(
                f,
                "  Mean/std: raw {:.8}/{:.8}  merged {:.8}/{:.8}",
                axis.raw.mean, axis.raw.std, axis.merged.mean, axis.merged.std
            )?;
        }
        if !self.channels.is_empty() {
            writeln!(f)?;
            writeln!(f, "Merged channels:")?;
            for channel in &self.channels {
                writeln!(
                    f,
                    "  {}: mean {:.8}  std {:.8}",
                    channel.channel, channel.mean, channel.std
                )?;
            }
        }
        Ok(())
    }
}
