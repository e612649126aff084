//! Run metrics
//!
//! `metrics` facade recorders for each stage of a synchronization run, plus
//! a printed summary of a finished `SyncReport`.

use std::collections::BTreeMap;

use contracts::{QualityNoteKind, StreamKind, SyncReport};
use metrics::{counter, gauge, histogram};

/// Record a loaded stream
pub fn record_stream_loaded(stream: StreamKind, records: usize) {
    counter!("magsync_records_loaded_total", "stream" => stream.as_str()).increment(records as u64);
    gauge!("magsync_stream_records", "stream" => stream.as_str()).set(records as f64);
}

/// Record rows removed during loading or merging
///
/// `reason` is one of `unparseable_timestamp`, `empty`, `duplicate`,
/// `trailing`, `incomplete`, `dense`.
pub fn record_rows_dropped(stream: &'static str, reason: &'static str, rows: usize) {
    if rows == 0 {
        return;
    }
    counter!(
        "magsync_rows_dropped_total",
        "stream" => stream,
        "reason" => reason
    )
    .increment(rows as u64);
}

/// Record drift flags of one stream
pub fn record_drift_flags(stream: StreamKind, flagged: usize) {
    gauge!("magsync_drift_flagged", "stream" => stream.as_str()).set(flagged as f64);
    if flagged > 0 {
        counter!("magsync_drift_flagged_total", "stream" => stream.as_str())
            .increment(flagged as u64);
    }
}

/// Record a spline fallback on a channel
pub fn record_quality_fallback(stream: StreamKind, channel: &str) {
    counter!(
        "magsync_spline_fallback_total",
        "stream" => stream.as_str(),
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// Record rows written to the merged output
pub fn record_rows_written(rows: usize) {
    counter!("magsync_rows_written_total").increment(rows as u64);
}

/// Record wall time of a whole run
pub fn record_sync_duration_ms(ms: f64) {
    histogram!("magsync_sync_duration_ms").record(ms);
}

/// Record the headline figures of a finished run
pub fn record_run(report: &SyncReport) {
    counter!("magsync_runs_total").increment(1);
    histogram!("magsync_overlap_seconds").record(report.overlap_s);
    gauge!("magsync_grid_rows").set(report.grid_rows as f64);
    record_rows_written(report.output_rows);
    record_rows_dropped("merged", "trailing", report.trimmed_rows);
    record_rows_dropped("merged", "incomplete", report.dropped_incomplete_rows);
}

/// Printed summary of one finished run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub output_rows: u64,
    pub trimmed_rows: u64,
    pub incomplete_rows: u64,
    pub fallbacks: u64,
    pub overlap_s: f64,

    /// Inter-sample interval statistics per stream (milliseconds)
    pub interval_ms: BTreeMap<String, StatsSummary>,

    /// Drift flags per stream
    pub drift_counts: BTreeMap<String, u64>,

    /// Signal-to-noise statistics per channel over its windows
    pub snr: BTreeMap<String, StatsSummary>,
}

impl RunSummary {
    pub fn from_report(report: &SyncReport) -> Self {
        let fallbacks = report
            .notes
            .iter()
            .filter(|n| matches!(n.kind, QualityNoteKind::SplineFallback { .. }))
            .count() as u64;

        let mut interval_ms = BTreeMap::new();
        let mut drift_counts = BTreeMap::new();
        for (kind, summary) in [
            (StreamKind::Ins, &report.ins),
            (StreamKind::Magnetometer, &report.magnetometer),
        ] {
            let mut stats = RunningStats::default();
            for interval in summary.drift.intervals.iter().flatten() {
                stats.push(interval * 1000.0);
            }
            interval_ms.insert(kind.as_str().to_string(), StatsSummary::from(&stats));
            drift_counts.insert(
                kind.as_str().to_string(),
                summary.drift.drifted.len() as u64,
            );
        }

        let mut snr_stats: BTreeMap<String, RunningStats> = BTreeMap::new();
        for score in &report.quality {
            snr_stats
                .entry(score.channel.clone())
                .or_default()
                .push(score.signal_noise_ratio);
        }

        Self {
            output_rows: report.output_rows as u64,
            trimmed_rows: report.trimmed_rows as u64,
            incomplete_rows: report.dropped_incomplete_rows as u64,
            fallbacks,
            overlap_s: report.overlap_s,
            interval_ms,
            drift_counts,
            snr: snr_stats
                .iter()
                .map(|(k, v)| (k.clone(), StatsSummary::from(v)))
                .collect(),
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Run Summary ===")?;
        writeln!(f, "Rows written: {}", self.output_rows)?;
        writeln!(f, "Trailing rows trimmed: {}", self.trimmed_rows)?;
        if self.incomplete_rows > 0 {
            writeln!(f, "Incomplete rows dropped: {}", self.incomplete_rows)?;
        }
        writeln!(f, "Spline fallbacks: {}", self.fallbacks)?;
        writeln!(f, "Overlap (s): {:.3}", self.overlap_s)?;

        for (stream, stats) in &self.interval_ms {
            let drifted = self.drift_counts.get(stream).copied().unwrap_or(0);
            writeln!(f, "{stream} interval (ms): {stats} drifted={drifted}")?;
        }

        if !self.snr.is_empty() {
            writeln!(f, "Signal/noise per channel:")?;
            for (channel, stats) in &self.snr {
                writeln!(f, "  {channel}: {stats}")?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance (ddof = 1)
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
