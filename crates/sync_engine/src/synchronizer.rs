//! Synchronizer
//!
//! Prepares both streams, validates them, builds the common grid and merges
//! every channel onto it with its category's strategy.

use std::time::Instant;

use contracts::{
    format_timestamp, micros_to_secs, ChannelCategory, ContractError, DriftReport, MergedColumn,
    MergedTable, QualityNote, QualityNoteKind, SampleStream, StreamKind, StreamSummary, SyncConfig,
    SyncReport, TimeGrid,
};
use tracing::{debug, info, instrument, warn};

use crate::classifier::{classify, is_base_time, validate_schema};
use crate::coalesce::coalesce_dense;
use crate::drift::detect_drift;
use crate::interpolate::{
    angular_rate, inverse_distance, nearest, AngularRateMethod, AngularRateParams,
};
use crate::prepare::{prepare, PrepareStats};
use crate::quality::score_windows;

/// Decimals kept on positional channels
const POSITIONAL_DECIMALS: i32 = 8;

/// Merged table and its diagnostics
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub table: MergedTable,
    pub report: SyncReport,
}

/// Validated inputs of a run, before any reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    pub grid: TimeGrid,
    /// Records left after preparation
    pub ins_records: usize,
    pub mag_records: usize,
}

/// Prepared stream plus what happened to it on the way in
struct StreamState {
    stream: SampleStream,
    stats: PrepareStats,
    dense_pairs: usize,
}

/// INS / magnetometer synchronizer
///
/// Holds no state between calls; every `synchronize` owns both streams for
/// its duration.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run the schema and overlap checks without reconstructing anything
    #[instrument(name = "sync_engine_plan", skip_all)]
    pub fn plan(&self, ins: SampleStream, mag: SampleStream) -> Result<SyncPlan, ContractError> {
        self.config.check_ranges()?;
        let ins = self.admit(ins)?;
        let mag = self.admit(mag)?;
        let grid = self.build_grid(&ins.stream, &mag.stream)?;
        Ok(SyncPlan {
            grid,
            ins_records: ins.stream.len(),
            mag_records: mag.stream.len(),
        })
    }

    /// Merge an INS and a magnetometer stream onto the common grid
    #[instrument(
        name = "sync_engine_synchronize",
        skip_all,
        fields(ins_records = ins.len(), mag_records = mag.len())
    )]
    pub fn synchronize(
        &self,
        ins: SampleStream,
        mag: SampleStream,
    ) -> Result<SyncOutcome, ContractError> {
        let started = Instant::now();
        self.config.check_ranges()?;

        let ins = self.admit(ins)?;
        let mag = self.admit(mag)?;

        let grid = self.build_grid(&ins.stream, &mag.stream)?;
        info!(
            start = %format_timestamp(grid.start()),
            end = %format_timestamp(grid.end()),
            rows = grid.len(),
            "grid built"
        );

        let ins_drift = self.drift(&ins.stream);
        let mag_drift = self.drift(&mag.stream);

        let mut notes = Vec::new();
        let mut dropped_columns = Vec::new();
        let mut columns = self.reconstruct_ins(&ins.stream, &grid, &mut notes, &mut dropped_columns);
        columns.extend(self.snap_magnetometer(&mag.stream, &ins.stream, &grid, &mut dropped_columns));

        for column in columns
            .iter_mut()
            .filter(|c| c.category == ChannelCategory::Positional)
        {
            round_in_place(&mut column.values, POSITIONAL_DECIMALS);
        }

        let mut table = MergedTable::new(grid.instants().collect(), columns)?;
        let trimmed_rows = trim_trailing(&mut table);
        let dropped_incomplete_rows = if self.config.drop_incomplete_rows {
            table.retain_rows(|t, row| !t.row_has_missing(row))
        } else {
            0
        };

        let quality = score_windows(&table, self.config.quality_window);

        let report = SyncReport {
            grid_start: format_timestamp(grid.start()),
            grid_end: format_timestamp(grid.end()),
            interval_ms: self.config.grid_interval_ms,
            overlap_s: grid.span_secs(),
            grid_rows: grid.len(),
            output_rows: table.row_count(),
            trimmed_rows,
            dropped_incomplete_rows,
            dropped_columns,
            ins: summarize(&ins, ins_drift),
            magnetometer: summarize(&mag, mag_drift),
            quality,
            notes,
        };

        observability::record_sync_duration_ms(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            output_rows = report.output_rows,
            trimmed_rows,
            dropped_incomplete_rows,
            notes = report.notes.len(),
            "streams synchronized"
        );
        Ok(SyncOutcome { table, report })
    }

    /// Prepare, validate and optionally coalesce one stream
    fn admit(&self, stream: SampleStream) -> Result<StreamState, ContractError> {
        let kind = stream.kind();
        let prepared = prepare(stream)?;
        validate_schema(&prepared.stream)?;

        observability::record_rows_dropped(kind.as_str(), "empty", prepared.stats.empty_rows);
        observability::record_rows_dropped(kind.as_str(), "duplicate", prepared.stats.duplicates);

        let mut state = StreamState {
            stream: prepared.stream,
            stats: prepared.stats,
            dense_pairs: 0,
        };

        if kind == StreamKind::Magnetometer && self.config.coalesce_magnetometer {
            let outcome = coalesce_dense(state.stream, &self.config.coalesce)?;
            observability::record_rows_dropped(kind.as_str(), "dense", outcome.merged_pairs);
            state.stream = outcome.stream;
            state.dense_pairs = outcome.merged_pairs;
        }
        Ok(state)
    }

    /// Grid over the overlap of both streams, failing if it is too short
    fn build_grid(&self, ins: &SampleStream, mag: &SampleStream) -> Result<TimeGrid, ContractError> {
        let ins_range = ins
            .time_range()
            .ok_or(ContractError::EmptyStream { stream: ins.kind() })?;
        let mag_range = mag
            .time_range()
            .ok_or(ContractError::EmptyStream { stream: mag.kind() })?;

        let step = self.config.grid_step_us();
        let (start, end) = TimeGrid::overlap_bounds(ins_range, mag_range, step);
        let overlap_s = micros_to_secs(end - start);

        if end < start || overlap_s < self.config.min_overlap_s {
            return Err(ContractError::Overlap {
                overlap_s,
                required_s: self.config.min_overlap_s,
                start: format_timestamp(start),
                end: format_timestamp(end),
            });
        }

        TimeGrid::new(start, end, step)
            .ok_or_else(|| ContractError::Other(format!("invalid grid {start}..{end} step {step}")))
    }

    fn drift(&self, stream: &SampleStream) -> DriftReport {
        let report = detect_drift(
            stream.timestamps(),
            self.config.drift_window,
            self.config.drift_sigma,
        );
        observability::record_drift_flags(stream.kind(), report.drifted.len());
        if !report.drifted.is_empty() {
            warn!(
                stream = %stream.kind(),
                flagged = report.drifted.len(),
                "sampling interval drift detected"
            );
        }
        report
    }

    fn reconstruct_ins(
        &self,
        ins: &SampleStream,
        grid: &TimeGrid,
        notes: &mut Vec<QualityNote>,
        dropped: &mut Vec<String>,
    ) -> Vec<MergedColumn> {
        let params = AngularRateParams {
            outlier_sigma: self.config.outlier_sigma,
            spline_min_points: self.config.spline_min_points,
            median_kernel: self.config.median_kernel,
        };
        let timestamps = ins.timestamps();

        let mut columns = Vec::with_capacity(ins.channels().len());
        for channel in ins.channels() {
            if is_base_time(&channel.name) {
                dropped.push(channel.name.clone());
                continue;
            }
            let category = classify(&channel.name, StreamKind::Ins);
            let values = match category {
                ChannelCategory::AngularRate => {
                    let outcome = angular_rate(timestamps, &channel.values, grid, &params);
                    if outcome.suppressed > 0 {
                        debug!(channel = %channel.name, count = outcome.suppressed, "outliers suppressed");
                        notes.push(QualityNote {
                            stream: StreamKind::Ins,
                            channel: channel.name.clone(),
                            kind: QualityNoteKind::OutliersSuppressed {
                                count: outcome.suppressed,
                            },
                        });
                    }
                    if let AngularRateMethod::LinearFallback { valid_points } = outcome.method {
                        warn!(
                            channel = %channel.name,
                            valid_points,
                            required = params.spline_min_points,
                            "too few points for spline, using linear interpolation"
                        );
                        observability::record_quality_fallback(StreamKind::Ins, &channel.name);
                        notes.push(QualityNote {
                            stream: StreamKind::Ins,
                            channel: channel.name.clone(),
                            kind: QualityNoteKind::SplineFallback { valid_points },
                        });
                    }
                    outcome.values
                }
                _ => inverse_distance(
                    timestamps,
                    &channel.values,
                    grid,
                    self.config.interpolation_window,
                    self.config.weight_epsilon,
                ),
            };
            columns.push(MergedColumn {
                name: channel.name.clone(),
                category,
                source: StreamKind::Ins,
                values,
            });
        }
        columns
    }

    fn snap_magnetometer(
        &self,
        mag: &SampleStream,
        ins: &SampleStream,
        grid: &TimeGrid,
        dropped: &mut Vec<String>,
    ) -> Vec<MergedColumn> {
        let mut columns = Vec::with_capacity(mag.channels().len());
        for channel in mag.channels() {
            let name = if ins.channel(&channel.name).is_some() {
                format!("mag_{}", channel.name)
            } else {
                channel.name.clone()
            };
            if is_base_time(&name) {
                dropped.push(name);
                continue;
            }
            columns.push(MergedColumn {
                category: classify(&channel.name, StreamKind::Magnetometer),
                values: nearest(mag.timestamps(), &channel.values, grid),
                source: StreamKind::Magnetometer,
                name,
            });
        }
        columns
    }
}

/// Drop trailing rows whose every channel is missing
fn trim_trailing(table: &mut MergedTable) -> usize {
    let rows = table.row_count();
    let keep = (0..rows)
        .rev()
        .find(|&row| !table.row_is_empty(row))
        .map_or(0, |row| row + 1);
    table.truncate(keep);
    rows - keep
}

fn round_in_place(values: &mut [f64], decimals: i32) {
    let scale = 10f64.powi(decimals);
    for v in values.iter_mut().filter(|v| v.is_finite()) {
        *v = (*v * scale).round() / scale;
    }
}

fn summarize(state: &StreamState, drift: DriftReport) -> StreamSummary {
    let timestamps = state.stream.timestamps();
    StreamSummary {
        records: state.stream.len(),
        channels: state.stream.column_names().map(str::to_string).collect(),
        first: timestamps.first().map(|&t| format_timestamp(t)),
        last: timestamps.last().map(|&t| format_timestamp(t)),
        coalesced_duplicates: state.stats.duplicates,
        dropped_empty_rows: state.stats.empty_rows,
        dense_pairs_merged: state.dense_pairs,
        drift,
    }
}
