//! Pipeline orchestrator - load, synchronize, write.
//!
//! The stages are plain functions; `Pipeline` runs them on tokio blocking
//! tasks, `synchronize_files` runs them in sequence on the caller's thread.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::{StreamKind, SyncConfig, SyncReport};
use export::{CsvSink, LogSink, ReportSink, TableSink};
use ingestion::{CsvLogLoader, LoadedLog};
use sync_engine::{SyncOutcome, Synchronizer};
use tracing::{debug, info, instrument, warn};

use super::PipelineStats;
use crate::{PipelineError, Result};

/// Where a run writes its results
#[derive(Debug, Clone)]
pub struct OutputTargets {
    /// Merged CSV
    pub output: PathBuf,

    /// JSON run report (optional)
    pub report: Option<PathBuf>,
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ins_path: PathBuf,
    pub mag_path: PathBuf,
    pub targets: OutputTargets,
    pub sync: SyncConfig,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Both logs are parsed concurrently; synchronization and writing run
    /// on one blocking task.
    pub async fn run(self) -> Result<PipelineStats> {
        let started = Instant::now();
        let PipelineConfig {
            ins_path,
            mag_path,
            targets,
            sync,
        } = self.config;

        config_loader::ConfigLoader::validate(&sync)?;

        info!(ins = %ins_path.display(), mag = %mag_path.display(), "Loading logs");
        let ins_task = tokio::task::spawn_blocking(move || load_log(StreamKind::Ins, &ins_path));
        let mag_task =
            tokio::task::spawn_blocking(move || load_log(StreamKind::Magnetometer, &mag_path));
        let (ins, mag) = tokio::try_join!(ins_task, mag_task)
            .map_err(|e| PipelineError::task("load", e.to_string()))?;
        let (ins, mag) = (ins?, mag?);
        let load_duration = started.elapsed();

        let ins_load = ins.stats.clone();
        let mag_load = mag.stats.clone();

        let (report, rows_written) = tokio::task::spawn_blocking(move || {
            let outcome = run_engine(ins, mag, &sync)?;
            let rows = write_outputs(&outcome, &targets)?;
            Ok::<_, PipelineError>((outcome.report, rows))
        })
        .await
        .map_err(|e| PipelineError::task("synchronize", e.to_string()))??;

        Ok(PipelineStats {
            report,
            rows_written,
            ins_load,
            mag_load,
            load_duration,
            duration: started.elapsed(),
        })
    }
}

/// Load one log
pub fn load_log(kind: StreamKind, path: &Path) -> Result<LoadedLog> {
    let loaded = CsvLogLoader::new(kind).load_path(path)?;
    if !loaded.text_columns.is_empty() {
        debug!(stream = %kind, columns = ?loaded.text_columns, "text columns left out");
    }
    if loaded.stats.unparseable_timestamps > 0 {
        warn!(
            stream = %kind,
            rows = loaded.stats.unparseable_timestamps,
            "rows with unparseable timestamps dropped"
        );
    }
    Ok(loaded)
}

/// Synchronize two loaded logs
pub fn run_engine(ins: LoadedLog, mag: LoadedLog, config: &SyncConfig) -> Result<SyncOutcome> {
    Ok(Synchronizer::new(config.clone()).synchronize(ins.stream, mag.stream)?)
}

/// Hand a finished run to every configured sink; returns the rows written
pub fn write_outputs(outcome: &SyncOutcome, targets: &OutputTargets) -> Result<usize> {
    let mut sinks: Vec<Box<dyn TableSink>> = vec![
        Box::new(CsvSink::create("merged_csv", &targets.output)?),
        Box::new(LogSink::new("log")),
    ];
    if let Some(path) = &targets.report {
        sinks.push(Box::new(ReportSink::new("report_json", path.clone())));
    }

    for sink in &mut sinks {
        let rows = sink.write(&outcome.table, &outcome.report)?;
        sink.flush()?;
        debug!(sink = sink.name(), rows, "sink done");
    }

    observability::record_run(&outcome.report);
    info!(output = %targets.output.display(), rows = outcome.table.row_count(), "outputs written");
    Ok(outcome.table.row_count())
}

/// Load both logs, synchronize them and write the merged CSV
#[instrument(
    name = "synchronize_files",
    skip(config),
    fields(ins = %ins_path.display(), mag = %mag_path.display())
)]
pub fn synchronize_files(
    ins_path: &Path,
    mag_path: &Path,
    output_path: &Path,
    config: &SyncConfig,
) -> Result<SyncReport> {
    config_loader::ConfigLoader::validate(config)?;

    let ins = load_log(StreamKind::Ins, ins_path)?;
    let mag = load_log(StreamKind::Magnetometer, mag_path)?;
    let outcome = run_engine(ins, mag, config)?;

    let targets = OutputTargets {
        output: output_path.to_path_buf(),
        report: None,
    };
    write_outputs(&outcome, &targets)?;
    Ok(outcome.report)
}
