//! `sync` command implementation.

use anyhow::{Context, Result};
use magsync::{OutputTargets, Pipeline, PipelineConfig};
use tracing::info;

use super::load_config;
use crate::cli::SyncArgs;

/// Execute the `sync` command
pub async fn run_sync(args: &SyncArgs) -> Result<()> {
    let mut sync = load_config(args.input.config.as_deref())?;

    // Apply CLI overrides
    if let Some(grid_ms) = args.grid_ms {
        info!(grid_ms, "Overriding grid interval from CLI");
        sync.grid_interval_ms = grid_ms;
    }
    if let Some(min_overlap_s) = args.min_overlap_s {
        info!(min_overlap_s, "Overriding minimum overlap from CLI");
        sync.min_overlap_s = min_overlap_s;
    }
    sync.drop_incomplete_rows |= args.drop_incomplete;
    sync.coalesce_magnetometer |= args.coalesce_mag;

    config_loader::ConfigLoader::validate(&sync).context("Invalid sync configuration")?;

    info!(
        grid_ms = sync.grid_interval_ms,
        min_overlap_s = sync.min_overlap_s,
        drop_incomplete = sync.drop_incomplete_rows,
        coalesce_mag = sync.coalesce_magnetometer,
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(PipelineConfig {
        ins_path: args.input.ins.clone(),
        mag_path: args.input.mag.clone(),
        targets: OutputTargets {
            output: args.output.clone(),
            report: args.report.clone(),
        },
        sync,
    });

    let stats = pipeline.run().await.context("Synchronization failed")?;
    info!(
        rows_written = stats.rows_written,
        duration_secs = stats.duration.as_secs_f64(),
        output = %args.output.display(),
        "Synchronization completed successfully"
    );
    stats.print_summary();
    Ok(())
}
