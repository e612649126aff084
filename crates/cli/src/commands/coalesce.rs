//! `coalesce` command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contracts::StreamKind;
use magsync::pipeline::load_log;
use sync_engine::coalesce_dense;
use tracing::info;

use super::load_config;
use crate::cli::CoalesceArgs;

/// Execute the `coalesce` command
pub fn run_coalesce(args: &CoalesceArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| processed_path(&args.input));

    info!(
        input = %args.input.display(),
        output = %output.display(),
        "Coalescing dense magnetometer records"
    );

    let loaded = load_log(StreamKind::Magnetometer, &args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let outcome =
        coalesce_dense(loaded.stream, &config.coalesce).context("Failed to coalesce records")?;
    let rows = export::write_stream_path(&output, &outcome.stream)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Coalescing complete");
    println!("  Pairs merged: {}", outcome.merged_pairs);
    println!("  Rows written: {}", rows);
    println!("  Output: {}", output.display());
    Ok(())
}

/// `<dir>/<stem>_processed.csv` next to `input`
fn processed_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_processed.csv"))
}
