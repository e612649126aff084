//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{format_timestamp, StreamKind};
use magsync::pipeline::load_log;
use serde::Serialize;
use sync_engine::Synchronizer;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    ins_path: String,
    mag_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<GridSummary>,
}

#[derive(Serialize)]
struct GridSummary {
    grid_start: String,
    grid_end: String,
    overlap_s: f64,
    grid_rows: usize,
    ins_records: usize,
    mag_records: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(
        ins = %args.input.ins.display(),
        mag = %args.input.mag.display(),
        "Validating logs"
    );

    let config = load_config(args.input.config.as_deref())?;
    let result = validate_logs(args, Synchronizer::new(config));

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Validation failed")
    }
}

fn validate_logs(args: &ValidateArgs, synchronizer: Synchronizer) -> ValidationResult {
    let mut result = ValidationResult {
        valid: false,
        ins_path: args.input.ins.display().to_string(),
        mag_path: args.input.mag.display().to_string(),
        error: None,
        warnings: Vec::new(),
        summary: None,
    };

    let loaded = load_log(StreamKind::Ins, &args.input.ins)
        .and_then(|ins| Ok((ins, load_log(StreamKind::Magnetometer, &args.input.mag)?)));
    let (ins, mag) = match loaded {
        Ok(pair) => pair,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    for (kind, log) in [(StreamKind::Ins, &ins), (StreamKind::Magnetometer, &mag)] {
        if log.stats.unparseable_timestamps > 0 {
            result.warnings.push(format!(
                "{kind} log: {} rows with unparseable timestamps dropped",
                log.stats.unparseable_timestamps
            ));
        }
        for header in &log.stats.duplicate_headers {
            result
                .warnings
                .push(format!("{kind} log: duplicate column '{header}' ignored"));
        }
    }

    match synchronizer.plan(ins.stream, mag.stream) {
        Ok(plan) => {
            result.valid = true;
            result.summary = Some(GridSummary {
                grid_start: format_timestamp(plan.grid.start()),
                grid_end: format_timestamp(plan.grid.end()),
                overlap_s: plan.grid.span_secs(),
                grid_rows: plan.grid.len(),
                ins_records: plan.ins_records,
                mag_records: plan.mag_records,
            });
        }
        Err(e) => result.error = Some(e.to_string()),
    }
    result
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Logs are valid: {} + {}", result.ins_path, result.mag_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Grid: {} .. {}", summary.grid_start, summary.grid_end);
            println!("  Overlap: {:.3}s", summary.overlap_s);
            println!("  Rows: {}", summary.grid_rows);
            println!("  INS records: {}", summary.ins_records);
            println!("  Magnetometer records: {}", summary.mag_records);
        }
    } else {
        println!("✗ Logs are invalid: {} + {}", result.ins_path, result.mag_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n⚠ Warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
}
