//! `evaluate` command implementation.

use anyhow::{Context, Result};
use contracts::StreamKind;
use magsync::pipeline::load_log;
use sync_engine::evaluate;
use tracing::info;

use crate::cli::EvaluateArgs;

/// Execute the `evaluate` command
pub fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    info!(
        mag = %args.mag.display(),
        merged = %args.merged.display(),
        "Evaluating interpolation"
    );

    let raw = load_log(StreamKind::Magnetometer, &args.mag)
        .with_context(|| format!("Failed to load {}", args.mag.display()))?;
    let merged = load_log(StreamKind::Merged, &args.merged)
        .with_context(|| format!("Failed to load {}", args.merged.display()))?;

    let report = evaluate(raw.stream.channels(), merged.stream.channels());
    if report.axes.is_empty() {
        anyhow::bail!("No magnetometer axis present in both files");
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize evaluation")?;
        println!("{}", json);
    } else {
        print!("{}", report);
    }
    Ok(())
}
