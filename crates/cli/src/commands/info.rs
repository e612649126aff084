//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{format_timestamp, StreamKind, SyncConfig};
use ingestion::LoadedLog;
use magsync::pipeline::load_log;
use serde::Serialize;
use sync_engine::{classify, detect_drift, prepare};
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Log info for JSON output
#[derive(Serialize)]
struct LogInfo {
    stream: StreamKind,
    path: String,
    rows_read: usize,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<String>,
    duration_s: f64,
    channels: Vec<ChannelInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    text_columns: Vec<String>,
    drift: DriftInfo,
}

#[derive(Serialize)]
struct ChannelInfo {
    name: String,
    category: String,
    present: usize,
}

#[derive(Serialize)]
struct DriftInfo {
    window: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_interval_ms: Option<f64>,
    flagged: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(
        ins = %args.input.ins.display(),
        mag = %args.input.mag.display(),
        "Loading log info"
    );

    let config = load_config(args.input.config.as_deref())?;
    let logs = [
        (StreamKind::Ins, &args.input.ins),
        (StreamKind::Magnetometer, &args.input.mag),
    ]
    .into_iter()
    .map(|(kind, path)| {
        let loaded = load_log(kind, path)
            .with_context(|| format!("Failed to load {kind} log {}", path.display()))?;
        build_log_info(path.display().to_string(), loaded, &config)
    })
    .collect::<Result<Vec<_>>>()?;

    if args.json {
        let json = serde_json::to_string_pretty(&logs).context("Failed to serialize log info")?;
        println!("{}", json);
    } else {
        for log in &logs {
            print_log_info(log);
        }
    }

    Ok(())
}

fn build_log_info(path: String, loaded: LoadedLog, config: &SyncConfig) -> Result<LogInfo> {
    let kind = loaded.stream.kind();
    let channels = loaded
        .stream
        .channels()
        .iter()
        .map(|c| ChannelInfo {
            name: c.name.clone(),
            category: classify(&c.name, kind).to_string(),
            present: c.present_count(),
        })
        .collect();

    let prepared = prepare(loaded.stream)
        .with_context(|| format!("Failed to prepare {kind} log"))?;
    let stream = prepared.stream;
    let drift = detect_drift(stream.timestamps(), config.drift_window, config.drift_sigma);

    Ok(LogInfo {
        stream: kind,
        path,
        rows_read: loaded.stats.rows_read,
        records: stream.len(),
        first: stream.timestamps().first().map(|&t| format_timestamp(t)),
        last: stream.timestamps().last().map(|&t| format_timestamp(t)),
        duration_s: stream.duration_secs(),
        channels,
        text_columns: loaded.text_columns,
        drift: DriftInfo {
            window: drift.window,
            mean_interval_ms: drift.mean_interval().map(|s| s * 1000.0),
            flagged: drift.drifted.len(),
        },
    })
}

fn print_log_info(log: &LogInfo) {
    println!("\n=== {} log: {} ===\n", log.stream, log.path);
    println!("Records: {} ({} rows read)", log.records, log.rows_read);
    if let (Some(first), Some(last)) = (&log.first, &log.last) {
        println!("Range: {} .. {} ({:.3}s)", first, last, log.duration_s);
    }

    println!("\nChannels ({}):", log.channels.len());
    for channel in &log.channels {
        println!(
            "  - {} [{}] {} present",
            channel.name, channel.category, channel.present
        );
    }
    if !log.text_columns.is_empty() {
        println!("\nText columns (not reconstructed): {}", log.text_columns.join(", "));
    }

    println!("\nDrift (window {}):", log.drift.window);
    if let Some(mean) = log.drift.mean_interval_ms {
        println!("  Mean interval: {:.3} ms", mean);
    }
    println!("  Flagged samples: {}", log.drift.flagged);
    println!();
}
