//! Synthetic Pipeline Example
//!
//! Writes a pair of synthetic INS / magnetometer logs with clock jitter and
//! a dropout, runs the full async pipeline over them and prints the result.
//!
//! Run with: cargo run -p demos --bin synthetic_pipeline [config_path]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use config_loader::ConfigLoader;
use contracts::{Micros, SyncConfig};
use export::formatter::format_precise_timestamp;
use magsync::{OutputTargets, Pipeline, PipelineConfig};
use tracing::info;

/// 2024-03-01 12:00:00 UTC
const START: Micros = 1_709_294_400_000_000;
const STEP: Micros = 10_000;
const RECORDS: usize = 1_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init()?;
    info!("Starting Synthetic Pipeline Demo");

    let sync = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading sync config");
            ConfigLoader::load_from_path(Path::new(&path))?
        }
        None => SyncConfig::default(),
    };

    // ==== Stage 1: Synthesize logs ====
    let dir = std::env::temp_dir().join("magsync_demo");
    fs::create_dir_all(&dir)?;
    let ins_path = dir.join("ins.csv");
    let mag_path = dir.join("mag.csv");
    fs::write(&ins_path, ins_log())?;
    fs::write(&mag_path, mag_log())?;
    info!(dir = %dir.display(), records = RECORDS, "Synthetic logs written");

    // ==== Stage 2: Run pipeline ====
    let config = PipelineConfig {
        ins_path,
        mag_path,
        targets: OutputTargets {
            output: dir.join("merged.csv"),
            report: Some(dir.join("report.json")),
        },
        sync,
    };
    let output = config.targets.output.clone();
    let stats = Pipeline::new(config).run().await?;

    // ==== Stage 3: Summary ====
    stats.print_summary();
    print_head(&output, 5)?;
    Ok(())
}

/// Deterministic jitter in `[-1.5, 1.5]` ms
fn jitter(i: usize, salt: usize) -> Micros {
    (((i * 7919 + salt * 104_729) % 3001) as Micros) - 1_500
}

fn ins_log() -> String {
    let mut out = String::from(
        "Timestamp,Acceleration X (g),Acceleration Y (g),Acceleration Z (g),\
         Angular_Velocity_Z (dps),Temperature (°C),Longitude,Latitude\n",
    );
    for i in 0..RECORDS {
        let t = START + i as Micros * STEP + jitter(i, 1);
        let phase = i as f64 * 0.02;
        // a spike the outlier band removes
        let rate = if i == 500 { 900.0 } else { phase.sin() * 15.0 };
        let _ = writeln!(
            out,
            "{},{:.6},{:.6},{:.6},{:.4},{:.2},{:.9},{:.9}",
            format_precise_timestamp(t),
            phase.cos() * 0.05,
            phase.sin() * 0.02,
            1.0,
            rate,
            24.0 + phase.sin(),
            113.9 + i as f64 * 2e-8,
            22.5 + i as f64 * 1e-8,
        );
    }
    out
}

fn mag_log() -> String {
    let mut out = String::from("timestamp,time,x,y,z\n");
    for i in 0..RECORDS {
        // 100 ms dropout
        if (400..410).contains(&i) {
            continue;
        }
        let t = START + 3_000 + i as Micros * STEP + jitter(i, 2);
        let phase = i as f64 * 0.01;
        let _ = writeln!(
            out,
            "{},{:.3},{:.8},{:.8},{:.8}",
            format_precise_timestamp(t),
            i as f64 * 0.01,
            0.30 + phase.sin() * 0.01,
            -0.12 + phase.cos() * 0.01,
            0.48,
        );
    }
    out
}

fn print_head(path: &Path, lines: usize) -> std::io::Result<()> {
    let text = fs::read_to_string(path)?;
    println!("\nFirst rows of {}:", path.display());
    for line in text.lines().take(lines + 1) {
        println!("  {line}");
    }
    Ok(())
}
