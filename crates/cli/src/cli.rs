//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// magsync - INS / magnetometer log synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "magsync",
    author,
    version,
    about = "Synchronize INS and magnetometer logs onto a common time grid",
    long_about = "Merges an INS log and a magnetometer log onto a uniform 10 ms grid.\n\n\
                  Angular rates are spline reconstructed, other INS channels use \n\
                  inverse-distance weighting and magnetometer channels are snapped \n\
                  to the nearest sample."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MAGSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MAGSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize two logs and write the merged CSV
    Sync(SyncArgs),

    /// Check schema and overlap without writing anything
    Validate(ValidateArgs),

    /// Show columns, categories, time ranges and drift of both logs
    Info(InfoArgs),

    /// Compare a raw magnetometer log with a merged output
    Evaluate(EvaluateArgs),

    /// Merge densely spaced magnetometer records
    Coalesce(CoalesceArgs),
}

/// Input log paths shared by several commands
#[derive(Parser, Debug, Clone)]
pub struct InputArgs {
    /// INS log (CSV)
    #[arg(long, env = "MAGSYNC_INS")]
    pub ins: PathBuf,

    /// Magnetometer log (CSV)
    #[arg(long, env = "MAGSYNC_MAG")]
    pub mag: PathBuf,

    /// Sync configuration file (TOML or JSON)
    #[arg(short, long, env = "MAGSYNC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `sync` command
#[derive(Parser, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Merged CSV destination
    #[arg(short, long, env = "MAGSYNC_OUTPUT")]
    pub output: PathBuf,

    /// Write the run report as JSON
    #[arg(long, env = "MAGSYNC_REPORT")]
    pub report: Option<PathBuf>,

    /// Override the grid interval (milliseconds)
    #[arg(long, env = "MAGSYNC_GRID_MS")]
    pub grid_ms: Option<u64>,

    /// Override the minimum overlap (seconds)
    #[arg(long, env = "MAGSYNC_MIN_OVERLAP_S")]
    pub min_overlap_s: Option<f64>,

    /// Drop every row that still has a missing cell
    #[arg(long)]
    pub drop_incomplete: bool,

    /// Coalesce dense magnetometer records before synchronizing
    #[arg(long)]
    pub coalesce_mag: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `evaluate` command
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Raw magnetometer log
    #[arg(long, env = "MAGSYNC_MAG")]
    pub mag: PathBuf,

    /// Merged output of `sync`
    #[arg(long)]
    pub merged: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `coalesce` command
#[derive(Parser, Debug)]
pub struct CoalesceArgs {
    /// Magnetometer log to clean up
    #[arg(short, long)]
    pub input: PathBuf,

    /// Destination (default: `<stem>_processed.csv` next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sync configuration file holding the `coalesce` table
    #[arg(short, long, env = "MAGSYNC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
