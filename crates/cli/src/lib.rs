//! # magsync
//!
//! File-level entry points of the INS / magnetometer synchronizer.
//!
//! Provides:
//! - `synchronize_files`: load both logs, merge them and write the outputs
//! - The staged pipeline used by the `magsync` binary
//!
//! ## Usage
//!
//! ```no_run
//! use contracts::SyncConfig;
//! use std::path::Path;
//!
//! let report = magsync::synchronize_files(
//!     Path::new("ins.csv"),
//!     Path::new("mag.csv"),
//!     Path::new("merged.csv"),
//!     &SyncConfig::default(),
//! )
//! .unwrap();
//! println!("{} rows written", report.output_rows);
//! ```

pub mod error;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use pipeline::{synchronize_files, OutputTargets, Pipeline, PipelineConfig, PipelineStats};
