//! # Sync Engine
//!
//! INS / magnetometer synchronization onto a uniform grid.
//!
//! Responsibilities:
//! - Stream preparation (sorting, duplicate folding, empty rows)
//! - Channel classification and schema checks
//! - Per-category reconstruction (spline, inverse-distance, nearest snap)
//! - Interval drift and windowed quality diagnostics
//! - Dense-sample coalescing and interpolation evaluation
//!
//! ## Usage
//!
//! ```ignore
//! use contracts::SyncConfig;
//! use sync_engine::Synchronizer;
//!
//! let outcome = Synchronizer::new(SyncConfig::default()).synchronize(ins, mag)?;
//! println!("{} rows", outcome.table.row_count());
//! ```

pub mod classifier;
pub mod cleaner;
mod coalesce;
mod drift;
pub mod evaluation;
pub mod interpolate;
mod prepare;
mod quality;
pub mod spline;
mod synchronizer;

pub use classifier::{classify, is_base_time, validate_schema};
pub use coalesce::{coalesce_dense, CoalesceOutcome};
pub use drift::detect_drift;
pub use evaluation::{evaluate, EvaluationReport};
pub use prepare::{nan_mean, prepare, PrepareStats, Prepared};
pub use quality::score_windows;
pub use synchronizer::{SyncOutcome, SyncPlan, Synchronizer};
