//! # Export
//!
//! Output side of a synchronization run.
//!
//! Responsibilities:
//! - Per-category precision formatting of merged values
//! - Sinks for the merged CSV, the JSON run report and a log summary
//! - Plain CSV rendering of a single stream (coalescer output)

pub mod error;
pub mod formatter;
pub mod sinks;

pub use error::{ExportError, Result};
pub use formatter::{format_plain, format_row, format_value, header};
pub use sinks::{write_stream, write_stream_path, CsvSink, LogSink, ReportSink, TableSink};
