//! Sink implementations
//!
//! Contains CsvSink, ReportSink and LogSink, plus the single-stream writer.

mod csv;
mod log;
mod report;

use contracts::{MergedTable, SyncReport};

use crate::Result;

pub use self::csv::{write_stream, write_stream_path, CsvSink};
pub use self::log::LogSink;
pub use self::report::ReportSink;

/// Destination of a finished synchronization run
pub trait TableSink {
    fn name(&self) -> &str;

    /// Write the merged table and its report; returns the rows written
    fn write(&mut self, table: &MergedTable, report: &SyncReport) -> Result<usize>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
