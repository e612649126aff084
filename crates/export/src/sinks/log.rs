//! LogSink - logs a run summary via tracing

use contracts::{MergedTable, SyncReport};
use tracing::{info, instrument, warn};

use super::TableSink;
use crate::Result;

/// Sink that logs the headline figures of a run
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TableSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_write", skip(self, table, report), fields(sink = %self.name))]
    fn write(&mut self, table: &MergedTable, report: &SyncReport) -> Result<usize> {
        info!(
            sink = %self.name,
            grid_start = %report.grid_start,
            grid_end = %report.grid_end,
            rows = table.row_count(),
            columns = table.columns().len(),
            trimmed = report.trimmed_rows,
            "merged table ready"
        );
        for note in &report.notes {
            warn!(sink = %self.name, stream = %note.stream, channel = %note.channel, note = ?note.kind, "quality note");
        }
        Ok(table.row_count())
    }
}
