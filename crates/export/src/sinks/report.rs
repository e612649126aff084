//! ReportSink - writes the run report as JSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{MergedTable, SyncReport};
use tracing::{debug, instrument};

use super::TableSink;
use crate::{ExportError, Result};

/// Sink that writes the `SyncReport` as pretty-printed JSON
pub struct ReportSink {
    name: String,
    path: PathBuf,
}

impl ReportSink {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for ReportSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "report_sink_write",
        skip(self, table, report),
        fields(sink = %self.name, path = %self.path.display())
    )]
    fn write(&mut self, table: &MergedTable, report: &SyncReport) -> Result<usize> {
        let file = File::create(&self.path).map_err(|e| ExportError::create(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        debug!(sink = %self.name, notes = report.notes.len(), "report written");
        Ok(table.row_count())
    }
}
