//! CsvSink - writes the merged table as CSV

use std::fs::File;
use std::io::Write;
use std::path::Path;

use contracts::{MergedTable, SampleStream, SyncReport};
use tracing::{debug, instrument};

use super::TableSink;
use crate::formatter::{format_plain, format_precise_timestamp, format_row, header, TIMESTAMP_HEADER};
use crate::{ExportError, Result};

/// Sink that renders the merged table with per-category precision
pub struct CsvSink<W: Write> {
    name: String,
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Create (or truncate) the output file
    pub fn create(name: impl Into<String>, path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| ExportError::create(path, e))?;
        Ok(Self::from_writer(name, file))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flush and give back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }
}

impl<W: Write> TableSink for CsvSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, table, _report),
        fields(sink = %self.name, rows = table.row_count())
    )]
    fn write(&mut self, table: &MergedTable, _report: &SyncReport) -> Result<usize> {
        self.writer.write_record(header(table))?;
        for row in 0..table.row_count() {
            self.writer.write_record(format_row(table, row))?;
        }
        debug!(sink = %self.name, rows = table.row_count(), "merged table written");
        Ok(table.row_count())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write one stream as CSV: its channels, then `timestamp`
///
/// Values use their shortest representation, timestamps microsecond
/// precision. Returns the rows written.
pub fn write_stream<W: Write>(writer: W, stream: &SampleStream) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);

    let names: Vec<&str> = stream
        .column_names()
        .chain(std::iter::once(TIMESTAMP_HEADER))
        .collect();
    writer.write_record(&names)?;

    for (row, &t) in stream.timestamps().iter().enumerate() {
        let record: Vec<String> = stream
            .row(row)
            .map(format_plain)
            .chain(std::iter::once(format_precise_timestamp(t)))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(stream.len())
}

/// [`write_stream`] into a newly created file
pub fn write_stream_path(path: &Path, stream: &SampleStream) -> Result<usize> {
    let file = File::create(path).map_err(|e| ExportError::create(path, e))?;
    write_stream(file, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Channel, ChannelCategory, MergedColumn, StreamKind};

    fn table() -> MergedTable {
        MergedTable::new(
            vec![1_704_164_645_670_000, 1_704_164_645_680_000],
            vec![MergedColumn {
                name: "temperature (°c)".into(),
                category: ChannelCategory::Generic,
                source: StreamKind::Ins,
                values: vec![25.0, f64::NAN],
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_sink_output() {
        let mut sink = CsvSink::from_writer("merged", Vec::new());
        let rows = sink.write(&table(), &SyncReport::default()).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "timestamp,temperature (°c)\n\
             2024-01-02 03:04:05.670,25.0000\n\
             2024-01-02 03:04:05.680,\n"
        );
    }

    #[test]
    fn test_csv_sink_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        let mut sink = CsvSink::create("merged", &path).unwrap();
        sink.write(&table(), &SyncReport::default()).unwrap();
        sink.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_create_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("merged.csv");
        match CsvSink::create("merged", &path) {
            Err(ExportError::Create { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_write_stream() {
        let stream = SampleStream::new(
            StreamKind::Magnetometer,
            vec![1_704_164_645_678_901],
            vec![Channel::new("time", vec![0.01]), Channel::new("x", vec![f64::NAN])],
        )
        .unwrap();
        let mut out = Vec::new();
        assert_eq!(write_stream(&mut out, &stream).unwrap(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "time,x,timestamp\n0.01,,2024-01-02 03:04:05.678901\n"
        );
    }
}
