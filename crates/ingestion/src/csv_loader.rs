//! CSV log loader
//!
//! Reads one sensor log into a raw `SampleStream`: headers trimmed and
//! lowercased, timestamps parsed, numeric columns kept as channels. Sorting,
//! duplicate folding and empty-row removal are left to the engine.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use contracts::{Channel, ContractError, Micros, SampleStream, StreamKind};
use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::timestamp::parse_timestamp;

/// Header of the wall-clock column in both logs
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Counters collected while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read from the file
    pub rows_read: usize,
    /// Rows dropped because the timestamp did not parse
    pub unparseable_timestamps: usize,
    /// Header names seen more than once (later copies ignored)
    pub duplicate_headers: Vec<String>,
}

/// Result of loading one log
#[derive(Debug, Clone)]
pub struct LoadedLog {
    pub stream: SampleStream,
    pub stats: LoadStats,
    /// Columns with non-numeric cells, excluded from reconstruction
    pub text_columns: Vec<String>,
}

/// Loader for one kind of sensor log
#[derive(Debug, Clone)]
pub struct CsvLogLoader {
    kind: StreamKind,
    timestamp_column: String,
    strict: bool,
}

struct ColumnBuilder {
    index: usize,
    name: String,
    values: Vec<f64>,
    numeric: bool,
}

impl CsvLogLoader {
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            timestamp_column: TIMESTAMP_COLUMN.to_string(),
            strict: false,
        }
    }

    /// Use a different (lowercase) timestamp header
    pub fn with_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = column.into();
        self
    }

    /// Fail on the first unparseable timestamp instead of dropping the row
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Load a log file
    #[instrument(
        name = "ingestion_load_path",
        skip(self),
        fields(stream = %self.kind, path = %path.display())
    )]
    pub fn load_path(&self, path: &Path) -> Result<LoadedLog> {
        let file = File::open(path).map_err(|source| IngestionError::Read {
            stream: self.kind,
            path: path.to_path_buf(),
            source,
        })?;
        self.load_reader(BufReader::new(file))
    }

    /// Load a log from any reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedLog> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| IngestionError::csv(self.kind, e))?
            .iter()
            .map(normalize_header)
            .collect();

        let ts_index = headers
            .iter()
            .position(|h| *h == self.timestamp_column)
            .ok_or_else(|| IngestionError::MissingTimestampColumn {
                stream: self.kind,
                column: self.timestamp_column.clone(),
            })?;

        let mut stats = LoadStats::default();
        let mut columns: Vec<ColumnBuilder> = Vec::new();
        for (index, name) in headers.iter().enumerate() {
            if index == ts_index || name.is_empty() {
                continue;
            }
            if columns.iter().any(|c| c.name == *name) {
                warn!(stream = %self.kind, column = %name, "duplicate header ignored");
                stats.duplicate_headers.push(name.clone());
                continue;
            }
            columns.push(ColumnBuilder {
                index,
                name: name.clone(),
                values: Vec::new(),
                numeric: true,
            });
        }

        let mut timestamps: Vec<Micros> = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| IngestionError::csv(self.kind, e))?;
            stats.rows_read += 1;

            let raw_ts = record.get(ts_index).unwrap_or("");
            let Some(ts) = parse_timestamp(raw_ts) else {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                if self.strict {
                    return Err(IngestionError::parse(
                        self.kind,
                        line,
                        format!("unparseable timestamp '{raw_ts}'"),
                    ));
                }
                debug!(stream = %self.kind, line, raw = raw_ts, "dropping row with bad timestamp");
                stats.unparseable_timestamps += 1;
                continue;
            };
            timestamps.push(ts);

            for column in &mut columns {
                let cell = record.get(column.index).unwrap_or("");
                let value = if cell.is_empty() {
                    f64::NAN
                } else {
                    match cell.parse::<f64>() {
                        Ok(v) => v,
                        Err(_) => {
                            column.numeric = false;
                            f64::NAN
                        }
                    }
                };
                column.values.push(value);
            }
        }

        if timestamps.is_empty() {
            return Err(ContractError::EmptyStream { stream: self.kind }.into());
        }

        let (numeric, text): (Vec<_>, Vec<_>) = columns.into_iter().partition(|c| c.numeric);
        let text_columns: Vec<String> = text.into_iter().map(|c| c.name).collect();
        let channels: Vec<Channel> = numeric
            .into_iter()
            .map(|c| Channel::new(c.name, c.values))
            .collect();

        let stream = SampleStream::new(self.kind, timestamps, channels)?;

        observability::record_stream_loaded(self.kind, stream.len());
        observability::record_rows_dropped(
            self.kind.as_str(),
            "unparseable_timestamp",
            stats.unparseable_timestamps,
        );
        info!(
            stream = %self.kind,
            rows = stats.rows_read,
            records = stream.len(),
            channels = stream.channels().len(),
            text_columns = text_columns.len(),
            bad_timestamps = stats.unparseable_timestamps,
            "log loaded"
        );

        Ok(LoadedLog {
            stream,
            stats,
            text_columns,
        })
    }
}

/// Trim, strip a byte-order mark and lowercase a header name
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}
