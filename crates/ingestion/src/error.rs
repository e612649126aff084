//! Ingestion error types

use std::path::PathBuf;

use contracts::{ContractError, StreamKind};
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Log file could not be opened or read
    #[error("failed to read {stream} log {}: {source}", path.display())]
    Read {
        stream: StreamKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV
    #[error("csv error in {stream} log: {source}")]
    Csv {
        stream: StreamKind,
        #[source]
        source: csv::Error,
    },

    /// Row-level parse failure
    #[error("parse error in {stream} log at line {line}: {message}")]
    Parse {
        stream: StreamKind,
        line: u64,
        message: String,
    },

    /// Header row lacks the `timestamp` column
    #[error("{stream} log has no '{column}' column")]
    MissingTimestampColumn { stream: StreamKind, column: String },

    /// Stream-level contract violation (shape, empty stream)
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl IngestionError {
    pub fn parse(stream: StreamKind, line: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            stream,
            line,
            message: message.into(),
        }
    }

    pub fn csv(stream: StreamKind, source: csv::Error) -> Self {
        Self::Csv { stream, source }
    }
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
