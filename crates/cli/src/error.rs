//! Error types for pipeline operations.

use contracts::ContractError;
use export::ExportError;
use ingestion::IngestionError;
use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Log loading error
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// Configuration, schema, overlap or data error
    #[error(transparent)]
    Sync(#[from] ContractError),

    /// Output writing error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A blocking stage panicked or was cancelled
    #[error("pipeline stage '{stage}' did not complete: {message}")]
    Task { stage: String, message: String },
}

impl PipelineError {
    pub fn task(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Task {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
