//! Layered error definitions
//!
//! Categorized by source: config / schema / overlap / data

use thiserror::Error;

use crate::StreamKind;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Validation Errors =====
    /// Required channels absent from a stream
    #[error("schema error: {stream} log is missing required columns {missing:?}")]
    Schema {
        stream: StreamKind,
        missing: Vec<String>,
    },

    /// Not enough temporal overlap between the two streams
    #[error(
        "overlap error: streams overlap for {overlap_s:.3}s ({start} .. {end}), \
         at least {required_s:.3}s required"
    )]
    Overlap {
        overlap_s: f64,
        required_s: f64,
        start: String,
        end: String,
    },

    // ===== Data Errors =====
    /// A stream holds no usable records
    #[error("empty stream: {stream} log has no usable records")]
    EmptyStream { stream: StreamKind },

    /// Column lengths inside a stream or table disagree
    #[error("shape error for '{channel}': expected {expected} values, got {actual}")]
    Shape {
        channel: String,
        expected: usize,
        actual: usize,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create schema error
    pub fn schema(stream: StreamKind, missing: Vec<String>) -> Self {
        Self::Schema { stream, missing }
    }

    /// Create shape error
    pub fn shape(channel: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::Shape {
            channel: channel.into(),
            expected,
            actual,
        }
    }
}
