//! # Ingestion
//!
//! Sensor log ingestion.
//!
//! Responsibilities:
//! - Load INS and magnetometer CSV logs into raw `SampleStream`s
//! - Parse the logged wall-clock timestamps
//! - Tokenize the magnetometer `RD t,x,y,z` text protocol
//! - Single-writer acquisition buffers handed off as immutable streams
//!
//! ## Usage
//!
//! ```no_run
//! use contracts::StreamKind;
//! use ingestion::CsvLogLoader;
//! use std::path::Path;
//!
//! let loaded = CsvLogLoader::new(StreamKind::Magnetometer)
//!     .load_path(Path::new("mag.csv"))
//!     .unwrap();
//! println!("{} records", loaded.stream.len());
//! ```

mod buffer;
mod csv_loader;
mod error;
pub mod protocol;
mod timestamp;

pub use buffer::{SampleBuffer, MAGNETOMETER_CHANNELS};
pub use csv_loader::{normalize_header, CsvLogLoader, LoadStats, LoadedLog, TIMESTAMP_COLUMN};
pub use error::{IngestionError, Result};
pub use protocol::{DeviceReading, ReadingTokenizer};
pub use timestamp::parse_timestamp;
