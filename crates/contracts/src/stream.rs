//! SampleStream - Ingestion output
//!
//! Column-major, timestamp-indexed samples from one source.

use serde::{Deserialize, Serialize};

use crate::{micros_to_secs, ContractError, Micros, StreamKind};

/// A named scalar lane of a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Lowercase column name
    pub name: String,

    /// One value per record, `NAN` when missing
    pub values: Vec<f64>,
}

impl Channel {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of non-missing values
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

/// Samples of one acquisition source
///
/// Invariant: every channel holds exactly `timestamps.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStream {
    kind: StreamKind,
    timestamps: Vec<Micros>,
    channels: Vec<Channel>,
}

impl SampleStream {
    /// Create a stream, checking that all channels match the timestamp count
    pub fn new(
        kind: StreamKind,
        timestamps: Vec<Micros>,
        channels: Vec<Channel>,
    ) -> Result<Self, ContractError> {
        let expected = timestamps.len();
        if let Some(bad) = channels.iter().find(|c| c.values.len() != expected) {
            return Err(ContractError::shape(&bad.name, expected, bad.values.len()));
        }
        Ok(Self {
            kind,
            timestamps,
            channels,
        })
    }

    /// Empty stream with the given channel names
    pub fn empty(kind: StreamKind, names: &[&str]) -> Self {
        Self {
            kind,
            timestamps: Vec::new(),
            channels: names.iter().map(|n| Channel::new(*n, Vec::new())).collect(),
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Micros] {
        &self.timestamps
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Look up a channel by (lowercase) name
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// `(min, max)` timestamp, assuming the stream is sorted
    pub fn time_range(&self) -> Option<(Micros, Micros)> {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        }
    }

    /// Covered duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.time_range()
            .map(|(a, b)| micros_to_secs(b - a))
            .unwrap_or(0.0)
    }

    /// Values of record `row` across all channels
    pub fn row(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        self.channels.iter().map(move |c| c.values[row])
    }

    /// Whether every channel value of `row` is missing
    pub fn row_is_empty(&self, row: usize) -> bool {
        self.row(row).all(f64::is_nan)
    }

    /// Decompose into timestamps and channels
    pub fn into_parts(self) -> (StreamKind, Vec<Micros>, Vec<Channel>) {
        (self.kind, self.timestamps, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_ragged_channels() {
        let result = SampleStream::new(
            StreamKind::Ins,
            vec![0, 1, 2],
            vec![Channel::new("a", vec![1.0, 2.0])],
        );
        assert!(matches!(result, Err(ContractError::Shape { .. })));
    }

    #[test]
    fn test_row_helpers() {
        let stream = SampleStream::new(
            StreamKind::Magnetometer,
            vec![0, 10],
            vec![
                Channel::new("x", vec![1.0, f64::NAN]),
                Channel::new("y", vec![2.0, f64::NAN]),
            ],
        )
        .unwrap();
        assert!(!stream.row_is_empty(0));
        assert!(stream.row_is_empty(1));
        assert_eq!(stream.time_range(), Some((0, 10)));
        assert_eq!(stream.channel("x").unwrap().present_count(), 1);
    }
}
