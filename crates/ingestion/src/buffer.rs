//! Acquisition sample buffer
//!
//! Owned by exactly one acquisition loop. Appending takes `&mut self`; the
//! loop gives the buffer up with [`SampleBuffer::handoff`], which consumes it
//! and yields an immutable `SampleStream`.

use contracts::{Channel, ContractError, Micros, SampleStream, StreamKind};
use tracing::debug;

use crate::protocol::DeviceReading;

/// Channel layout of a magnetometer capture
pub const MAGNETOMETER_CHANNELS: [&str; 4] = ["time", "x", "y", "z"];

/// Append-only, column-major sample buffer
#[derive(Debug)]
pub struct SampleBuffer {
    kind: StreamKind,
    names: Vec<String>,
    timestamps: Vec<Micros>,
    columns: Vec<Vec<f64>>,
}

impl SampleBuffer {
    /// Buffer with the given channel names
    pub fn new(kind: StreamKind, names: &[&str]) -> Self {
        Self {
            kind,
            names: names.iter().map(|n| n.to_lowercase()).collect(),
            timestamps: Vec::new(),
            columns: vec![Vec::new(); names.len()],
        }
    }

    /// Buffer laid out for `RD t,x,y,z` readings
    pub fn magnetometer() -> Self {
        Self::new(StreamKind::Magnetometer, &MAGNETOMETER_CHANNELS)
    }

    pub fn with_capacity(mut self, records: usize) -> Self {
        self.timestamps.reserve(records);
        for column in &mut self.columns {
            column.reserve(records);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Append one record stamped with wall-clock time `ts`
    pub fn push(&mut self, ts: Micros, values: &[f64]) -> Result<(), ContractError> {
        if values.len() != self.columns.len() {
            return Err(ContractError::shape(
                format!("{} record", self.kind),
                self.columns.len(),
                values.len(),
            ));
        }
        self.timestamps.push(ts);
        for (column, &value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        Ok(())
    }

    /// Append a decoded device reading
    pub fn push_reading(&mut self, ts: Micros, reading: &DeviceReading) -> Result<(), ContractError> {
        self.push(ts, &[reading.t, reading.x, reading.y, reading.z])
    }

    /// Give up the buffer and freeze its contents
    pub fn handoff(self) -> Result<SampleStream, ContractError> {
        debug!(stream = %self.kind, records = self.timestamps.len(), "buffer handed off");
        let channels = self
            .names
            .into_iter()
            .zip(self.columns)
            .map(|(name, values)| Channel::new(name, values))
            .collect();
        SampleStream::new(self.kind, self.timestamps, channels)
    }
}
