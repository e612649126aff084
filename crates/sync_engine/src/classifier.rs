//! Channel classification and schema checks.

use contracts::{ChannelCategory, ContractError, SampleStream, StreamKind};

/// Channels an INS log must carry
pub const REQUIRED_INS_CHANNELS: [&str; 3] = [
    "acceleration x (g)",
    "acceleration y (g)",
    "acceleration z (g)",
];

/// Channels a magnetometer log must carry
pub const REQUIRED_MAG_CHANNELS: [&str; 3] = ["x", "y", "z"];

/// Magnetometer channel names rendered as vector components
pub const VECTOR_CHANNELS: [&str; 5] = ["x", "y", "z", "magnitude", "filtered magnitude"];

/// Substring marking superseded device base-time columns
pub const BASE_TIME_MARKER: &str = "base_time";

/// Category of a (lowercase) column name on a given stream
pub fn classify(name: &str, stream: StreamKind) -> ChannelCategory {
    if name.contains("angular_velocity") {
        ChannelCategory::AngularRate
    } else if name.contains("longitude") || name.contains("latitude") {
        ChannelCategory::Positional
    } else if stream == StreamKind::Magnetometer && VECTOR_CHANNELS.contains(&name) {
        ChannelCategory::Vector
    } else {
        ChannelCategory::Generic
    }
}

/// Required channel names of a stream kind
pub fn required_channels(stream: StreamKind) -> &'static [&'static str] {
    match stream {
        StreamKind::Ins => &REQUIRED_INS_CHANNELS,
        StreamKind::Magnetometer => &REQUIRED_MAG_CHANNELS,
        StreamKind::Merged => &[],
    }
}

/// Fail with a schema error naming every absent required channel
pub fn validate_schema(stream: &SampleStream) -> Result<(), ContractError> {
    let missing: Vec<String> = required_channels(stream.kind())
        .iter()
        .filter(|name| stream.channel(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ContractError::schema(stream.kind(), missing))
    }
}

/// Whether a column is dropped from the merged output
pub fn is_base_time(name: &str) -> bool {
    name.contains(BASE_TIME_MARKER)
}
