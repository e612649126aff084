//! Stream and channel categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which acquisition source a stream or column came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Inertial/navigation unit
    Ins,
    /// Triaxial magnetometer
    Magnetometer,
    /// Output of a previous synchronization run
    Merged,
}

impl StreamKind {
    /// Lowercase label used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Ins => "ins",
            StreamKind::Magnetometer => "magnetometer",
            StreamKind::Merged => "merged",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static channel category
///
/// Decides both the reconstruction strategy and the output precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelCategory {
    /// Rotational rate (gyro) channel
    AngularRate,
    /// Longitude / latitude
    Positional,
    /// Magnetometer x/y/z and magnitude
    Vector,
    /// Any other numeric channel
    Generic,
}

impl ChannelCategory {
    /// Decimal places used when rendering this category
    pub fn precision(&self) -> usize {
        match self {
            ChannelCategory::Positional => 8,
            ChannelCategory::Vector => 6,
            ChannelCategory::AngularRate | ChannelCategory::Generic => 4,
        }
    }
}

impl fmt::Display for ChannelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelCategory::AngularRate => "angular-rate",
            ChannelCategory::Positional => "positional",
            ChannelCategory::Vector => "vector",
            ChannelCategory::Generic => "generic",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_per_category() {
        assert_eq!(ChannelCategory::Positional.precision(), 8);
        assert_eq!(ChannelCategory::Vector.precision(), 6);
        assert_eq!(ChannelCategory::Generic.precision(), 4);
        assert_eq!(ChannelCategory::AngularRate.precision(), 4);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&ChannelCategory::AngularRate).unwrap();
        assert_eq!(json, "\"angular_rate\"");
        let kind: StreamKind = serde_json::from_str("\"magnetometer\"").unwrap();
        assert_eq!(kind, StreamKind::Magnetometer);
    }
}
