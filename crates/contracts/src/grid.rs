//! TimeGrid - the common resampling grid
//!
//! Uniformly spaced instants over the validated overlap of two streams.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Wall-clock instant in microseconds since the Unix epoch
pub type Micros = i64;

/// Microseconds per second
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Canonical timestamp rendering (millisecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Round `t` up to the next multiple of `step`
pub fn ceil_to(t: Micros, step: i64) -> Micros {
    let rem = t.rem_euclid(step);
    if rem == 0 {
        t
    } else {
        t - rem + step
    }
}

/// Round `t` down to the previous multiple of `step`
pub fn floor_to(t: Micros, step: i64) -> Micros {
    t - t.rem_euclid(step)
}

/// Convert a microsecond span to seconds
#[inline]
pub fn micros_to_secs(us: i64) -> f64 {
    us as f64 / MICROS_PER_SECOND as f64
}

/// Render an instant with [`TIMESTAMP_FORMAT`]
///
/// Instants outside chrono's representable range render as the raw number.
pub fn format_timestamp(t: Micros) -> String {
    match DateTime::from_timestamp_micros(t) {
        Some(dt) => dt.naive_utc().format(TIMESTAMP_FORMAT).to_string(),
        None => t.to_string(),
    }
}

/// Uniform time grid `[start, end]` with fixed spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    start: Micros,
    end: Micros,
    step: i64,
}

impl TimeGrid {
    /// Build a grid from already aligned bounds.
    ///
    /// Returns `None` when `step <= 0` or `end < start`.
    pub fn new(start: Micros, end: Micros, step: i64) -> Option<Self> {
        if step <= 0 || end < start {
            return None;
        }
        Some(Self { start, end, step })
    }

    /// Grid bounds for two stream ranges, before any overlap check.
    ///
    /// `start = max(ceil(a.0), ceil(b.0))`, `end = min(floor(a.1), floor(b.1))`.
    /// The returned end may precede the start when the streams do not overlap.
    pub fn overlap_bounds(a: (Micros, Micros), b: (Micros, Micros), step: i64) -> (Micros, Micros) {
        let start = ceil_to(a.0, step).max(ceil_to(b.0, step));
        let end = floor_to(a.1, step).min(floor_to(b.1, step));
        (start, end)
    }

    /// First instant
    pub fn start(&self) -> Micros {
        self.start
    }

    /// Last instant
    pub fn end(&self) -> Micros {
        self.end
    }

    /// Spacing in microseconds
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Number of instants, `floor((end - start) / step) + 1`
    pub fn len(&self) -> usize {
        ((self.end - self.start) / self.step) as usize + 1
    }

    /// A valid grid always holds at least one instant
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Covered span in seconds
    pub fn span_secs(&self) -> f64 {
        micros_to_secs(self.end - self.start)
    }

    /// Instant at index `i`
    #[inline]
    pub fn instant(&self, i: usize) -> Micros {
        self.start + i as i64 * self.step
    }

    /// Iterate over all instants
    pub fn instants(&self) -> impl Iterator<Item = Micros> + '_ {
        (0..self.len()).map(move |i| self.instant(i))
    }
}
