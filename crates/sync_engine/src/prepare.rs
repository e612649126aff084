//! Stream preparation
//!
//! Sort by time, replace non-finite values, drop all-missing rows and fold
//! duplicate timestamps. Every step returns a new stream.

use contracts::{Channel, ContractError, Micros, SampleStream};
use tracing::{debug, instrument};

/// Counters of one preparation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareStats {
    /// ±inf cells replaced with missing
    pub non_finite: usize,
    /// Rows removed because every channel was missing
    pub empty_rows: usize,
    /// Records folded into an earlier record with the same timestamp
    pub duplicates: usize,
}

/// A prepared stream and what preparation changed
#[derive(Debug, Clone)]
pub struct Prepared {
    pub stream: SampleStream,
    pub stats: PrepareStats,
}

/// Run every preparation step
#[instrument(
    name = "sync_engine_prepare",
    skip(stream),
    fields(stream = %stream.kind(), records = stream.len())
)]
pub fn prepare(stream: SampleStream) -> Result<Prepared, ContractError> {
    let kind = stream.kind();
    let (_, timestamps, channels) = sort_by_time(stream)?.into_parts();

    let (channels, non_finite) = replace_non_finite(channels);
    let sorted = SampleStream::new(kind, timestamps, channels)?;

    let (non_empty, empty_rows) = drop_empty_rows(sorted)?;
    let (stream, duplicates) = fold_duplicates(non_empty)?;

    if stream.is_empty() {
        return Err(ContractError::EmptyStream { stream: kind });
    }

    let stats = PrepareStats {
        non_finite,
        empty_rows,
        duplicates,
    };
    debug!(?stats, records = stream.len(), "stream prepared");
    Ok(Prepared { stream, stats })
}

/// Stable sort of all records by timestamp
pub fn sort_by_time(stream: SampleStream) -> Result<SampleStream, ContractError> {
    if stream.timestamps().windows(2).all(|w| w[0] <= w[1]) {
        return Ok(stream);
    }

    let (kind, timestamps, channels) = stream.into_parts();
    let mut order: Vec<usize> = (0..timestamps.len()).collect();
    order.sort_by_key(|&i| timestamps[i]);

    let sorted_ts = order.iter().map(|&i| timestamps[i]).collect();
    let sorted_channels = channels
        .into_iter()
        .map(|c| Channel::new(c.name, order.iter().map(|&i| c.values[i]).collect()))
        .collect();

    SampleStream::new(kind, sorted_ts, sorted_channels)
}

fn replace_non_finite(channels: Vec<Channel>) -> (Vec<Channel>, usize) {
    let mut replaced = 0;
    let channels = channels
        .into_iter()
        .map(|mut c| {
            for v in c.values.iter_mut().filter(|v| v.is_infinite()) {
                *v = f64::NAN;
                replaced += 1;
            }
            c
        })
        .collect();
    (channels, replaced)
}

/// Remove rows whose every channel is missing
///
/// A stream without channels is returned unchanged so that the schema check
/// reports it.
pub fn drop_empty_rows(stream: SampleStream) -> Result<(SampleStream, usize), ContractError> {
    if stream.channels().is_empty() {
        return Ok((stream, 0));
    }
    let keep: Vec<bool> = (0..stream.len()).map(|row| !stream.row_is_empty(row)).collect();
    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped == 0 {
        return Ok((stream, 0));
    }

    let (kind, timestamps, channels) = stream.into_parts();
    let timestamps = select(&timestamps, &keep);
    let channels = channels
        .into_iter()
        .map(|c| Channel::new(c.name, select(&c.values, &keep)))
        .collect();
    Ok((SampleStream::new(kind, timestamps, channels)?, dropped))
}

/// Fold runs of equal timestamps into one record
///
/// Each channel of the folded record is the mean of the run's non-missing
/// values, or missing when the run has none. Expects a sorted stream.
pub fn fold_duplicates(stream: SampleStream) -> Result<(SampleStream, usize), ContractError> {
    if stream.timestamps().windows(2).all(|w| w[0] != w[1]) {
        return Ok((stream, 0));
    }

    let (kind, timestamps, channels) = stream.into_parts();
    let runs = runs_of_equal(&timestamps);
    let folded_ts: Vec<Micros> = runs.iter().map(|&(start, _)| timestamps[start]).collect();
    let channels = channels
        .into_iter()
        .map(|c| {
            let values = runs
                .iter()
                .map(|&(start, end)| nan_mean(&c.values[start..end]))
                .collect();
            Channel::new(c.name, values)
        })
        .collect();

    let folded = timestamps.len() - folded_ts.len();
    Ok((SampleStream::new(kind, folded_ts, channels)?, folded))
}

/// `(start, end)` index ranges of consecutive equal timestamps
fn runs_of_equal(timestamps: &[Micros]) -> Vec<(usize, usize)> {
    timestamps
        .iter()
        .enumerate()
        .fold(Vec::new(), |mut runs: Vec<(usize, usize)>, (i, &t)| {
            match runs.last_mut() {
                Some(run) if timestamps[run.0] == t => run.1 = i + 1,
                _ => runs.push((i, i + 1)),
            }
            runs
        })
}

/// Mean of the non-missing values, missing when there are none
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

fn select<T: Copy>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter_map(|(v, &k)| k.then_some(*v))
        .collect()
}
