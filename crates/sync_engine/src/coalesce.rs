//! Dense-sample coalescing of magnetometer captures
//!
//! The device occasionally delivers two readings inside one nominal
//! interval. Early arrivals accumulate as timing error; once that error
//! reaches the budget the offending pair is folded into one record.

use contracts::{Channel, CoalesceConfig, ContractError, Micros, SampleStream};
use tracing::{debug, instrument};

use crate::prepare::nan_mean;

/// Coalesced stream and the number of folded pairs
#[derive(Debug, Clone)]
pub struct CoalesceOutcome {
    pub stream: SampleStream,
    pub merged_pairs: usize,
}

/// What the fold does with record `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep(usize),
    Merge(usize),
}

/// Fold dense pairs of a stream using its device-local time column
///
/// Walking adjacent pairs `(i, i + 1)`: an interval below the nominal one
/// adds `nominal - interval` to the accumulated error; when the error
/// reaches the budget the pair becomes one record (mean of each channel,
/// device time and wall timestamp of the first) and the walk resumes after
/// the pair. A nominal or longer interval resets the error.
#[instrument(
    name = "sync_engine_coalesce",
    skip(stream, config),
    fields(stream = %stream.kind(), records = stream.len())
)]
pub fn coalesce_dense(
    stream: SampleStream,
    config: &CoalesceConfig,
) -> Result<CoalesceOutcome, ContractError> {
    let time_column = config.time_column.as_str();
    let device_time = match stream.channel(time_column) {
        Some(channel) => channel.values.clone(),
        None => {
            return Err(ContractError::schema(
                stream.kind(),
                vec![time_column.to_string()],
            ))
        }
    };

    let steps = plan(&device_time, config.nominal_interval_s, config.error_budget_s);
    let merged_pairs = steps.iter().filter(|s| matches!(s, Step::Merge(_))).count();
    if merged_pairs == 0 {
        return Ok(CoalesceOutcome {
            stream,
            merged_pairs,
        });
    }

    let (kind, timestamps, channels) = stream.into_parts();
    let timestamps: Vec<Micros> = steps
        .iter()
        .map(|&(Step::Keep(i) | Step::Merge(i))| timestamps[i])
        .collect();
    let channels = channels
        .into_iter()
        .map(|c| {
            let keep_first = c.name == time_column;
            let values = steps
                .iter()
                .map(|&step| match step {
                    Step::Keep(i) => c.values[i],
                    Step::Merge(i) if keep_first => c.values[i],
                    Step::Merge(i) => nan_mean(&c.values[i..i + 2]),
                })
                .collect();
            Channel::new(c.name, values)
        })
        .collect();

    let stream = SampleStream::new(kind, timestamps, channels)?;
    debug!(merged_pairs, records = stream.len(), "dense samples coalesced");
    Ok(CoalesceOutcome {
        stream,
        merged_pairs,
    })
}

fn plan(device_time: &[f64], nominal: f64, budget: f64) -> Vec<Step> {
    let n = device_time.len();
    let mut steps = Vec::with_capacity(n);
    let mut error = 0.0;
    let mut i = 0;

    while i + 1 < n {
        let interval = device_time[i + 1] - device_time[i];
        if interval < nominal {
            error += nominal - interval;
            if error >= budget {
                steps.push(Step::Merge(i));
                error = 0.0;
                i += 2;
                continue;
            }
        } else {
            error = 0.0;
        }
        steps.push(Step::Keep(i));
        i += 1;
    }
    if i < n {
        steps.push(Step::Keep(i));
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::StreamKind;

    fn capture(device_time: Vec<f64>, x: Vec<f64>) -> SampleStream {
        let ts = (0..device_time.len() as i64).map(|i| i * 10_000).collect();
        SampleStream::new(
            StreamKind::Magnetometer,
            ts,
            vec![Channel::new("time", device_time), Channel::new("x", x)],
        )
        .unwrap()
    }

    #[test]
    fn test_normal_spacing_untouched() {
        let times: Vec<f64> = (0..20).map(|i| i as f64 * 0.01).collect();
        let outcome = coalesce_dense(capture(times, vec![1.0; 20]), &CoalesceConfig::default()).unwrap();
        assert_eq!(outcome.merged_pairs, 0);
        assert_eq!(outcome.stream.len(), 20);
    }

    #[test]
    fn test_pair_merged_once_budget_reached() {
        // intervals 0.008, 0.008: error 0.002 then 0.004 >= 0.003 at pair (1, 2)
        let times = vec![0.0, 0.008, 0.016, 0.026, 0.036];
        let x = vec![1.0, 2.0, 4.0, 5.0, 6.0];
        let outcome = coalesce_dense(capture(times, x), &CoalesceConfig::default()).unwrap();

        assert_eq!(outcome.merged_pairs, 1);
        let stream = outcome.stream;
        assert_eq!(stream.timestamps(), &[0, 10_000, 30_000, 40_000]);
        assert_eq!(stream.channel("x").unwrap().values, vec![1.0, 3.0, 5.0, 6.0]);
        assert_eq!(stream.channel("time").unwrap().values[1], 0.008);
    }

    #[test]
    fn test_normal_interval_resets_error() {
        // 0.002 error, reset by a long interval, 0.002 again: never merges
        let times = vec![0.0, 0.008, 0.020, 0.028, 0.038];
        let outcome =
            coalesce_dense(capture(times, vec![0.0; 5]), &CoalesceConfig::default()).unwrap();
        assert_eq!(outcome.merged_pairs, 0);
    }

    #[test]
    fn test_missing_time_column() {
        let stream = SampleStream::new(
            StreamKind::Magnetometer,
            vec![0],
            vec![Channel::new("x", vec![1.0])],
        )
        .unwrap();
        match coalesce_dense(stream, &CoalesceConfig::default()) {
            Err(ContractError::Schema { missing, .. }) => assert_eq!(missing, vec!["time"]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
