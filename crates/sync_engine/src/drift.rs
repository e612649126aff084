//! Inter-sample interval drift detection.
//!
//! Reporting only: nothing here changes reconstructed values.

use contracts::{micros_to_secs, DriftReport, Micros};

/// Flag samples whose interval leaves the rolling band
///
/// `delta[i] = t[i] - t[i-1]` in seconds, undefined for sample 0. The rolling
/// statistics at `i` cover `delta[i-window+1..=i]` and are defined only when
/// every delta in that span is, so the first `window` samples are never
/// flagged. Sample `i` is flagged when `|delta[i] - mean[i]| > sigma * std[i]`.
pub fn detect_drift(timestamps: &[Micros], window: usize, sigma: f64) -> DriftReport {
    let n = timestamps.len();
    let window = window.max(2);

    let intervals: Vec<Option<f64>> = (0..n)
        .map(|i| (i > 0).then(|| micros_to_secs(timestamps[i] - timestamps[i - 1])))
        .collect();

    let mut rolling_mean = vec![None; n];
    let mut rolling_std = vec![None; n];
    let mut drifted = Vec::new();

    for i in window..n {
        let span: Vec<f64> = intervals[i + 1 - window..=i].iter().flatten().copied().collect();
        if span.len() < window {
            continue;
        }
        let mean = span.iter().sum::<f64>() / window as f64;
        let var = span.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        let std = var.sqrt();

        rolling_mean[i] = Some(mean);
        rolling_std[i] = Some(std);

        if let Some(delta) = intervals[i] {
            if (delta - mean).abs() > sigma * std {
                drifted.push(i);
            }
        }
    }

    DriftReport {
        window,
        drifted,
        intervals,
        rolling_mean,
        rolling_std,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_statistics_undefined_before_full_window() {
        let ts: Vec<Micros> = (0..10).map(|i| i * 10_000).collect();
        let report = detect_drift(&ts, 4, 3.0);
        assert_eq!(report.intervals[0], None);
        assert!(report.rolling_mean[..4].iter().all(Option::is_none));
        assert!((report.rolling_mean[4].unwrap() - 0.01).abs() < 1e-12);
        assert!(report.rolling_std[4].unwrap() < 1e-12);
        assert!(report.drifted.is_empty());
    }

    #[test]
    fn test_gap_flagged() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut t = 0;
        let mut ts = Vec::new();
        for i in 0..200 {
            t += if i == 150 { 80_000 } else { 10_000 + rng.random_range(-300..=300) };
            ts.push(t);
        }
        let report = detect_drift(&ts, 50, 3.0);
        assert_eq!(report.drifted, vec![150]);
        assert_eq!(report.window, 50);
    }

    #[test]
    fn test_short_stream() {
        let report = detect_drift(&[0, 10_000], 50, 3.0);
        assert!(report.drifted.is_empty());
        assert_eq!(report.intervals.len(), 2);
    }
}
