//! Outlier-aware cleaning of angular-rate channels.

/// Mean and sample standard deviation (ddof = 1) of the non-missing values
///
/// The deviation is `NAN` with fewer than two values, the mean with none.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = present.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = present.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }
    let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}

/// Result of suppressing outliers in one channel
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    /// Source values with suppressed points set to missing
    pub values: Vec<f64>,
    /// Points that survived the band
    pub kept: usize,
    /// Present points removed by the band
    pub suppressed: usize,
}

impl Cleaned {
    /// Surviving values in source order
    pub fn valid(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| !v.is_nan()).collect()
    }
}

/// Keep points with `|v - mean| <= sigma * std`
///
/// An undefined deviation (fewer than two points) keeps nothing. The input is
/// left untouched.
pub fn suppress_outliers(values: &[f64], sigma: f64) -> Cleaned {
    let (mean, std) = mean_std(values);
    let band = sigma * std;

    let mut kept = 0;
    let mut suppressed = 0;
    let cleaned = values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else if (v - mean).abs() <= band {
                kept += 1;
                v
            } else {
                suppressed += 1;
                f64::NAN
            }
        })
        .collect();

    Cleaned {
        values: cleaned,
        kept,
        suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_std_ddof1() {
        let (mean, std) = mean_std(&[1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0]);
        assert!((mean - 3.0).abs() < 1e-12);
        assert!((std - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_spike_suppressed() {
        let mut values = vec![1.0; 20];
        values[10] = 100.0;
        let cleaned = suppress_outliers(&values, 3.0);
        assert_eq!(cleaned.suppressed, 1);
        assert_eq!(cleaned.kept, 19);
        assert!(cleaned.values[10].is_nan());
        assert_eq!(values[10], 100.0);
    }

    #[test]
    fn test_constant_series_kept() {
        let cleaned = suppress_outliers(&[2.0; 5], 3.0);
        assert_eq!(cleaned.kept, 5);
    }

    #[test]
    fn test_single_point_keeps_nothing() {
        let cleaned = suppress_outliers(&[f64::NAN, 4.0], 3.0);
        assert_eq!(cleaned.kept, 0);
        assert!(cleaned.valid().is_empty());
    }
}
