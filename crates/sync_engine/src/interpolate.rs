//! Channel-specific reconstruction onto the grid.
//!
//! All functions take source timestamps that are sorted and free of
//! duplicates, and one value per timestamp (`NAN` when missing).

use contracts::{micros_to_secs, Micros, TimeGrid};

use crate::cleaner::suppress_outliers;
use crate::spline::{linspace, NaturalCubicSpline};

/// Parameters of the angular-rate strategy
#[derive(Debug, Clone, Copy)]
pub struct AngularRateParams {
    pub outlier_sigma: f64,
    pub spline_min_points: usize,
    pub median_kernel: usize,
}

/// How an angular-rate channel was reconstructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngularRateMethod {
    Spline,
    /// Too few valid points for a spline; linear over the raw series
    LinearFallback { valid_points: usize },
}

/// Reconstructed angular-rate channel
#[derive(Debug, Clone)]
pub struct AngularRateOutcome {
    pub values: Vec<f64>,
    pub method: AngularRateMethod,
    /// Present points removed by the outlier band
    pub suppressed: usize,
}

/// Angular-rate reconstruction
///
/// Outliers are suppressed, a natural spline over the surviving values (by
/// ordinal position) is sampled at as many evenly spaced positions as there
/// are source records and median filtered. The result is laid back onto the
/// source timestamps and projected onto the grid linearly in time. Instants
/// past the last source record hold the last value.
pub fn angular_rate(
    timestamps: &[Micros],
    values: &[f64],
    grid: &TimeGrid,
    params: &AngularRateParams,
) -> AngularRateOutcome {
    let cleaned = suppress_outliers(values, params.outlier_sigma);
    let valid = cleaned.valid();
    let min_points = params.spline_min_points.max(2);

    let spline = if valid.len() >= min_points {
        NaturalCubicSpline::fit_ordinal(&valid)
    } else {
        None
    };

    let (series, method) = match spline {
        Some(spline) => {
            let positions = linspace(0.0, (valid.len() - 1) as f64, values.len());
            let sampled: Vec<f64> = positions.iter().map(|&p| spline.eval(p)).collect();
            (
                median_filter(&sampled, params.median_kernel),
                AngularRateMethod::Spline,
            )
        }
        None => {
            let mut raw = values.to_vec();
            fill_gaps(timestamps, &mut raw);
            (
                raw,
                AngularRateMethod::LinearFallback {
                    valid_points: valid.len(),
                },
            )
        }
    };

    let mut projected = project_linear(timestamps, &series, grid);
    hold_trailing(&mut projected);

    AngularRateOutcome {
        values: projected,
        method,
        suppressed: cleaned.suppressed,
    }
}

/// Inverse-time-weighted local average
///
/// Grid instants that coincide with a present source sample keep it. Every
/// other instant takes the average of present samples within
/// `±window_steps` grid steps (inclusive), each weighted by
/// `1 / (|Δt| + epsilon)` with `Δt` in seconds, or stays missing when there
/// are none. Interior gaps are then closed linearly and trailing ones hold
/// the last value.
pub fn inverse_distance(
    timestamps: &[Micros],
    values: &[f64],
    grid: &TimeGrid,
    window_steps: usize,
    epsilon: f64,
) -> Vec<f64> {
    let reach = window_steps as i64 * grid.step();

    let mut out: Vec<f64> = grid
        .instants()
        .map(|g| {
            if let Ok(i) = timestamps.binary_search(&g) {
                if !values[i].is_nan() {
                    return values[i];
                }
            }

            let lo = timestamps.partition_point(|&t| t < g - reach);
            let hi = timestamps.partition_point(|&t| t <= g + reach);

            let (weighted, total) = timestamps[lo..hi]
                .iter()
                .zip(&values[lo..hi])
                .filter(|(_, v)| !v.is_nan())
                .fold((0.0, 0.0), |(acc, wsum), (&t, &v)| {
                    let w = 1.0 / (micros_to_secs((t - g).abs()) + epsilon);
                    (acc + w * v, wsum + w)
                });

            if total > 0.0 {
                weighted / total
            } else {
                f64::NAN
            }
        })
        .collect();

    let instants: Vec<Micros> = grid.instants().collect();
    fill_gaps(&instants, &mut out);
    out
}

/// Nearest-neighbour snap, ties going to the later sample
///
/// Missing source values are carried as missing.
pub fn nearest(timestamps: &[Micros], values: &[f64], grid: &TimeGrid) -> Vec<f64> {
    if timestamps.is_empty() {
        return vec![f64::NAN; grid.len()];
    }
    grid.instants()
        .map(|g| {
            let after = timestamps.partition_point(|&t| t < g);
            let idx = if after == 0 {
                0
            } else if after == timestamps.len() {
                after - 1
            } else {
                let before = after - 1;
                if g - timestamps[before] < timestamps[after] - g {
                    before
                } else {
                    after
                }
            };
            values[idx]
        })
        .collect()
}

/// Odd-kernel median filter with edge values replicated
pub fn median_filter(values: &[f64], kernel: usize) -> Vec<f64> {
    let n = values.len();
    if kernel <= 1 || n == 0 {
        return values.to_vec();
    }
    let half = (kernel / 2) as isize;
    let mut window = Vec::with_capacity(kernel);

    (0..n as isize)
        .map(|i| {
            window.clear();
            window.extend((i - half..=i + half).map(|j| values[j.clamp(0, n as isize - 1) as usize]));
            window.sort_by(|a, b| a.total_cmp(b));
            window[window.len() / 2]
        })
        .collect()
}

/// Linear interpolation in time over interior gaps
///
/// Leading and trailing missing values are left untouched.
pub fn fill_interior(xs: &[Micros], values: &mut [f64]) {
    let mut prev: Option<usize> = None;
    for i in 0..values.len() {
        if values[i].is_nan() {
            continue;
        }
        if let Some(p) = prev {
            if i > p + 1 {
                let (x0, x1) = (xs[p], xs[i]);
                let (y0, y1) = (values[p], values[i]);
                for j in p + 1..i {
                    let frac = (xs[j] - x0) as f64 / (x1 - x0) as f64;
                    values[j] = y0 + (y1 - y0) * frac;
                }
            }
        }
        prev = Some(i);
    }
}

/// Forward fill after the last present value
pub fn hold_trailing(values: &mut [f64]) {
    if let Some(last) = values.iter().rposition(|v| !v.is_nan()) {
        let held = values[last];
        values[last + 1..].fill(held);
    }
}

/// Interior gaps closed linearly, trailing gaps held; leading gaps stay
pub fn fill_gaps(xs: &[Micros], values: &mut [f64]) {
    fill_interior(xs, values);
    hold_trailing(values);
}

/// Linear projection of a source series onto the grid
///
/// Instants outside the source coverage, or between a missing neighbour,
/// are missing.
pub fn project_linear(timestamps: &[Micros], values: &[f64], grid: &TimeGrid) -> Vec<f64> {
    grid.instants()
        .map(|g| {
            let after = timestamps.partition_point(|&t| t < g);
            if after < timestamps.len() && timestamps[after] == g {
                return values[after];
            }
            if after == 0 || after == timestamps.len() {
                return f64::NAN;
            }
            let before = after - 1;
            let (t0, t1) = (timestamps[before], timestamps[after]);
            let frac = (g - t0) as f64 / (t1 - t0) as f64;
            values[before] + (values[after] - values[before]) * frac
        })
        .collect()
}
