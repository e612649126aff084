//! Natural cubic spline.

/// Natural cubic spline through `(xs[i], ys[i])`
///
/// Second derivatives at both ends are zero. Evaluation outside
/// `[xs[0], xs[n-1]]` extends the end polynomials.
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot
    m: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Fit a spline; `None` with fewer than two knots, mismatched lengths or
    /// knots that are not strictly increasing.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n || xs.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let mut m = vec![0.0; n];

        if n > 2 {
            // Tridiagonal system for m[1..n-1] (Thomas algorithm)
            let size = n - 2;
            let mut diag = vec![0.0; size];
            let mut upper = vec![0.0; size];
            let mut rhs = vec![0.0; size];

            for k in 0..size {
                let i = k + 1;
                diag[k] = 2.0 * (h[i - 1] + h[i]);
                upper[k] = h[i];
                rhs[k] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            }

            for k in 1..size {
                let lower = h[k];
                let w = lower / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }

            m[size] = rhs[size - 1] / diag[size - 1];
            for k in (0..size - 1).rev() {
                m[k + 1] = (rhs[k] - upper[k] * m[k + 2]) / diag[k];
            }
        }

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// Fit over ordinal positions `0, 1, .., ys.len() - 1`
    pub fn fit_ordinal(ys: &[f64]) -> Option<Self> {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        Self::fit(&xs, ys)
    }

    /// Evaluate at `x`
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let seg = self.xs[1..n - 1].partition_point(|&k| k <= x);
        let (x0, x1) = (self.xs[seg], self.xs[seg + 1]);
        let (y0, y1) = (self.ys[seg], self.ys[seg + 1]);
        let (m0, m1) = (self.m[seg], self.m[seg + 1]);
        let h = x1 - x0;

        let a = x1 - x;
        let b = x - x0;
        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

/// `count` evenly spaced points over `[start, end]`, endpoints included
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_knots() {
        let ys = [0.0, 1.0, 0.5, 2.0, -1.0];
        let spline = NaturalCubicSpline::fit_ordinal(&ys).unwrap();
        for (i, y) in ys.iter().enumerate() {
            assert!((spline.eval(i as f64) - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_data_reproduced() {
        let xs = [0.0, 1.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 7.0, 9.0];
        let spline = NaturalCubicSpline::fit(&xs, &ys).unwrap();
        assert!((spline.eval(2.0) - 5.0).abs() < 1e-12);
        assert!((spline.eval(3.5) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_natural_spline_value() {
        // natural spline through (0,0) (1,1) (2,0): m1 = -3, s(0.5) = 0.6875
        let spline = NaturalCubicSpline::fit_ordinal(&[0.0, 1.0, 0.0]).unwrap();
        assert!((spline.eval(0.5) - 0.6875).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(NaturalCubicSpline::fit(&[0.0], &[1.0]).is_none());
        assert!(NaturalCubicSpline::fit(&[0.0, 0.0], &[1.0, 2.0]).is_none());
        assert!(NaturalCubicSpline::fit(&[0.0, 1.0], &[1.0]).is_none());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 3.0, 4), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(linspace(0.0, 2.0, 1), vec![0.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
