//! Least-squares line fitting.
//!
//! Used for the swing-plane fit through wrist positions and for trend
//! slopes over recent score windows.

use serde::{Deserialize, Serialize};

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
}

impl LineFit {
    /// Angle of the line relative to the x axis, in degrees, in [0, 90].
    #[must_use]
    pub fn inclination_deg(&self) -> f64 {
        self.slope.abs().atan().to_degrees()
    }

    /// Evaluates the line at `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a line through `(xs[i], ys[i])` by ordinary least squares.
///
/// Returns `None` with fewer than two points or when all `xs` coincide
/// (vertical line; no finite slope).
#[must_use]
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        sxx += dx * dx;
        sxy += dx * (ys[i] - mean_y);
    }

    if sxx < 1e-12 {
        return None;
    }

    let slope = sxy / sxx;
    Some(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Slope of `values` against their index (0, 1, 2, …).
///
/// Returns `None` with fewer than two values.
#[must_use]
pub fn slope_over_index(values: &[f64]) -> Option<f64> {
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    fit_line(&xs, values).map(|fit| fit.slope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_exact_line() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![1.0, 3.0, 5.0, 7.0];
        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.at(4.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_points() {
        assert!(fit_line(&[1.0], &[2.0]).is_none());
        assert!(fit_line(&[], &[]).is_none());
    }

    #[test]
    fn vertical_points_rejected() {
        let xs = vec![2.0, 2.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];
        assert!(fit_line(&xs, &ys).is_none());
    }

    #[test]
    fn inclination_bounds() {
        let flat = LineFit { slope: 0.0, intercept: 0.0 };
        assert!((flat.inclination_deg() - 0.0).abs() < 1e-12);

        let steep = LineFit { slope: -1000.0, intercept: 0.0 };
        assert!(steep.inclination_deg() > 89.0 && steep.inclination_deg() <= 90.0);

        let unit = LineFit { slope: 1.0, intercept: 0.0 };
        assert!((unit.inclination_deg() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn slope_over_index_trend() {
        let rising = vec![0.1, 0.2, 0.3, 0.4];
        assert!(slope_over_index(&rising).unwrap() > 0.0);

        let falling = vec![0.9, 0.6, 0.3, 0.0];
        assert!(slope_over_index(&falling).unwrap() < 0.0);

        assert!(slope_over_index(&[0.5]).is_none());
    }
}
