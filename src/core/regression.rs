use crate::domain::model::PointRecord;
use crate::utils::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    /// Line segment over the observed x range: `(min x, ŷ)` and `(max x, ŷ)`.
    pub endpoints: [PointRecord; 2],
    /// Pearson correlation; `None` when every y is identical.
    pub correlation: Option<f64>,
    pub r_squared: Option<f64>,
}

impl RegressionFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Legend text such as `y = 2.00x + 1.0`.
    pub fn equation_label(&self) -> String {
        let sign = if self.intercept < 0.0 { '-' } else { '+' };
        format!(
            "y = {:.2}x {} {:.1}",
            self.slope,
            sign,
            self.intercept.abs()
        )
    }
}

/// Least-squares line through `points`.
pub fn fit_points(points: &[PointRecord]) -> Result<RegressionFit> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    fit_line(&xs, &ys)
}

/// Ordinary least squares on centered data:
/// `m = Σ(x-x̄)(y-ȳ) / Σ(x-x̄)²`, `b = ȳ - m·x̄`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<RegressionFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return Err(DashboardError::InsufficientDataError {
            x_len: xs.len(),
            y_len: ys.len(),
        });
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(DashboardError::DegenerateFitError {
            reason: "input contains non-finite values".to_string(),
        });
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    // Rounding can leave residue in sxx for identical inputs.
    let sum_sq_x: f64 = xs.iter().map(|x| x * x).sum();
    if xs.iter().all(|&x| x == xs[0]) || sxx <= f64::EPSILON * sum_sq_x {
        return Err(DashboardError::DegenerateFitError {
            reason: "all x values are identical".to_string(),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(DashboardError::DegenerateFitError {
            reason: "fit overflowed double precision".to_string(),
        });
    }

    let correlation = (syy > 0.0)
        .then(|| sxy / (sxx.sqrt() * syy.sqrt()))
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0));

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    tracing::debug!(
        "Fitted y = {}x + {} over {} points (r = {:?})",
        slope,
        intercept,
        xs.len(),
        correlation
    );

    Ok(RegressionFit {
        slope,
        intercept,
        endpoints: [
            PointRecord {
                x: min_x,
                y: slope * min_x + intercept,
            },
            PointRecord {
                x: max_x,
                y: slope * max_x + intercept,
            },
        ],
        correlation,
        r_squared: correlation.map(|r| r * r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_linear_data() {
        let fit = fit_line(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_eq!(fit.slope, 2.0);
        assert_eq!(fit.intercept, 1.0);
        assert_eq!(fit.endpoints[0], PointRecord { x: 0.0, y: 1.0 });
        assert_eq!(fit.endpoints[1], PointRecord { x: 3.0, y: 7.0 });
        assert!((fit.correlation.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(fit.equation_label(), "y = 2.00x + 1.0");
    }

    #[test]
    fn test_endpoints_use_min_and_max_x_regardless_of_order() {
        let fit = fit_line(&[3.0, 0.0, 2.0, 1.0], &[7.0, 1.0, 5.0, 3.0]).unwrap();
        assert_eq!(fit.endpoints[0].x, 0.0);
        assert_eq!(fit.endpoints[1].x, 3.0);
    }

    #[test]
    fn test_noisy_fit_matches_closed_form() {
        // x̄ = 2, ȳ = 3, Sxy = 8, Sxx = 10
        let fit = fit_line(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 5.0, 4.0]).unwrap();
        assert!((fit.slope - 0.8).abs() < 1e-12);
        assert!((fit.intercept - 1.4).abs() < 1e-12);
        assert!((fit.predict(10.0) - 9.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_x_is_degenerate() {
        let err = fit_line(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, DashboardError::DegenerateFitError { .. }));
    }

    #[test]
    fn test_fractional_identical_x_is_degenerate() {
        // The mean of 0.1 three times is not exactly 0.1
        for ys in [[1.0, 2.0, 3.0], [1.0, 2.0, 4.0]] {
            let err = fit_line(&[0.1, 0.1, 0.1], &ys).unwrap_err();
            assert!(matches!(err, DashboardError::DegenerateFitError { .. }));
        }
        let err = fit_line(&[1e6 + 0.3, 1e6 + 0.3], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, DashboardError::DegenerateFitError { .. }));
    }

    #[test]
    fn test_insufficient_points() {
        assert!(matches!(
            fit_line(&[1.0], &[2.0]),
            Err(DashboardError::InsufficientDataError { .. })
        ));
        assert!(matches!(
            fit_line(&[1.0, 2.0, 3.0], &[2.0, 4.0]),
            Err(DashboardError::InsufficientDataError { x_len: 3, y_len: 2 })
        ));
        assert!(fit_points(&[]).is_err());
    }

    #[test]
    fn test_constant_y_has_no_correlation() {
        let fit = fit_line(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.correlation, None);
        assert_eq!(fit.equation_label(), "y = 0.00x + 4.0");
    }

    #[test]
    fn test_negative_intercept_label() {
        let fit = fit_line(&[1.0, 2.0], &[0.5, 2.5]).unwrap();
        assert_eq!(fit.equation_label(), "y = 2.00x - 1.5");
    }

    #[test]
    fn test_non_finite_input_rejected() {
        assert!(matches!(
            fit_line(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(DashboardError::DegenerateFitError { .. })
        ));
    }
}
