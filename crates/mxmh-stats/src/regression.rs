//! Ordinary least squares with two predictors.
//!
//! Fits `y = intercept + b1·x1 + b2·x2` by solving the normal equations of the
//! mean-centered predictors:
//!
//! ```text
//! | S11 S12 | |b1|   |S1y|
//! | S12 S22 | |b2| = |S2y|      intercept = ȳ - b1·x̄1 - b2·x̄2
//! ```
//!
//! Centering removes the intercept column from the system, which keeps the
//! 2×2 matrix well conditioned for predictors with large offsets (ages).
//!
//! # Examples
//!
//! ```
//! use mxmh_stats::regression::PlaneFit;
//!
//! let x = [[18.0, 1.0], [25.0, 3.0], [40.0, 2.0], [31.0, 6.0]];
//! let y = x.iter().map(|[a, h]| 5.0 + 2.0 * a + 3.0 * h).collect::<Vec<_>>();
//!
//! let fit = PlaneFit::fit(&x, &y).unwrap();
//! assert!((fit.intercept - 5.0).abs() < 1e-6);
//! assert!((fit.coefficients[0] - 2.0).abs() < 1e-6);
//! assert!((fit.coefficients[1] - 3.0).abs() < 1e-6);
//! ```

use nalgebra::{Matrix2, Vector2};
use serde::Serialize;

use crate::{descriptive, grid};

/// Minimum number of rows needed to determine three parameters.
pub const MIN_ROWS: usize = 3;

/// Minimum number of points per axis of a [`PlaneSurface`].
pub const MIN_GRID: usize = 2;

/// Relative determinant below which the predictors count as collinear.
const COLLINEARITY_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("not enough data: {rows} valid rows, at least {MIN_ROWS} required")]
    InsufficientData { rows: usize },
    #[display("{x_len} predictor rows but {y_len} responses")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[display("degenerate input: {reason}")]
    DegenerateInput { reason: Degeneracy },
    #[display("surface grid needs at least {MIN_GRID} points per axis, got {resolution}")]
    GridTooSmall { resolution: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Degeneracy {
    #[display("predictor {_0} has zero variance")]
    ZeroVariance(usize),
    #[display("predictors are collinear")]
    Collinear,
}

/// A fitted plane `y = intercept + coefficients[0]·x1 + coefficients[1]·x2`.
#[derive(Debug, Clone, Serialize)]
pub struct PlaneFit {
    pub intercept: f64,
    pub coefficients: [f64; 2],
    /// Number of rows the plane was fitted on.
    pub rows: usize,
    /// Coefficient of determination on the fitted rows.
    ///
    /// `None` when the response is constant.
    pub r_squared: Option<f64>,
}

impl PlaneFit {
    /// Fits the plane by least squares.
    ///
    /// `x[i]` holds the two predictors of row `i`, `y[i]` its response.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(x: &[[f64; 2]], y: &[f64]) -> Result<Self, FitError> {
        if x.len() != y.len() {
            return Err(FitError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let rows = y.len();
        if rows < MIN_ROWS {
            return Err(FitError::InsufficientData { rows });
        }

        for idx in 0..2 {
            if descriptive::is_constant(x.iter().map(|r| r[idx])) {
                return Err(FitError::DegenerateInput {
                    reason: Degeneracy::ZeroVariance(idx),
                });
            }
        }

        let n = rows as f64;
        let mean_x1 = x.iter().map(|r| r[0]).sum::<f64>() / n;
        let mean_x2 = x.iter().map(|r| r[1]).sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let (mut s11, mut s12, mut s22, mut s1y, mut s2y) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for ([x1, x2], yi) in x.iter().zip(y) {
            let d1 = x1 - mean_x1;
            let d2 = x2 - mean_x2;
            let dy = yi - mean_y;
            s11 += d1 * d1;
            s12 += d1 * d2;
            s22 += d2 * d2;
            s1y += d1 * dy;
            s2y += d2 * dy;
        }

        for (idx, s) in [s11, s22].into_iter().enumerate() {
            if s <= 0.0 {
                return Err(FitError::DegenerateInput {
                    reason: Degeneracy::ZeroVariance(idx),
                });
            }
        }

        let normal = Matrix2::new(s11, s12, s12, s22);
        if normal.determinant() <= COLLINEARITY_TOLERANCE * s11 * s22 {
            return Err(FitError::DegenerateInput {
                reason: Degeneracy::Collinear,
            });
        }
        let beta = normal
            .lu()
            .solve(&Vector2::new(s1y, s2y))
            .ok_or(FitError::DegenerateInput {
                reason: Degeneracy::Collinear,
            })?;

        let coefficients = [beta[0], beta[1]];
        let intercept = mean_y - coefficients[0] * mean_x1 - coefficients[1] * mean_x2;

        let mut fit = Self {
            intercept,
            coefficients,
            rows,
            r_squared: None,
        };
        let ss_tot = y.iter().map(|yi| (yi - mean_y).powi(2)).sum::<f64>();
        if ss_tot > 0.0 {
            let ss_res = x
                .iter()
                .zip(y)
                .map(|([x1, x2], yi)| (yi - fit.predict(*x1, *x2)).powi(2))
                .sum::<f64>();
            fit.r_squared = Some(1.0 - ss_res / ss_tot);
        }
        Ok(fit)
    }

    /// Predicted response at `(x1, x2)`.
    #[must_use]
    pub fn predict(&self, x1: f64, x2: f64) -> f64 {
        self.intercept + self.coefficients[0] * x1 + self.coefficients[1] * x2
    }

    /// Evaluates the plane on a `resolution × resolution` grid spanning
    /// `x1_range` and `x2_range` (both ends included).
    pub fn surface(
        &self,
        x1_range: (f64, f64),
        x2_range: (f64, f64),
        resolution: usize,
    ) -> Result<PlaneSurface, FitError> {
        if resolution < MIN_GRID {
            return Err(FitError::GridTooSmall { resolution });
        }
        let x1 = grid::linspace(x1_range.0, x1_range.1, resolution);
        let x2 = grid::linspace(x2_range.0, x2_range.1, resolution);
        let z = x2
            .iter()
            .map(|&b| x1.iter().map(|&a| self.predict(a, b)).collect())
            .collect();
        Ok(PlaneSurface { x1, x2, z })
    }
}

/// A fitted plane sampled on a regular grid.
///
/// `z[j][i]` is the prediction at `(x1[i], x2[j])`, the row-per-`x2` layout of
/// a mesh grid.
#[derive(Debug, Clone, Serialize)]
pub struct PlaneSurface {
    pub x1: Vec<f64>,
    pub x2: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}
