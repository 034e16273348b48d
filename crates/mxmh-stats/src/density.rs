//! Gaussian kernel density estimation over a bounded domain.
//!
//! The estimator is deterministic: the bandwidth is derived from the data with
//! the normal-reference rule and the curve is sampled at evenly spaced points
//! spanning a caller-provided domain, so identical input always yields an
//! identical curve.
//!
//! # Examples
//!
//! ```
//! use mxmh_stats::density::{DensityDomain, DensityEstimator};
//!
//! let values = [2.0, 3.0, 3.0, 4.0, 7.0];
//! let curve = DensityEstimator::new(DensityDomain::new(0.0, 10.0), 101)
//!     .estimate(&values)
//!     .unwrap();
//!
//! assert_eq!(curve.samples.len(), 101);
//! assert!(curve.samples.iter().all(|s| s.density >= 0.0));
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{
    descriptive::{self, DescriptiveStats},
    grid, percentiles,
};

/// Minimum number of observations for which a density is defined.
pub const MIN_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DensityError {
    #[display("density needs at least {MIN_OBSERVATIONS} observations, got {observations}")]
    TooFewObservations { observations: usize },
    #[display("observation {index} is not a finite number")]
    NonFiniteValue { index: usize },
}

/// Closed interval over which a density curve is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityDomain {
    pub start: f64,
    pub end: f64,
}

impl DensityDomain {
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Whether the domain is a non-empty finite interval.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start < self.end
    }
}

/// One evaluated point of a density curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensitySample {
    pub value: f64,
    pub density: f64,
}

/// A density curve sampled over its domain, in ascending `value` order.
#[derive(Debug, Clone, Serialize)]
pub struct DensityCurve {
    /// Number of observations the curve was estimated from.
    pub observations: usize,
    /// Kernel bandwidth used for the estimate.
    pub bandwidth: f64,
    pub samples: Vec<DensitySample>,
}

impl DensityCurve {
    /// Trapezoidal integral of the sampled curve.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| (w[1].value - w[0].value) * (w[0].density + w[1].density) / 2.0)
            .sum()
    }
}

/// Gaussian KDE evaluated at `steps` evenly spaced points over a domain.
#[derive(Debug, Clone, Copy)]
pub struct DensityEstimator {
    domain: DensityDomain,
    steps: usize,
}

impl DensityEstimator {
    #[must_use]
    pub const fn new(domain: DensityDomain, steps: usize) -> Self {
        Self { domain, steps }
    }

    /// Estimates the density of `values` over the configured domain.
    ///
    /// Fails with [`DensityError::TooFewObservations`] when fewer than
    /// [`MIN_OBSERVATIONS`] values are given; no curve is fabricated for them.
    /// A `NaN` or infinite value fails with [`DensityError::NonFiniteValue`].
    pub fn estimate(&self, values: &[f64]) -> Result<DensityCurve, DensityError> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DensityError::NonFiniteValue { index });
        }
        if values.len() < MIN_OBSERVATIONS {
            return Err(DensityError::TooFewObservations {
                observations: values.len(),
            });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let bandwidth = normal_reference_bandwidth(&sorted);

        let samples = grid::linspace(self.domain.start, self.domain.end, self.steps)
            .into_iter()
            .map(|value| DensitySample {
                value,
                density: gaussian_kde(&sorted, bandwidth, value),
            })
            .collect();

        Ok(DensityCurve {
            observations: sorted.len(),
            bandwidth,
            samples,
        })
    }
}

/// Normal-reference ("rule of thumb") bandwidth.
///
/// `1.06 * min(σ, IQR / 1.34) * n^(-1/5)`, where a zero spread falls back to
/// σ, then to `|x₀|`, then to 1 so that the bandwidth is always positive.
/// Identical values have zero spread even when rounding leaves σ slightly
/// above zero.
///
/// # Panics
///
/// Panics if `sorted_values` is not sorted in ascending order.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn normal_reference_bandwidth(sorted_values: &[f64]) -> f64 {
    let Some(stats) = DescriptiveStats::from_sorted(sorted_values) else {
        return 1.0;
    };
    let (sd, iqr) = if descriptive::is_constant(sorted_values.iter().copied()) {
        (0.0, 0.0)
    } else {
        // Sample standard deviation.
        let sd = if stats.count > 1 {
            (stats.variance * stats.count as f64 / (stats.count - 1) as f64).sqrt()
        } else {
            0.0
        };
        (sd, percentiles::interquartile_range(sorted_values))
    };
    let spread = [sd.min(iqr / 1.34), sd, sorted_values[0].abs(), 1.0]
        .into_iter()
        .find(|s| *s > 0.0)
        .unwrap_or(1.0);
    1.06 * spread * (stats.count as f64).powf(-0.2)
}

#[expect(clippy::cast_precision_loss)]
fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    let norm = 1.0 / ((2.0 * PI).sqrt() * bandwidth * values.len() as f64);
    let sum = values
        .iter()
        .map(|&xi| {
            let u = (x - xi) / bandwidth;
            (-0.5 * u * u).exp()
        })
        .sum::<f64>();
    sum * norm
}
