//! Statistical building blocks for the MxMH survey analysis.
//!
//! This crate knows nothing about the survey itself; it provides the numeric
//! routines the analysis layer composes:
//!
//! - **Descriptive statistics**: count, min, max, sum, mean, median, variance
//! - **Percentiles**: linearly interpolated percentiles and quartiles
//! - **Box summaries**: five-number summary for box plots
//! - **Density estimation**: deterministic Gaussian KDE over a bounded domain
//! - **Correlation**: Pearson coefficients and full correlation matrices
//! - **Regression**: two-predictor ordinary least squares and surface grids
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Interpolated percentiles
//! - [`summary`]: Box-plot summaries
//! - [`grid`]: Evenly spaced evaluation points
//! - [`density`]: Kernel density estimation
//! - [`correlation`]: Pearson correlation matrices
//! - [`regression`]: Least-squares plane fitting
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use mxmh_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Correlating two series
//!
//! ```
//! use mxmh_stats::correlation::CorrelationMatrix;
//!
//! let columns = [vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]];
//! let matrix = CorrelationMatrix::from_columns(&columns).unwrap();
//! assert_eq!(matrix.get(0, 0), 1.0);
//! assert!((matrix.get(0, 1) + 1.0).abs() < 1e-12);
//! ```
//!
//! ## Fitting a plane
//!
//! ```
//! use mxmh_stats::regression::PlaneFit;
//!
//! let x = [[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 3.0]];
//! let y = [1.0, 2.0, 3.0, 8.0];
//! let fit = PlaneFit::fit(&x, &y).unwrap();
//! assert!((fit.predict(1.0, 1.0) - 3.0).abs() < 1e-9);
//! ```

pub mod correlation;
pub mod density;
pub mod descriptive;
pub mod grid;
pub mod percentiles;
pub mod regression;
pub mod summary;
