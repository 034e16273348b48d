//! Music & mental health survey analysis
//!
//! This crate turns the raw MxMH survey file into the derived tables behind
//! the dashboard charts: histograms, pie charts, box and violin plots,
//! density curves, bubble charts, a correlation heatmap and a regression
//! surface.
//!
//! # Overview
//!
//! 1. **Load** ([`dataset::Dataset`]): Parse the CSV into typed
//!    [`record::Record`]s and drop the known age outlier
//! 2. **Select** ([`selection`]): Validate user-facing parameters such as a
//!    condition or genre name
//! 3. **Aggregate** ([`aggregation::Aggregation`]): Group records and compute
//!    counts, percentages, means, medians and sums
//! 4. **Derive** ([`views`]): Build one table per chart from the dataset
//!
//! The dataset is immutable once loaded; every derived table is a pure
//! function of `&Dataset` and its parameters, recomputed on each call.
//!
//! # Errors
//!
//! - [`dataset::LoadError`]: the survey file cannot be loaded (fatal)
//! - [`selection::SelectionError`]: an unknown condition or genre
//! - [`config::ConfigError`]: a bad configuration file
//! - numeric failures from `mxmh_stats` (correlation, regression) are
//!   returned as is
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mxmh_analysis::{
//!     config::AnalysisConfig,
//!     dataset::Dataset,
//!     record::Condition,
//!     views::{cross, habits},
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let config = AnalysisConfig::default();
//! let dataset = Dataset::load(Path::new("mxmh_survey_results.csv"), &config)?;
//!
//! for share in habits::streaming_platforms(&dataset) {
//!     println!("{}: {:.2}%", share.key, share.percentage);
//! }
//!
//! let fit = cross::regression(&dataset, Condition::Anxiety, config.regression_grid)?;
//! println!(
//!     "anxiety = {:.3} + {:.3}·age + {:.3}·hours",
//!     fit.model.intercept, fit.model.coef_age, fit.model.coef_hours
//! );
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod config;
pub mod dataset;
pub mod record;
pub mod selection;
pub mod views;
