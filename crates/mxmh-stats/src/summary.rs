use serde::Serialize;

use crate::{descriptive::DescriptiveStats, percentiles};

/// Five-number summary plus mean, as drawn by a box plot.
///
/// Combines the descriptive statistics of a dataset with its first and third
/// quartiles (linear interpolation, see [`percentiles::compute_percentile`]).
///
/// # Examples
///
/// ```
/// use mxmh_stats::summary::BoxSummary;
///
/// let summary = BoxSummary::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(summary.min, 1.0);
/// assert_eq!(summary.q1, 2.0);
/// assert_eq!(summary.median, 3.0);
/// assert_eq!(summary.q3, 4.0);
/// assert_eq!(summary.max, 5.0);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl BoxSummary {
    /// Computes the summary from unsorted values.
    ///
    /// Returns `None` if the dataset is empty.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let stats = DescriptiveStats::from_sorted(&sorted)?;
        Some(Self {
            count: stats.count,
            min: stats.min,
            q1: percentiles::compute_percentile(&sorted, 25.0),
            median: stats.median,
            q3: percentiles::compute_percentile(&sorted, 75.0),
            max: stats.max,
            mean: stats.mean,
        })
    }

    /// Interquartile range (`q3 - q1`).
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}
