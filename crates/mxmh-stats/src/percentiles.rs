/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: for `n` values the
/// `k`-th percentile sits at fractional position `(n - 1) * k / 100`.
///
/// Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use mxmh_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let position = (last as f64 * percentile.clamp(0.0, 100.0)) / 100.0;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(last);
    let fraction = position - position.floor();
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction
}

/// Interquartile range (P75 - P25) of sorted values.
#[must_use]
pub fn interquartile_range(sorted_values: &[f64]) -> f64 {
    compute_percentile(sorted_values, 75.0) - compute_percentile(sorted_values, 25.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        assert!(compute_percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_interpolates_between_ranks() {
        let values = [0.0, 10.0];
        assert!((compute_percentile(&values, 25.0) - 2.5).abs() < 1e-12);
        assert!((compute_percentile(&values, 75.0) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_interquartile_range() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert!((interquartile_range(&values) - 4.0).abs() < 1e-12);
    }
}
