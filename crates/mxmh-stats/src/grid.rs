//! Evenly spaced evaluation points.

/// Returns `steps` evenly spaced values from `start` to `end`, both included.
///
/// A single step yields `[start]`; zero steps yield an empty vector. The last
/// value is exactly `end`, not an accumulated approximation of it.
///
/// ```
/// use mxmh_stats::grid::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => vec![],
        1 => vec![start],
        _ => {
            let last = steps - 1;
            let step = (end - start) / last as f64;
            (0..steps)
                .map(|i| {
                    if i == last {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Minimum and maximum of the values, or `None` when empty.
#[must_use]
pub fn extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
    })
}
