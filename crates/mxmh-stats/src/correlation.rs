//! Pearson correlation.
//!
//! [`CorrelationMatrix::from_columns`] builds the full N×N matrix from
//! row-aligned columns. Only the upper triangle is computed; the lower
//! triangle is mirrored from it and the diagonal is exactly `1.0`.

use serde::Serialize;

use crate::descriptive;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum CorrelationError {
    #[display("correlation needs at least 2 rows, got {rows}")]
    TooFewRows { rows: usize },
    #[display("column {column} has {len} values, expected {expected}")]
    MisalignedColumn {
        column: usize,
        len: usize,
        expected: usize,
    },
    #[display("column {column} has zero variance")]
    ZeroVariance { column: usize },
}

/// Pearson correlation coefficient of two equally long series.
///
/// Returns `None` when the series are shorter than 2, have different lengths,
/// or either has zero variance. The result is clamped to `[-1, 1]`.
///
/// ```
/// use mxmh_stats::correlation::pearson;
///
/// let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
/// assert!((r - 1.0).abs() < 1e-12);
/// assert_eq!(pearson(&[1.0, 1.0], &[2.0, 3.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || has_zero_variance(xs) || has_zero_variance(ys) {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Symmetric Pearson correlation matrix, stored row-major.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    size: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Computes the matrix of every pair of `columns`.
    ///
    /// All columns must have the same length (row `i` of each column belongs
    /// to the same observation).
    pub fn from_columns<C>(columns: &[C]) -> Result<Self, CorrelationError>
    where
        C: AsRef<[f64]>,
    {
        let size = columns.len();
        let rows = columns.first().map_or(0, |c| c.as_ref().len());
        for (column, values) in columns.iter().enumerate() {
            let len = values.as_ref().len();
            if len != rows {
                return Err(CorrelationError::MisalignedColumn {
                    column,
                    len,
                    expected: rows,
                });
            }
        }
        if rows < 2 {
            return Err(CorrelationError::TooFewRows { rows });
        }

        let mut values = vec![0.0; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let r = pearson(columns[i].as_ref(), columns[j].as_ref()).ok_or_else(|| {
                    let column = if has_zero_variance(columns[i].as_ref()) {
                        i
                    } else {
                        j
                    };
                    CorrelationError::ZeroVariance { column }
                })?;
                values[i * size + j] = r;
                values[j * size + i] = r;
            }
        }
        if size == 1 && has_zero_variance(columns[0].as_ref()) {
            return Err(CorrelationError::ZeroVariance { column: 0 });
        }

        Ok(Self { size, values })
    }

    /// Number of rows (and columns) of the matrix.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Correlation between column `i` and column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "index out of bounds");
        self.values[i * self.size + j]
    }

    /// Iterates over all `(i, j, r)` entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(idx, &r)| (idx / self.size, idx % self.size, r))
    }
}

fn has_zero_variance(values: &[f64]) -> bool {
    descriptive::is_constant(values.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_properties() {
        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 4.0, 3.0, 6.0],
            vec![9.0, 7.0, 5.0, 4.0, 1.0],
            vec![0.0, 3.0, 0.0, 3.0, 1.0],
        ];
        let matrix = CorrelationMatrix::from_columns(&columns).unwrap();
        assert_eq!(matrix.size(), 4);
        assert_eq!(matrix.iter().count(), 16);
        for (i, j, r) in matrix.iter() {
            if i == j {
                assert_eq!(r, 1.0);
            } else {
                assert!((-1.0..=1.0).contains(&r));
                assert_eq!(r.to_bits(), matrix.get(j, i).to_bits());
            }
        }
        assert!(matrix.get(0, 2) < -0.9);
    }

    #[test]
    fn test_too_few_rows() {
        let columns = vec![vec![1.0], vec![2.0]];
        assert_eq!(
            CorrelationMatrix::from_columns(&columns).unwrap_err(),
            CorrelationError::TooFewRows { rows: 1 }
        );
    }

    #[test]
    fn test_zero_variance_column() {
        let columns = vec![vec![1.0, 2.0, 3.0], vec![5.0, 5.0, 5.0]];
        assert_eq!(
            CorrelationMatrix::from_columns(&columns).unwrap_err(),
            CorrelationError::ZeroVariance { column: 1 }
        );
    }

    #[test]
    fn test_constant_fractional_column() {
        let columns = vec![vec![1.0, 4.0, 2.0, 8.0, 5.0, 3.0, 7.0], vec![0.1; 7]];
        assert_eq!(
            CorrelationMatrix::from_columns(&columns).unwrap_err(),
            CorrelationError::ZeroVariance { column: 1 }
        );
        assert_eq!(pearson(&columns[0], &columns[1]), None);
    }

    #[test]
    fn test_misaligned_columns() {
        let columns = vec![vec![1.0, 2.0, 3.0], vec![5.0, 6.0]];
        assert!(matches!(
            CorrelationMatrix::from_columns(&columns),
            Err(CorrelationError::MisalignedColumn { column: 1, .. })
        ));
    }
}
