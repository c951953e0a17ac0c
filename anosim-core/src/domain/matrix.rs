use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`DistanceMatrix`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("distance matrix needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error("distance matrix of dimension {dimension} needs {expected} values, got {actual}")]
    ShapeMismatch {
        dimension: usize,
        expected: usize,
        actual: usize,
    },

    #[error("distance at ({row}, {column}) is not finite: {value}")]
    NonFinite { row: usize, column: usize, value: f64 },

    #[error("distance at ({row}, {column}) is negative: {value}")]
    Negative { row: usize, column: usize, value: f64 },
}

/// Square dissimilarity matrix over N samples, stored row-major.
///
/// Only the upper triangle (row < column) is validated and read by the
/// engine. The lower triangle and diagonal are kept so callers can inspect
/// symmetry, but they never influence ranks or statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistanceMatrix")]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

/// Unchecked serde shape; goes through [`DistanceMatrix::new`] on load.
#[derive(Deserialize)]
struct RawDistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl TryFrom<RawDistanceMatrix> for DistanceMatrix {
    type Error = MatrixError;

    fn try_from(raw: RawDistanceMatrix) -> Result<Self, Self::Error> {
        Self::new(raw.n, raw.values)
    }
}

impl DistanceMatrix {
    /// Build a matrix from `n * n` row-major values.
    pub fn new(n: usize, values: Vec<f64>) -> Result<Self, MatrixError> {
        if n < 2 {
            return Err(MatrixError::TooFewSamples(n));
        }
        let expected = n * n;
        if values.len() != expected {
            return Err(MatrixError::ShapeMismatch {
                dimension: n,
                expected,
                actual: values.len(),
            });
        }

        for row in 0..n - 1 {
            for column in row + 1..n {
                let value = values[row * n + column];
                if !value.is_finite() {
                    return Err(MatrixError::NonFinite { row, column, value });
                }
                if value < 0.0 {
                    return Err(MatrixError::Negative { row, column, value });
                }
            }
        }

        Ok(Self { n, values })
    }

    /// Build a matrix from nested rows. Every row must have `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let n = rows.len();
        let values: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        if rows.iter().any(|r| r.len() != n) {
            return Err(MatrixError::ShapeMismatch {
                dimension: n,
                expected: n * n,
                actual: values.len(),
            });
        }
        Self::new(n, values)
    }

    /// Number of samples (N).
    pub fn sample_count(&self) -> usize {
        self.n
    }

    /// Number of upper-triangular pairs, N·(N−1)/2.
    pub fn pair_count(&self) -> usize {
        self.n * (self.n - 1) / 2
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.n && column < self.n {
            Some(self.values[row * self.n + column])
        } else {
            None
        }
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(row, column, distance)` over the upper triangle in row order.
    pub fn upper_triangle(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.n;
        (0..n).flat_map(move |row| {
            (row + 1..n).map(move |column| (row, column, self.values[row * n + column]))
        })
    }

    /// Largest absolute difference between mirrored cells.
    ///
    /// Zero for a symmetric matrix. The engine reads only the upper triangle,
    /// so a non-zero value means the lower triangle was silently ignored.
    pub fn asymmetry(&self) -> f64 {
        let n = self.n;
        let mut worst = 0.0_f64;
        for row in 0..n {
            for column in row + 1..n {
                let upper = self.values[row * n + column];
                let lower = self.values[column * n + row];
                worst = worst.max((upper - lower).abs());
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: usize) -> Vec<f64> {
        (0..n * n)
            .map(|k| {
                let (r, c) = (k / n, k % n);
                if r == c {
                    0.0
                } else {
                    (r.min(c) * 10 + r.max(c)) as f64
                }
            })
            .collect()
    }

    #[test]
    fn rejects_single_sample() {
        assert_eq!(
            DistanceMatrix::new(1, vec![0.0]),
            Err(MatrixError::TooFewSamples(1))
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let err = DistanceMatrix::new(3, vec![0.0; 8]).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::ShapeMismatch { expected: 9, actual: 8, .. }
        ));
    }

    #[test]
    fn rejects_nan_in_upper_triangle() {
        let mut values = square(3);
        values[1] = f64::NAN;
        let err = DistanceMatrix::new(3, values).unwrap_err();
        assert!(matches!(err, MatrixError::NonFinite { row: 0, column: 1, .. }));
    }

    #[test]
    fn rejects_negative_distance() {
        let mut values = square(3);
        values[5] = -0.5; // (1, 2)
        let err = DistanceMatrix::new(3, values).unwrap_err();
        assert!(matches!(err, MatrixError::Negative { row: 1, column: 2, .. }));
    }

    #[test]
    fn lower_triangle_is_not_validated() {
        let mut values = square(3);
        values[3] = -7.0; // (1, 0)
        assert!(DistanceMatrix::new(3, values).is_ok());
    }

    #[test]
    fn upper_triangle_order_and_count() {
        let m = DistanceMatrix::new(4, square(4)).unwrap();
        let cells: Vec<(usize, usize)> = m.upper_triangle().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(cells, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(m.pair_count(), 6);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(DistanceMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn deserialization_validates_shape_and_values() {
        let ok: DistanceMatrix =
            serde_json::from_str(r#"{"n":2,"values":[0.0,1.5,1.5,0.0]}"#).unwrap();
        assert_eq!(ok.get(0, 1), Some(1.5));

        let short = serde_json::from_str::<DistanceMatrix>(r#"{"n":2,"values":[0.0,1.5]}"#);
        assert!(short.unwrap_err().to_string().contains("needs 4 values"));

        let negative =
            serde_json::from_str::<DistanceMatrix>(r#"{"n":2,"values":[0.0,-1.0,1.0,0.0]}"#);
        assert!(negative.is_err());
    }

    #[test]
    fn asymmetry_reports_worst_mismatch() {
        let rows = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.5, 0.0, 3.0],
            vec![2.0, 3.0, 0.0],
        ];
        let m = DistanceMatrix::from_rows(&rows).unwrap();
        assert!((m.asymmetry() - 0.5).abs() < 1e-12);
    }
}
