use rayon::prelude::*;
use tracing::info;

use crate::errors::FamilyError;
use crate::matrix::SampleMatrix;

/// Dynamic time warping distance with absolute-difference local cost.
///
/// Full alignment search (no window). `T[0][0] = 0`, every other border cell
/// is `+inf`, and `T[i][j] = |x[i-1] - y[j-1]| + min(T[i-1][j], T[i][j-1], T[i-1][j-1])`.
/// Only two rows of the table are kept alive.
pub fn dtw(x: &[f64], y: &[f64]) -> f64 {
    let m = y.len();
    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;
    for xi in x {
        curr[0] = f64::INFINITY;
        for j in 1..=m {
            let best = prev[j].min(curr[j - 1]).min(prev[j - 1]);
            curr[j] = (xi - y[j - 1]).abs() + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}

/// Symmetric all-pairs distance matrix with a zero diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// DTW over every pair of rows. Only the upper triangle is computed; it is
    /// mirrored into the lower one.
    pub fn from_sequences(sequences: &SampleMatrix) -> Result<Self, FamilyError> {
        let n = sequences.rows();
        info!(
            "[families:distance] computing {} DTW pairs over {} days ({} samples each)",
            n * n.saturating_sub(1) / 2,
            n,
            sequences.cols()
        );
        let upper: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let left = sequences.row(i);
                ((i + 1)..n)
                    .map(|j| dtw(left, sequences.row(j)))
                    .collect()
            })
            .collect();

        let mut values = vec![0.0; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, distance) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                values[i * n + j] = distance;
                values[j * n + i] = distance;
            }
        }
        let matrix = Self { n, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Wrap a precomputed row-major `n x n` matrix.
    pub fn from_values(n: usize, values: Vec<f64>) -> Result<Self, FamilyError> {
        if values.len() != n * n {
            return Err(FamilyError::DistanceInvariant(format!(
                "expected {} entries for a {n}x{n} matrix, got {}",
                n * n,
                values.len()
            )));
        }
        let matrix = Self { n, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Check zero diagonal, exact symmetry, and finite non-negative entries.
    pub fn validate(&self) -> Result<(), FamilyError> {
        for i in 0..self.n {
            if self.get(i, i) != 0.0 {
                return Err(FamilyError::DistanceInvariant(format!(
                    "diagonal entry ({i}, {i}) is {}",
                    self.get(i, i)
                )));
            }
            for j in (i + 1)..self.n {
                let forward = self.get(i, j);
                if !forward.is_finite() || forward < 0.0 {
                    return Err(FamilyError::DistanceInvariant(format!(
                        "entry ({i}, {j}) is {forward}"
                    )));
                }
                if forward != self.get(j, i) {
                    return Err(FamilyError::DistanceInvariant(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of days (rows == columns).
    pub fn len(&self) -> usize {
        self.n
    }

    /// True when the matrix covers no days.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between days `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Distances from day `i` to every day.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtw_base_cases() {
        assert_eq!(dtw(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(dtw(&[0.0], &[5.0]), 5.0);
        // extra step aligns onto a repeated sample at zero marginal cost
        assert_eq!(dtw(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn dtw_warps_instead_of_comparing_elementwise() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 0.0, 1.0, 2.0, 3.0];
        assert_eq!(dtw(&x, &y), 0.0);
        // a shifted step: elementwise L1 would be 1.0
        assert_eq!(dtw(&[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 1.0]), 0.0);
        assert_eq!(dtw(&[0.0, 2.0], &[1.0]), 2.0);
    }

    #[test]
    fn dtw_is_symmetric() {
        let x = [0.3, -1.2, 4.5, 2.0, 0.0];
        let y = [1.1, 0.4, -0.7];
        assert_eq!(dtw(&x, &y), dtw(&y, &x));
    }

    #[test]
    fn dtw_with_empty_sequence() {
        assert_eq!(dtw(&[], &[]), 0.0);
        assert!(dtw(&[1.0], &[]).is_infinite());
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let sequences = SampleMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0, 3.0],
            vec![3.0, 2.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![1.0, 1.5, 1.0, 0.5],
        ])
        .unwrap();
        let matrix = DistanceMatrix::from_sequences(&sequences).unwrap();
        assert_eq!(matrix.len(), 4);
        for i in 0..4 {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..4 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                assert_eq!(matrix.get(i, j), dtw(sequences.row(i), sequences.row(j)));
            }
        }
        assert_eq!(matrix.row(2)[2], 0.0);
    }

    #[test]
    fn precomputed_matrices_are_validated() {
        assert!(DistanceMatrix::from_values(2, vec![0.0, 1.0, 1.0, 0.0]).is_ok());
        assert!(matches!(
            DistanceMatrix::from_values(2, vec![0.0, 1.0, 2.0, 0.0]),
            Err(FamilyError::DistanceInvariant(_))
        ));
        assert!(matches!(
            DistanceMatrix::from_values(2, vec![1.0, 1.0, 1.0, 0.0]),
            Err(FamilyError::DistanceInvariant(_))
        ));
        assert!(matches!(
            DistanceMatrix::from_values(2, vec![0.0, -1.0, -1.0, 0.0]),
            Err(FamilyError::DistanceInvariant(_))
        ));
        assert!(DistanceMatrix::from_values(3, vec![0.0; 4]).is_err());
    }
}
