use tracing::debug;

use crate::matrix::SampleMatrix;

/// Column-wise z-scored matrix plus the statistics used to produce it.
#[derive(Clone, Debug)]
pub struct Standardized {
    /// Standardized values, same shape and row order as the input.
    pub matrix: SampleMatrix,
    /// Per-column mean subtracted from each value.
    pub means: Vec<f64>,
    /// Per-column divisor (population standard deviation, or 1 when degenerate).
    pub scales: Vec<f64>,
    /// Columns with zero spread, left unscaled.
    pub degenerate_columns: Vec<usize>,
}

/// Z-score every column using population variance.
///
/// A column whose values are all identical maps to exact zeros; a column with
/// zero standard deviation is centred but divided by 1.
pub fn standardize(matrix: &SampleMatrix) -> Standardized {
    let rows = matrix.rows();
    let cols = matrix.cols();
    let mut means = Vec::with_capacity(cols);
    let mut scales = Vec::with_capacity(cols);
    let mut degenerate_columns = Vec::new();

    for col in 0..cols {
        let column = matrix.column(col);
        let first = column[0];
        if column.iter().all(|value| *value == first) {
            means.push(first);
            scales.push(1.0);
            degenerate_columns.push(col);
            continue;
        }
        let mean = column.iter().sum::<f64>() / rows as f64;
        let variance = column
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / rows as f64;
        let std = variance.sqrt();
        means.push(mean);
        if std == 0.0 {
            scales.push(1.0);
            degenerate_columns.push(col);
        } else {
            scales.push(std);
        }
    }

    if !degenerate_columns.is_empty() {
        debug!(
            "[families:standardize] {} of {} columns have zero variance and were left unscaled",
            degenerate_columns.len(),
            cols
        );
    }

    let mut values = Vec::with_capacity(rows * cols);
    for row in matrix.iter_rows() {
        values.extend(
            row.iter()
                .zip(means.iter().zip(&scales))
                .map(|(value, (mean, scale))| (value - mean) / scale),
        );
    }

    Standardized {
        matrix: SampleMatrix::from_parts(rows, cols, values),
        means,
        scales,
        degenerate_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FamilyError;

    fn standardize_rows(rows: Vec<Vec<f64>>) -> Result<Standardized, FamilyError> {
        Ok(standardize(&SampleMatrix::from_rows(rows)?))
    }

    fn mean_and_std(values: &[f64]) -> (f64, f64) {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        (mean, var.sqrt())
    }

    #[test]
    fn non_degenerate_columns_have_zero_mean_unit_std() {
        let out = standardize_rows(vec![
            vec![1.0, 10.0, -3.0],
            vec![2.0, 20.0, 0.5],
            vec![4.0, 35.0, 7.25],
            vec![8.0, 15.0, 1.0],
        ])
        .unwrap();
        assert!(out.degenerate_columns.is_empty());
        for col in 0..3 {
            let (mean, std) = mean_and_std(&out.matrix.column(col));
            assert!(mean.abs() < 1e-12, "column {col} mean {mean}");
            assert!((std - 1.0).abs() < 1e-12, "column {col} std {std}");
        }
    }

    #[test]
    fn constant_column_becomes_zeros() {
        let out = standardize_rows(vec![vec![0.1, 1.0], vec![0.1, 2.0], vec![0.1, 3.0]]).unwrap();
        assert_eq!(out.degenerate_columns, vec![0]);
        assert_eq!(out.scales[0], 1.0);
        assert!(out.matrix.column(0).iter().all(|v| *v == 0.0));
        assert!(out.matrix.column(1).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rows_keep_their_order() {
        let out = standardize_rows(vec![vec![1.0], vec![3.0]]).unwrap();
        assert_eq!(out.matrix.row(0), &[-1.0]);
        assert_eq!(out.matrix.row(1), &[1.0]);
    }

    #[test]
    fn ragged_input_fails() {
        assert!(standardize_rows(vec![vec![1.0, 2.0], vec![1.0]]).is_err());
        assert!(standardize_rows(Vec::new()).is_err());
    }
}
