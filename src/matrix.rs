use crate::errors::FamilyError;

/// Dense row-major matrix; rows are days in loader order.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SampleMatrix {
    /// Build from per-day rows. Empty or ragged input is rejected.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FamilyError> {
        let Some(first) = rows.first() else {
            return Err(FamilyError::MatrixShape("matrix has no rows".to_string()));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(FamilyError::MatrixShape(
                "matrix has no columns".to_string(),
            ));
        }
        let mut values = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(FamilyError::MatrixShape(format!(
                    "row {idx} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            values,
        })
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { rows, cols, values }
    }

    /// Row count (days).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row `idx` as a slice.
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.values[idx * self.cols..(idx + 1) * self.cols]
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    /// Column `col`, copied out in row order.
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.cols)
    }
}
