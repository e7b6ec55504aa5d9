//! Dense matrix with column-major flat storage.

use super::Matrix;

/// Dense matrix backed by a flat column-major `Vec<f64>`.
///
/// Column-major layout keeps column extraction and column scaling
/// contiguous, which is what the calculation engine does most.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    columns: usize,
    /// Values in column-major order: `data[col * rows + row]`.
    data: Vec<f64>,
}

impl DenseMatrix {
    /// A zero-filled matrix of the given shape.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Build from row slices; shorter rows are padded with zeros.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut m = Self::new(n_rows, n_cols);
        for (i, row) in rows.iter().enumerate() {
            for (j, &val) in row.iter().enumerate() {
                m.set(i, j, val);
            }
        }
        m
    }

    /// Identity-like diagonal matrix `c * I` of size n.
    pub fn diagonal(n: usize, c: f64) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.set(i, i, c);
        }
        m
    }

    /// The flat column-major value slice.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Contiguous slice of column `j`.
    pub fn column_slice(&self, j: usize) -> &[f64] {
        let start = j * self.rows;
        &self.data[start..start + self.rows]
    }
}

impl Matrix for DenseMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.data[col * self.rows + row]
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[col * self.rows + row] = value;
    }

    fn column(&self, j: usize) -> Vec<f64> {
        self.column_slice(j).to_vec()
    }

    fn copy(&self) -> Box<dyn Matrix> {
        Box::new(self.clone())
    }

    fn scale_columns(&mut self, factors: &[f64]) {
        debug_assert_eq!(factors.len(), self.columns, "one factor per column");
        for (j, &f) in factors.iter().enumerate().take(self.columns) {
            let start = j * self.rows;
            for val in &mut self.data[start..start + self.rows] {
                *val *= f;
            }
        }
    }
}
