//! Nonzero-keyed sparse matrix for incremental assembly.

use super::{CscMatrix, Matrix};
use std::collections::HashMap;

/// Sparse matrix keyed by `(row, col)` of its nonzero entries.
///
/// Setting an entry to exactly zero removes it; after that, an
/// explicitly stored zero cannot be told apart from an absent entry.
/// This is the assembly-time format: writes are cheap and unordered,
/// and [`CscMatrix::of`] compresses it once before numerical work.
#[derive(Debug, Clone, Default)]
pub struct HashPointMatrix {
    rows: usize,
    columns: usize,
    entries: HashMap<(usize, usize), f64>,
}

impl HashPointMatrix {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            entries: HashMap::new(),
        }
    }

    /// Number of stored nonzero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the stored `(row, col, value)` triples in no
    /// particular order.
    pub fn iterate(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.entries.iter().map(|(&(r, c), &v)| (r, c, v))
    }
}

impl Matrix for HashPointMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0.0)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        // grow the shape like an assembly buffer would
        if row >= self.rows {
            self.rows = row + 1;
        }
        if col >= self.columns {
            self.columns = col + 1;
        }
        if value == 0.0 {
            self.entries.remove(&(row, col));
        } else {
            self.entries.insert((row, col), value);
        }
    }

    fn copy(&self) -> Box<dyn Matrix> {
        Box::new(self.clone())
    }

    fn scale_columns(&mut self, factors: &[f64]) {
        debug_assert_eq!(factors.len(), self.columns, "one factor per column");
        for (&(_, col), val) in self.entries.iter_mut() {
            if let Some(&f) = factors.get(col) {
                *val *= f;
            }
        }
        // scaling by zero produces stored zeros; keep the invariant
        self.entries.retain(|_, v| *v != 0.0);
    }

    fn compressed(&self) -> Option<CscMatrix> {
        Some(CscMatrix::from_triples(
            self.rows,
            self.columns,
            self.iterate(),
        ))
    }

    fn is_sparse(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_entries_read_zero() {
        let m = HashPointMatrix::new(2, 2);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn test_zero_write_removes_entry() {
        let mut m = HashPointMatrix::new(2, 2);
        m.set(0, 1, 5.0);
        assert_eq!(m.nnz(), 1);
        m.set(0, 1, 0.0);
        assert_eq!(m.nnz(), 0);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn test_set_grows_shape() {
        let mut m = HashPointMatrix::new(1, 1);
        m.set(4, 2, 1.0);
        assert_eq!(m.rows(), 5);
        assert_eq!(m.columns(), 3);
    }

    #[test]
    fn test_iterate_triples() {
        let mut m = HashPointMatrix::new(2, 2);
        m.set(0, 0, 1.0);
        m.set(1, 1, 2.0);
        let mut triples: Vec<_> = m.iterate().collect();
        triples.sort_by_key(|&(r, c, _)| (r, c));
        assert_eq!(triples, vec![(0, 0, 1.0), (1, 1, 2.0)]);
    }

    #[test]
    fn test_scale_by_zero_drops_column() {
        let mut m = HashPointMatrix::new(2, 2);
        m.set(0, 0, 1.0);
        m.set(0, 1, 2.0);
        m.scale_columns(&[0.0, 2.0]);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 1), 4.0);
    }
}
