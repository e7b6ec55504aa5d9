//! Compressed-column sparse matrix.

use super::Matrix;
use sprs::{CsMat, TriMat};

/// Compressed-column sparse matrix backed by `sprs::CsMat`.
///
/// Built once from another format before repeated solve/multiply work.
/// The nonzero structure is immutable: [`Matrix::set`] may only
/// overwrite entries that are part of the stored pattern.
#[derive(Debug, Clone)]
pub struct CscMatrix {
    matrix: CsMat<f64>,
}

impl CscMatrix {
    /// Compress any matrix; entries that read exactly zero are not part
    /// of the resulting pattern.
    pub fn of(m: &dyn Matrix) -> Self {
        let triples = (0..m.columns())
            .flat_map(|col| (0..m.rows()).map(move |row| (row, col)))
            .filter_map(|(row, col)| {
                let val = m.get(row, col);
                (val != 0.0).then_some((row, col, val))
            });
        Self::from_triples(m.rows(), m.columns(), triples)
    }

    /// Build from `(row, col, value)` triples.
    pub fn from_triples(
        rows: usize,
        columns: usize,
        triples: impl Iterator<Item = (usize, usize, f64)>,
    ) -> Self {
        let mut triplets = TriMat::new((rows, columns));
        for (row, col, val) in triples {
            triplets.add_triplet(row, col, val);
        }
        Self {
            matrix: triplets.to_csc(),
        }
    }

    /// Number of stored nonzero entries.
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Matrix density (nnz / (rows × columns)).
    pub fn density(&self) -> f64 {
        let cells = self.rows() * self.columns();
        if cells == 0 {
            return 0.0;
        }
        self.nnz() as f64 / cells as f64
    }

    /// Iterate over the nonzero entries `(row, value)` of column `j`.
    pub fn column_entries(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.matrix
            .outer_view(j)
            .map(|col| col.iter().map(|(row, &v)| (row, v)).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
    }
}

impl Matrix for CscMatrix {
    fn rows(&self) -> usize {
        self.matrix.rows()
    }

    fn columns(&self) -> usize {
        self.matrix.cols()
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col).copied().unwrap_or(0.0)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        match self.matrix.get_mut(row, col) {
            Some(entry) => *entry = value,
            None => panic!(
                "entry ({row}, {col}) is not part of the compressed nonzero pattern"
            ),
        }
    }

    fn column(&self, j: usize) -> Vec<f64> {
        let mut col = vec![0.0; self.rows()];
        for (row, val) in self.column_entries(j) {
            col[row] = val;
        }
        col
    }

    fn copy(&self) -> Box<dyn Matrix> {
        Box::new(self.clone())
    }

    fn scale_columns(&mut self, factors: &[f64]) {
        debug_assert_eq!(factors.len(), self.columns(), "one factor per column");
        for (j, mut col) in self.matrix.outer_iterator_mut().enumerate() {
            let Some(&f) = factors.get(j) else {
                break;
            };
            for (_, val) in col.iter_mut() {
                *val *= f;
            }
        }
    }

    fn is_sparse(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::HashPointMatrix;

    fn sample() -> CscMatrix {
        let mut h = HashPointMatrix::new(3, 3);
        h.set(0, 0, 1.0);
        h.set(2, 0, -0.5);
        h.set(1, 1, 2.0);
        h.set(0, 2, 4.0);
        CscMatrix::of(&h)
    }

    #[test]
    fn test_compression_keeps_values() {
        let m = sample();
        assert_eq!(m.nnz(), 4);
        assert_eq!(m.get(2, 0), -0.5);
        assert_eq!(m.get(1, 1), 2.0);
        assert_eq!(m.get(2, 2), 0.0);
    }

    #[test]
    fn test_set_existing_entry() {
        let mut m = sample();
        m.set(1, 1, 9.0);
        assert_eq!(m.get(1, 1), 9.0);
        // writing zero keeps the pattern entry
        m.set(1, 1, 0.0);
        assert_eq!(m.nnz(), 4);
        assert_eq!(m.get(1, 1), 0.0);
    }

    #[test]
    #[should_panic(expected = "nonzero pattern")]
    fn test_set_outside_pattern_panics() {
        let mut m = sample();
        m.set(2, 2, 1.0);
    }

    #[test]
    fn test_column_extraction() {
        let m = sample();
        assert_eq!(m.column(0), vec![1.0, 0.0, -0.5]);
        assert_eq!(m.column(2), vec![4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_density() {
        let m = sample();
        assert!((m.density() - 4.0 / 9.0).abs() < 1e-12);
    }
}
