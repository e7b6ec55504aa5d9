//! Matrix storage formats for the assembled linear system.
//!
//! All formats expose the same value-access contract through the
//! [`Matrix`] trait so that the calculation engine never depends on a
//! concrete representation:
//!
//! - [`DenseMatrix`]: column-major flat storage; O(1) access,
//!   O(rows×cols) memory. Required whenever a fully materialized
//!   inverse or a large dense intermediate is produced.
//! - [`HashPointMatrix`]: stores only explicitly set nonzero entries,
//!   keyed by `(row, col)`. The format of choice during incremental
//!   assembly.
//! - [`CscMatrix`]: compressed-column format with an immutable nonzero
//!   structure, produced once before repeated solve/multiply work.
//!
//! Conversion rules: converting *to* dense fills absent cells with
//! zeros. Converting *to* the nonzero-keyed form drops every entry
//! whose value is exactly zero, including explicitly stored zeros; a
//! zero is indistinguishable from "absent" afterwards.

mod csc;
mod dense;
mod hash_point;

pub use csc::CscMatrix;
pub use dense::DenseMatrix;
pub use hash_point::HashPointMatrix;

/// Uniform value-access contract over the matrix storage formats.
pub trait Matrix: std::fmt::Debug + Send + Sync {
    /// Number of rows.
    fn rows(&self) -> usize;

    /// Number of columns.
    fn columns(&self) -> usize;

    /// The value at `(row, col)`; zero for absent sparse entries.
    fn get(&self, row: usize, col: usize) -> f64;

    /// Set the value at `(row, col)`.
    ///
    /// For [`CscMatrix`] the nonzero structure is immutable: writing an
    /// entry outside of the stored pattern panics.
    fn set(&mut self, row: usize, col: usize, value: f64);

    /// Row `i` as a fully materialized vector.
    fn row(&self, i: usize) -> Vec<f64> {
        (0..self.columns()).map(|j| self.get(i, j)).collect()
    }

    /// Column `j` as a fully materialized vector.
    fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows()).map(|i| self.get(i, j)).collect()
    }

    /// An independent deep copy with the same backing format.
    fn copy(&self) -> Box<dyn Matrix>;

    /// Multiply column `j` by `factors[j]`, in place, for all columns.
    /// `factors` must hold exactly one entry per column.
    fn scale_columns(&mut self, factors: &[f64]);

    /// A compressed-column copy, for formats that benefit from
    /// compression before repeated numerical work. Dense and already
    /// compressed matrices return `None`.
    fn compressed(&self) -> Option<CscMatrix> {
        None
    }

    /// Whether this matrix uses a sparse backing.
    fn is_sparse(&self) -> bool {
        false
    }
}

/// Convert any matrix to a dense copy; absent sparse entries become
/// explicit zeros.
pub fn dense_of(m: &dyn Matrix) -> DenseMatrix {
    let mut d = DenseMatrix::new(m.rows(), m.columns());
    for col in 0..m.columns() {
        for row in 0..m.rows() {
            let val = m.get(row, col);
            if val != 0.0 {
                d.set(row, col, val);
            }
        }
    }
    d
}

/// Convert any matrix to the nonzero-keyed sparse form. Entries whose
/// value is exactly zero are dropped, including explicitly stored
/// zeros.
pub fn hash_point_of(m: &dyn Matrix) -> HashPointMatrix {
    let mut sparse = HashPointMatrix::new(m.rows(), m.columns());
    for col in 0..m.columns() {
        for row in 0..m.rows() {
            let val = m.get(row, col);
            if val == 0.0 {
                continue;
            }
            sparse.set(row, col, val);
        }
    }
    sparse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_hash_dense_roundtrip() {
        let mut d = DenseMatrix::new(2, 3);
        d.set(0, 0, 1.0);
        d.set(0, 2, -2.5);
        d.set(1, 1, 4.0);

        let sparse = hash_point_of(&d);
        assert_eq!(sparse.nnz(), 3);

        let back = dense_of(&sparse);
        for row in 0..2 {
            for col in 0..3 {
                assert_eq!(back.get(row, col), d.get(row, col));
            }
        }
    }

    #[test]
    fn test_explicit_zero_is_dropped() {
        // An explicitly stored zero does not survive the conversion to
        // the nonzero-keyed form.
        let mut d = DenseMatrix::new(2, 2);
        d.set(0, 0, 3.0);
        d.set(1, 1, 0.0);

        let sparse = hash_point_of(&d);
        assert_eq!(sparse.nnz(), 1);
        assert_eq!(sparse.get(1, 1), 0.0);

        let back = dense_of(&sparse);
        assert_eq!(back.get(0, 0), 3.0);
        assert_eq!(back.get(1, 1), 0.0);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut d = DenseMatrix::new(2, 2);
        d.set(0, 0, 1.0);
        let mut c = d.copy();
        c.set(0, 0, 9.0);
        assert_eq!(d.get(0, 0), 1.0);
        assert_eq!(c.get(0, 0), 9.0);
    }

    #[test]
    #[should_panic(expected = "one factor per column")]
    fn test_scale_columns_rejects_short_factor_vector() {
        let mut d = DenseMatrix::new(2, 2);
        d.scale_columns(&[2.0]);
    }

    #[test]
    fn test_scale_columns_across_formats() {
        let mut d = DenseMatrix::new(2, 2);
        d.set(0, 0, 1.0);
        d.set(1, 0, 2.0);
        d.set(0, 1, 3.0);
        d.set(1, 1, 4.0);

        let mut h = hash_point_of(&d);
        let mut c = CscMatrix::of(&d);

        let factors = [2.0, 0.5];
        d.scale_columns(&factors);
        h.scale_columns(&factors);
        c.scale_columns(&factors);

        for m in [&d as &dyn Matrix, &h, &c] {
            assert_eq!(m.get(0, 0), 2.0);
            assert_eq!(m.get(1, 0), 4.0);
            assert_eq!(m.get(0, 1), 1.5);
            assert_eq!(m.get(1, 1), 2.0);
        }
    }
}
