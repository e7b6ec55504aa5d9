use crate::matrix::{DenseMatrix, Matrix};
use faer::{prelude::*, solvers::PartialPivLu, Mat};
use thiserror::Error;

/// Errors from the numerical solver operations.
///
/// Every variant names the failing operation so that a calculation
/// abort can be traced to the matrix it happened on. A singular or
/// non-convergent system is always an error here, never a result full
/// of NaNs.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("{op}: matrix must be square, got {rows}x{columns}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        columns: usize,
    },

    #[error("{op}: dimension mismatch: {detail}")]
    Dimension { op: &'static str, detail: String },

    #[error("{op}: matrix is singular (no usable pivot in column {index})")]
    Singular { op: &'static str, index: usize },

    #[error("{op}: result contains non-finite values; system is singular or ill-conditioned")]
    NonFinite { op: &'static str },
}

/// Capability object for the linear algebra of a calculation.
///
/// All operations work in double precision on the [`Matrix`] value
/// contract, so any storage format can be passed in. `solve` is the
/// performance path: it must not materialize a full inverse.
pub trait MatrixSolver: Send + Sync {
    /// Solve `A·s = demand·e[ref_idx]` for the scaling vector `s`.
    fn solve(&self, a: &dyn Matrix, ref_idx: usize, demand: f64) -> Result<Vec<f64>, SolverError>;

    /// The full inverse of `A`, as a dense matrix.
    fn invert(&self, a: &dyn Matrix) -> Result<DenseMatrix, SolverError>;

    /// Matrix product `A·B` as a new dense matrix; non-mutating.
    fn multiply(&self, a: &dyn Matrix, b: &dyn Matrix) -> Result<DenseMatrix, SolverError> {
        if a.columns() != b.rows() {
            return Err(SolverError::Dimension {
                op: "multiply",
                detail: format!(
                    "left is {}x{}, right is {}x{}",
                    a.rows(),
                    a.columns(),
                    b.rows(),
                    b.columns()
                ),
            });
        }
        let mut out = DenseMatrix::new(a.rows(), b.columns());
        for j in 0..b.columns() {
            let col = self.multiply_vec(a, &b.column(j))?;
            for (i, val) in col.into_iter().enumerate() {
                if val != 0.0 {
                    out.set(i, j, val);
                }
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `A·v`; non-mutating. Skips zero entries of
    /// `v`, so sparse scaling vectors stay cheap.
    fn multiply_vec(&self, a: &dyn Matrix, v: &[f64]) -> Result<Vec<f64>, SolverError> {
        if v.len() != a.columns() {
            return Err(SolverError::Dimension {
                op: "multiply_vec",
                detail: format!(
                    "matrix has {} columns, vector has length {}",
                    a.columns(),
                    v.len()
                ),
            });
        }
        let mut out = vec![0.0; a.rows()];
        for (k, &factor) in v.iter().enumerate() {
            if factor == 0.0 {
                continue;
            }
            for (i, val) in a.column(k).into_iter().enumerate() {
                out[i] += val * factor;
            }
        }
        Ok(out)
    }

    /// Multiply column j of `m` by `factors[j]`, in place.
    fn scale_columns(&self, m: &mut dyn Matrix, factors: &[f64]) -> Result<(), SolverError> {
        if factors.len() != m.columns() {
            return Err(SolverError::Dimension {
                op: "scale_columns",
                detail: format!(
                    "matrix has {} columns, factor vector has length {}",
                    m.columns(),
                    factors.len()
                ),
            });
        }
        m.scale_columns(factors);
        Ok(())
    }
}

fn require_square(op: &'static str, a: &dyn Matrix) -> Result<usize, SolverError> {
    let (rows, columns) = (a.rows(), a.columns());
    if rows != columns {
        return Err(SolverError::NotSquare { op, rows, columns });
    }
    Ok(rows)
}

fn demand_rhs(n: usize, ref_idx: usize, demand: f64, op: &'static str) -> Result<Vec<f64>, SolverError> {
    if ref_idx >= n {
        return Err(SolverError::Dimension {
            op,
            detail: format!("reference position {} outside of 0..{}", ref_idx, n),
        });
    }
    let mut rhs = vec![0.0; n];
    rhs[ref_idx] = demand;
    Ok(rhs)
}

/// Pure-Rust Gauss elimination backend with partial pivoting.
///
/// No external numerical dependency; used as the fallback and as a
/// cross-check for the faer backend in tests.
#[derive(Debug, Clone, Default)]
pub struct GaussSolver;

impl GaussSolver {
    /// LU decomposition with partial pivoting; returns (lu, perm).
    fn lu(a: &dyn Matrix, op: &'static str) -> Result<(Vec<Vec<f64>>, Vec<usize>), SolverError> {
        let n = require_square(op, a)?;
        let mut lu: Vec<Vec<f64>> = (0..n).map(|i| a.row(i)).collect();
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut max_val = lu[k][k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                if lu[i][k].abs() > max_val {
                    max_val = lu[i][k].abs();
                    max_row = i;
                }
            }

            if max_val < 1e-12 {
                return Err(SolverError::Singular { op, index: k });
            }

            if max_row != k {
                lu.swap(k, max_row);
                perm.swap(k, max_row);
            }

            for i in (k + 1)..n {
                lu[i][k] /= lu[k][k];
                for j in (k + 1)..n {
                    lu[i][j] -= lu[i][k] * lu[k][j];
                }
            }
        }

        Ok((lu, perm))
    }

    /// Solve L·U·x = P·b via forward/back substitution.
    fn substitute(lu: &[Vec<f64>], perm: &[usize], b: &[f64]) -> Vec<f64> {
        let n = lu.len();

        let mut y = vec![0.0; n];
        for i in 0..n {
            y[i] = b[perm[i]];
            for j in 0..i {
                y[i] -= lu[i][j] * y[j];
            }
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            x[i] = y[i];
            for j in (i + 1)..n {
                x[i] -= lu[i][j] * x[j];
            }
            x[i] /= lu[i][i];
        }

        x
    }
}

impl MatrixSolver for GaussSolver {
    fn solve(&self, a: &dyn Matrix, ref_idx: usize, demand: f64) -> Result<Vec<f64>, SolverError> {
        let n = require_square("solve", a)?;
        let rhs = demand_rhs(n, ref_idx, demand, "solve")?;
        let (lu, perm) = Self::lu(a, "solve")?;
        Ok(Self::substitute(&lu, &perm, &rhs))
    }

    fn invert(&self, a: &dyn Matrix) -> Result<DenseMatrix, SolverError> {
        let n = require_square("invert", a)?;
        let (lu, perm) = Self::lu(a, "invert")?;

        let mut inv = DenseMatrix::new(n, n);
        let mut unit = vec![0.0; n];
        for col in 0..n {
            unit[col] = 1.0;
            let x = Self::substitute(&lu, &perm, &unit);
            unit[col] = 0.0;
            for (i, val) in x.into_iter().enumerate() {
                if val != 0.0 {
                    inv.set(i, col, val);
                }
            }
        }
        Ok(inv)
    }
}

/// Dense LU backend on top of faer's partial-pivot factorization.
///
/// faer does not report singularity from the factorization itself, so
/// every result is checked for finiteness before it is returned.
#[derive(Debug, Clone, Default)]
pub struct FaerSolver;

impl FaerSolver {
    fn to_faer(a: &dyn Matrix) -> Mat<f64> {
        Mat::from_fn(a.rows(), a.columns(), |i, j| a.get(i, j))
    }
}

impl MatrixSolver for FaerSolver {
    fn solve(&self, a: &dyn Matrix, ref_idx: usize, demand: f64) -> Result<Vec<f64>, SolverError> {
        let n = require_square("solve", a)?;
        let rhs = demand_rhs(n, ref_idx, demand, "solve")?;

        let mat = Self::to_faer(a);
        let rhs_mat = Mat::from_fn(n, 1, |i, _| rhs[i]);
        let lu = PartialPivLu::new(mat.as_ref());
        let sol = lu.solve(&rhs_mat);

        let mut solution = Vec::with_capacity(n);
        for i in 0..n {
            let val = sol.read(i, 0);
            if !val.is_finite() {
                return Err(SolverError::NonFinite { op: "solve" });
            }
            solution.push(val);
        }
        Ok(solution)
    }

    fn invert(&self, a: &dyn Matrix) -> Result<DenseMatrix, SolverError> {
        let n = require_square("invert", a)?;

        let mat = Self::to_faer(a);
        let identity = Mat::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 });
        let lu = PartialPivLu::new(mat.as_ref());
        let sol = lu.solve(&identity);

        let mut inv = DenseMatrix::new(n, n);
        for j in 0..n {
            for i in 0..n {
                let val = sol.read(i, j);
                if !val.is_finite() {
                    return Err(SolverError::NonFinite { op: "invert" });
                }
                if val != 0.0 {
                    inv.set(i, j, val);
                }
            }
        }
        Ok(inv)
    }
}
