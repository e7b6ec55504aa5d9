use super::backend::{FaerSolver, GaussSolver, MatrixSolver};
use crate::error::{LcatError, LcatResult};
use std::sync::Arc;

/// Simple registry of available solver backends.
///
/// The backend is chosen once here and injected into the calculation
/// engine; nothing downstream inspects which implementation it got.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverKind {
    Gauss,
    Faer,
}

impl Default for SolverKind {
    fn default() -> Self {
        SolverKind::Faer
    }
}

impl SolverKind {
    pub fn from_str(input: &str) -> LcatResult<Self> {
        match input.to_ascii_lowercase().as_str() {
            "gauss" => Ok(SolverKind::Gauss),
            "faer" | "default" => Ok(SolverKind::Faer),
            other => Err(LcatError::Parse(format!(
                "unknown solver '{}'; supported values: gauss, faer",
                other
            ))),
        }
    }

    pub fn build_solver(self) -> Arc<dyn MatrixSolver> {
        match self {
            SolverKind::Gauss => Arc::new(GaussSolver),
            SolverKind::Faer => Arc::new(FaerSolver),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["gauss", "faer"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Gauss => "gauss",
            SolverKind::Faer => "faer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DenseMatrix;

    #[test]
    fn solver_kind_parsing_supports_all_engines() {
        assert_eq!(SolverKind::from_str("gauss").unwrap(), SolverKind::Gauss);
        assert_eq!(SolverKind::from_str("faer").unwrap(), SolverKind::Faer);
        assert_eq!(SolverKind::from_str("default").unwrap(), SolverKind::Faer);
        assert!(SolverKind::from_str("unknown").is_err());
    }

    #[test]
    fn built_solvers_solve_a_diagonal_system() {
        let a = DenseMatrix::diagonal(2, 2.0);
        for kind in [SolverKind::Gauss, SolverKind::Faer] {
            let solver = kind.build_solver();
            let s = solver.solve(&a, 0, 4.0).unwrap();
            assert_eq!(s, vec![2.0, 0.0]);
        }
    }
}
