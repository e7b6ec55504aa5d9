//! Unified error types for the lcat crates
//!
//! This module provides a common error type [`LcatError`] that can
//! represent errors from any part of the system. Domain-specific error
//! types can be converted to `LcatError` for uniform error handling at
//! API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use lcat_core::{LcatError, LcatResult};
//!
//! fn prepare(data: &mut MatrixData) -> LcatResult<()> {
//!     data.validate()?;
//!     data.compress();
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all lcat operations.
///
/// This enum provides a common error representation across the crates,
/// allowing errors from validation, solving, and simulation to be
/// handled uniformly.
#[derive(Error, Debug)]
pub enum LcatError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Structural errors in assembled matrix data
    #[error("Structure error: {0}")]
    Structure(String),

    /// Solver/numerical errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using LcatError.
pub type LcatResult<T> = Result<T, LcatError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for LcatError {
    fn from(err: anyhow::Error) -> Self {
        LcatError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for LcatError {
    fn from(s: String) -> Self {
        LcatError::Other(s)
    }
}

impl From<&str> for LcatError {
    fn from(s: &str) -> Self {
        LcatError::Other(s.to_string())
    }
}

impl From<crate::solver::SolverError> for LcatError {
    fn from(err: crate::solver::SolverError) -> Self {
        LcatError::Solver(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LcatError::Solver("technology matrix is singular".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("singular"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LcatError = io_err.into();
        assert!(matches!(err, LcatError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> LcatResult<()> {
            Err(LcatError::Structure("test".into()))
        }

        fn outer() -> LcatResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
