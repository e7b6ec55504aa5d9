//! Linear-algebra capability abstraction for the calculation engine.
//!
//! The engine never talks to a numerical library directly; it is handed
//! one [`MatrixSolver`] at construction and uses its four operations
//! (single right-hand-side solve, full inversion, multiplication and
//! in-place column scaling) for everything. Backends are selected once
//! via [`SolverKind`].

pub mod backend;
pub mod registry;

pub use backend::{FaerSolver, GaussSolver, MatrixSolver, SolverError};
pub use registry::SolverKind;
