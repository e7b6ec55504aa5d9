//! # lcat-calc: LCA Calculation Engine
//!
//! Turns an assembled [`MatrixData`](lcat_core::MatrixData) container
//! into calculation results, at three escalating levels of detail:
//!
//! | Level | Entry point | Adds |
//! |-------|-------------|------|
//! | Total-only | [`LcaCalculator::calculate_simple`] | scaling vector, total requirements, total flows/impacts/costs |
//! | Contribution | [`LcaCalculator::calculate_contributions`] | per-process direct contributions |
//! | Full | [`LcaCalculator::calculate_full`] | Leontief inverse, upstream-decomposed results |
//!
//! The total-only and contribution levels go through a single
//! right-hand-side solve and never materialize an inverse; the full
//! level pays for the inverse once and derives every upstream result
//! from it.
//!
//! ## Monte Carlo
//!
//! [`Simulator`] pairs the container's uncertainty descriptors with a
//! seedable random number generator: each iteration redraws the
//! described matrix entries in place and runs one total-only
//! calculation. The empirical distribution of the outputs is collected
//! in a [`SimulationResult`].
//!
//! ## Example
//!
//! ```ignore
//! use lcat_calc::LcaCalculator;
//! use lcat_core::SolverKind;
//!
//! let solver = SolverKind::default().build_solver();
//! let result = LcaCalculator::new(solver.as_ref(), &data).calculate_simple()?;
//! println!("total flows: {:?}", result.total_flows);
//! ```

pub mod calculator;
pub mod results;
pub mod simulator;

pub use calculator::{CalcError, LcaCalculator};
pub use results::{ContributionResult, FullResult, SimpleResult};
pub use simulator::{RunningStat, SimulationError, SimulationResult, Simulator};
