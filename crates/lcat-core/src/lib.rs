//! # lcat-core: LCA Matrix Modeling Core
//!
//! Provides the matrix-level data structures for life cycle assessment
//! calculations: index structures that map matrix positions to domain
//! identities, interchangeable matrix storage formats, the assembled
//! matrix container handed to the calculation engine, and the pluggable
//! linear-algebra solver abstraction.
//!
//! ## Design Philosophy
//!
//! A product system is expressed as a linear system in the style of
//! economic input-output analysis:
//!
//! - **Technology matrix `A`** (n×n): technosphere coefficients between
//!   process-product pairs; the diagonal entry of row i is the reference
//!   production amount of pair i.
//! - **Intervention matrix `B`** (m×n): elementary-flow coefficients per
//!   process-product.
//! - **Impact matrix `C`** (k×m, optional): characterization factors per
//!   elementary flow.
//! - **Cost vector** (length n, optional): unscaled net costs per
//!   process-product.
//!
//! The assembly of these matrices from a product-system graph (linking,
//! allocation, parameter resolution) happens outside of this crate; the
//! container arrives here fully built.
//!
//! ## Quick Start
//!
//! ```rust
//! use lcat_core::*;
//!
//! // A two-process system: process 1 produces the reference product and
//! // consumes 0.1 units of process 2's product per unit of output.
//! let ref_flow = TechFlow::new(ProcessId::new(1), FlowId::new(1));
//! let mut tech_index = TechIndex::new(ref_flow);
//! tech_index.add(TechFlow::new(ProcessId::new(2), FlowId::new(2)));
//!
//! let mut a = HashPointMatrix::new(2, 2);
//! a.set(0, 0, 1.0);
//! a.set(1, 0, -0.1);
//! a.set(1, 1, 1.0);
//!
//! let mut flow_index = FlowIndex::new();
//! flow_index.add_output(FlowId::new(100));
//! let mut b = HashPointMatrix::new(1, 2);
//! b.set(0, 0, 2.0);
//! b.set(0, 1, 5.0);
//!
//! let mut data = MatrixData::new(tech_index, flow_index, Box::new(a), Box::new(b));
//! data.validate().unwrap();
//! data.compress(); // hash-point formats become compressed-column
//! ```
//!
//! ## Modules
//!
//! - [`index`] - Bijections between matrix positions and domain identities
//! - [`matrix`] - Dense, nonzero-keyed sparse, and CSC matrix formats
//! - [`data`] - The assembled matrix container
//! - [`uncertainty`] - Distribution descriptors for Monte Carlo resampling
//! - [`solver`] - Linear-algebra capability trait and backends
//! - [`error`] - Unified error type
//!
//! ## ID System
//!
//! Every domain entity is referenced by a newtype ID wrapping `i64`
//! (matching the identifier width of the persistence layer that feeds
//! the assembly stage). IDs enable type safety: a process ID cannot be
//! confused with an elementary-flow ID at a matrix boundary.

use serde::{Deserialize, Serialize};

pub mod data;
pub mod error;
pub mod index;
pub mod matrix;
pub mod solver;
pub mod uncertainty;

pub use data::MatrixData;
pub use error::{LcatError, LcatResult};
pub use index::{FlowIndex, ImpactIndex, TechIndex};
pub use matrix::{dense_of, hash_point_of, CscMatrix, DenseMatrix, HashPointMatrix, Matrix};
pub use solver::{FaerSolver, GaussSolver, MatrixSolver, SolverError, SolverKind};
pub use uncertainty::{Distribution, ParameterTable, UCell, UMatrix};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(i64);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(i64);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactId(i64);

impl ProcessId {
    #[inline]
    pub fn new(value: i64) -> Self {
        ProcessId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FlowId {
    #[inline]
    pub fn new(value: i64) -> Self {
        FlowId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ImpactId {
    #[inline]
    pub fn new(value: i64) -> Self {
        ImpactId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// A provider-flow pair of the technosphere: a process together with the
/// product (or waste flow) it provides. One such pair occupies one row
/// and one column of the technology matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechFlow {
    pub provider: ProcessId,
    pub flow: FlowId,
}

impl TechFlow {
    pub fn new(provider: ProcessId, flow: FlowId) -> Self {
        Self { provider, flow }
    }
}
