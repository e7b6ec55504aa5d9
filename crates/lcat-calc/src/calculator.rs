//! The calculation engine: total-only, contribution, and full results.

use crate::results::{ContributionResult, FullResult, SimpleResult};
use lcat_core::matrix::{DenseMatrix, Matrix};
use lcat_core::solver::{MatrixSolver, SolverError};
use lcat_core::{LcatError, MatrixData};
use thiserror::Error;
use tracing::debug;

/// Threshold below which the total requirement at the reference
/// position is considered equal to the demand (no self-loop
/// correction needed).
const SELF_LOOP_EPS: f64 = 1e-9;

/// Errors of a calculation run.
///
/// Any error here is fatal for the whole calculation: no partial
/// result object is ever returned.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Structural defects of the assembled data, detected before any
    /// solver call.
    #[error("invalid matrix data: {0}")]
    Structure(String),

    /// A numerical failure in the injected solver backend.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// The reference process produces a total requirement of ~0 while a
    /// nonzero demand was requested; the system scale is undefined.
    #[error(
        "total requirement at the reference position is ~0 for a demand of {demand}; \
         the self-loop correction factor is undefined"
    )]
    DegenerateReference { demand: f64 },

    /// A computed vector contains NaN or infinity. Non-finite values
    /// never propagate silently into a result.
    #[error("{what} contains non-finite values")]
    NonFinite { what: &'static str },
}

impl From<LcatError> for CalcError {
    fn from(err: LcatError) -> Self {
        CalcError::Structure(err.to_string())
    }
}

/// Stateless calculation engine over an injected solver backend and one
/// assembled matrix container.
///
/// The engine holds only shared references; independent containers can
/// be calculated concurrently with no shared mutable state.
pub struct LcaCalculator<'a> {
    solver: &'a dyn MatrixSolver,
    data: &'a MatrixData,
}

impl<'a> LcaCalculator<'a> {
    pub fn new(solver: &'a dyn MatrixSolver, data: &'a MatrixData) -> Self {
        Self { solver, data }
    }

    /// Total-only result: one solve, no inverse.
    pub fn calculate_simple(&self) -> Result<SimpleResult, CalcError> {
        self.data.validate()?;
        let tech = &*self.data.tech_matrix;
        let ref_idx = self.data.tech_index.ref_position();
        let demand = self.data.tech_index.demand();
        debug!(n = self.data.tech_index.len(), demand, "total-only calculation");

        let scaling = self.solver.solve(tech, ref_idx, demand)?;
        ensure_finite("scaling vector", &scaling)?;

        self.simple_from_scaling(scaling)
    }

    /// Total-only result plus per-process direct contributions.
    pub fn calculate_contributions(&self) -> Result<ContributionResult, CalcError> {
        self.data.validate()?;
        let tech = &*self.data.tech_matrix;
        let ref_idx = self.data.tech_index.ref_position();
        let demand = self.data.tech_index.demand();
        debug!(n = self.data.tech_index.len(), demand, "contribution calculation");

        let scaling = self.solver.solve(tech, ref_idx, demand)?;
        ensure_finite("scaling vector", &scaling)?;

        let totals = self.simple_from_scaling(scaling)?;
        self.contributions_from_totals(totals)
    }

    /// Full result with the complete upstream decomposition. The most
    /// expensive level: materializes the Leontief inverse.
    pub fn calculate_full(&self) -> Result<FullResult, CalcError> {
        self.data.validate()?;
        let tech = &*self.data.tech_matrix;
        let flows = &*self.data.flow_matrix;
        let ref_idx = self.data.tech_index.ref_position();
        let demand = self.data.tech_index.demand();
        debug!(n = self.data.tech_index.len(), demand, "full calculation");

        let inverse = self.solver.invert(tech)?;

        // the scaling vector is the reference column of the inverse
        // scaled by the demand; equivalent to a single solve but the
        // inverse is reused for every upstream result below
        let mut scaling = inverse.column(ref_idx);
        for s in &mut scaling {
            *s *= demand;
        }
        ensure_finite("scaling vector", &scaling)?;

        let total_requirements = self.total_requirements(&scaling);
        let real_demands = self.real_demands(&total_requirements)?;

        let mut scaled_tech = tech.copy();
        self.solver.scale_columns(scaled_tech.as_mut(), &scaling)?;

        let mut upstream_flows = self.solver.multiply(flows, &inverse)?;
        self.solver.scale_columns(&mut upstream_flows, &real_demands)?;
        // the grand total is the reference product's own upstream
        // result; no separate computation
        let total_flows = upstream_flows.column(ref_idx);
        ensure_finite("total flow results", &total_flows)?;

        let mut upstream_impacts = None;
        let mut total_impacts = None;
        if let Some(impacts) = &self.data.impact_matrix {
            let upstream = self.solver.multiply(impacts.as_ref(), &upstream_flows)?;
            total_impacts = Some(upstream.column(ref_idx));
            upstream_impacts = Some(upstream);
        }

        let mut upstream_costs = None;
        let mut total_cost = None;
        if let Some(costs) = &self.data.cost_vector {
            let cost_row = DenseMatrix::from_rows(&[costs.clone()]);
            let mut upstream = self.solver.multiply(&cost_row, &inverse)?;
            self.solver.scale_columns(&mut upstream, &real_demands)?;
            total_cost = Some(upstream.get(0, ref_idx));
            upstream_costs = Some(upstream);
        }

        let totals = self.assemble_simple(scaling, total_requirements, total_flows, total_impacts, total_cost);
        let contributions = self.contributions_from_totals(totals)?;

        Ok(FullResult {
            contributions,
            scaled_tech,
            upstream_flows,
            upstream_impacts,
            upstream_costs,
        })
    }

    /// `tr[i] = s[i] · A[i,i]`: the diagonal holds the reference
    /// production amount per provider-flow pair.
    fn total_requirements(&self, scaling: &[f64]) -> Vec<f64> {
        let tech = &*self.data.tech_matrix;
        scaling
            .iter()
            .enumerate()
            .map(|(i, s)| s * tech.get(i, i))
            .collect()
    }

    /// The per-process demand vector that drives upstream aggregation.
    ///
    /// When the reference process partially consumes its own output,
    /// `tr[ref]` differs from the requested demand; the whole vector is
    /// then rescaled so the reference position matches the demand
    /// exactly.
    fn real_demands(&self, total_requirements: &[f64]) -> Result<Vec<f64>, CalcError> {
        let ref_idx = self.data.tech_index.ref_position();
        let demand = self.data.tech_index.demand();
        let tr_ref = total_requirements[ref_idx];

        if (tr_ref - demand).abs() <= SELF_LOOP_EPS {
            return Ok(total_requirements.to_vec());
        }
        if tr_ref.abs() <= SELF_LOOP_EPS {
            return Err(CalcError::DegenerateReference { demand });
        }

        // self-loop correction for the total result scale
        let factor = demand / tr_ref;
        debug!(factor, "applying self-loop correction");
        Ok(total_requirements.iter().map(|tr| factor * tr).collect())
    }

    fn simple_from_scaling(&self, scaling: Vec<f64>) -> Result<SimpleResult, CalcError> {
        let flows = &*self.data.flow_matrix;
        let total_requirements = self.total_requirements(&scaling);
        let total_flows = self.solver.multiply_vec(flows, &scaling)?;
        ensure_finite("total flow results", &total_flows)?;

        let total_impacts = match &self.data.impact_matrix {
            Some(impacts) => Some(self.solver.multiply_vec(impacts.as_ref(), &total_flows)?),
            None => None,
        };

        let total_cost = self
            .data
            .cost_vector
            .as_ref()
            .map(|costs| scaling.iter().zip(costs).map(|(s, c)| s * c).sum());

        Ok(self.assemble_simple(scaling, total_requirements, total_flows, total_impacts, total_cost))
    }

    fn assemble_simple(
        &self,
        scaling: Vec<f64>,
        total_requirements: Vec<f64>,
        total_flows: Vec<f64>,
        total_impacts: Option<Vec<f64>>,
        total_cost: Option<f64>,
    ) -> SimpleResult {
        SimpleResult {
            tech_index: self.data.tech_index.clone(),
            flow_index: self.data.flow_index.clone(),
            impact_index: self.data.impact_index.clone(),
            scaling,
            total_requirements,
            total_flows,
            total_impacts,
            total_cost,
        }
    }

    fn contributions_from_totals(
        &self,
        totals: SimpleResult,
    ) -> Result<ContributionResult, CalcError> {
        let mut single_flows = self.data.flow_matrix.copy();
        self.solver
            .scale_columns(single_flows.as_mut(), &totals.scaling)?;

        let mut single_impacts = None;
        let mut single_flow_impacts = None;
        if let Some(impacts) = &self.data.impact_matrix {
            single_impacts = Some(self.solver.multiply(impacts.as_ref(), single_flows.as_ref())?);
            let mut per_flow = impacts.copy();
            self.solver
                .scale_columns(per_flow.as_mut(), &totals.total_flows)?;
            single_flow_impacts = Some(per_flow);
        }

        let single_costs = self.data.cost_vector.as_ref().map(|costs| {
            costs
                .iter()
                .zip(&totals.scaling)
                .map(|(c, s)| c * s)
                .collect()
        });

        Ok(ContributionResult {
            totals,
            single_flows,
            single_impacts,
            single_flow_impacts,
            single_costs,
        })
    }
}

fn ensure_finite(what: &'static str, values: &[f64]) -> Result<(), CalcError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CalcError::NonFinite { what });
    }
    Ok(())
}
