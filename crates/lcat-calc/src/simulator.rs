//! Monte Carlo simulation over the uncertainty descriptors of a
//! matrix container.
//!
//! Each iteration redraws the described matrix entries in place and
//! runs one total-only calculation; the container is owned by the
//! simulator, so concurrent simulations each need their own clone.
//! Named parameters are drawn once per iteration into a shared context,
//! so every cell referencing the same parameter sees the same value
//! within a pass.

use crate::calculator::{CalcError, LcaCalculator};
use crate::results::SimpleResult;
use lcat_core::matrix::Matrix;
use lcat_core::solver::MatrixSolver;
use lcat_core::uncertainty::{Distribution, ParameterTable, UMatrix};
use lcat_core::{FlowId, FlowIndex, ImpactId, ImpactIndex, MatrixData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution as Sampler, LogNormal, Normal, Triangular};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("invalid distribution for {context}: {detail}")]
    InvalidDistribution { context: String, detail: String },

    #[error("cell references unknown parameter '{0}'")]
    UnknownParameter(String),
}

/// Streaming summary statistics of one output position, updated per
/// iteration without storing the individual draws (Welford's method
/// for mean and variance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningStat {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStat {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Empirical mean; 0 before the first value.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Unbiased sample variance; 0 with fewer than two values.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Aggregated outcome of a simulation: one [`RunningStat`] per total
/// flow and (when an impact method is attached) per impact category.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub flow_index: FlowIndex,
    pub impact_index: Option<ImpactIndex>,
    flow_stats: Vec<RunningStat>,
    impact_stats: Option<Vec<RunningStat>>,
    runs: usize,
}

impl SimulationResult {
    fn new(flow_index: FlowIndex, impact_index: Option<ImpactIndex>) -> Self {
        let flow_stats = vec![RunningStat::new(); flow_index.len()];
        let impact_stats = impact_index
            .as_ref()
            .map(|index| vec![RunningStat::new(); index.len()]);
        Self {
            flow_index,
            impact_index,
            flow_stats,
            impact_stats,
            runs: 0,
        }
    }

    fn append(&mut self, result: &SimpleResult) {
        self.runs += 1;
        for (stat, value) in self.flow_stats.iter_mut().zip(&result.total_flows) {
            stat.push(*value);
        }
        if let (Some(stats), Some(values)) = (&mut self.impact_stats, &result.total_impacts) {
            for (stat, value) in stats.iter_mut().zip(values) {
                stat.push(*value);
            }
        }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn flow_stats(&self) -> &[RunningStat] {
        &self.flow_stats
    }

    pub fn impact_stats(&self) -> Option<&[RunningStat]> {
        self.impact_stats.as_deref()
    }

    pub fn flow_stat_of(&self, flow: &FlowId) -> Option<&RunningStat> {
        let pos = self.flow_index.position_of(flow)?;
        self.flow_stats.get(pos)
    }

    pub fn impact_stat_of(&self, impact: &ImpactId) -> Option<&RunningStat> {
        let pos = self.impact_index.as_ref()?.position_of(impact)?;
        self.impact_stats.as_ref()?.get(pos)
    }
}

/// Monte Carlo driver around one matrix container.
pub struct Simulator {
    data: MatrixData,
    solver: Arc<dyn MatrixSolver>,
    parameters: ParameterTable,
    rng: StdRng,
}

impl Simulator {
    pub fn new(data: MatrixData, solver: Arc<dyn MatrixSolver>) -> Self {
        Self {
            data,
            solver,
            parameters: ParameterTable::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Attach the shared parameter table drawn once per iteration.
    pub fn with_parameters(mut self, parameters: ParameterTable) -> Self {
        self.parameters = parameters;
        self
    }

    /// Fixed seed for reproducible simulations.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The container in its current (last-resampled) state.
    pub fn data(&self) -> &MatrixData {
        &self.data
    }

    /// Resample every described matrix entry and run one total-only
    /// calculation.
    pub fn next_run(&mut self) -> Result<SimpleResult, SimulationError> {
        self.resample()?;
        let calculator = LcaCalculator::new(self.solver.as_ref(), &self.data);
        Ok(calculator.calculate_simple()?)
    }

    /// Run `iterations` passes and aggregate the totals.
    pub fn run(&mut self, iterations: usize) -> Result<SimulationResult, SimulationError> {
        tracing::debug!(iterations, "starting simulation");
        let mut result =
            SimulationResult::new(self.data.flow_index.clone(), self.data.impact_index.clone());
        for _ in 0..iterations {
            let run = self.next_run()?;
            result.append(&run);
        }
        Ok(result)
    }

    fn resample(&mut self) -> Result<(), SimulationError> {
        let mut context: HashMap<String, f64> = HashMap::new();
        for (name, distribution) in self.parameters.iter() {
            // parameters may reference earlier table entries
            let value = draw(distribution, &mut self.rng, &context)
                .map_err(|err| rename_context(err, &format!("parameter '{}'", name)))?;
            context.insert(name.to_string(), value);
        }

        let data = &mut self.data;
        resample_matrix(
            data.tech_matrix.as_mut(),
            data.tech_uncertainties.as_ref(),
            "technology matrix",
            &mut self.rng,
            &context,
        )?;
        resample_matrix(
            data.flow_matrix.as_mut(),
            data.flow_uncertainties.as_ref(),
            "intervention matrix",
            &mut self.rng,
            &context,
        )?;
        if let Some(matrix) = &mut data.impact_matrix {
            resample_matrix(
                matrix.as_mut(),
                data.impact_uncertainties.as_ref(),
                "impact matrix",
                &mut self.rng,
                &context,
            )?;
        }
        Ok(())
    }
}

fn resample_matrix(
    matrix: &mut dyn Matrix,
    cells: Option<&UMatrix>,
    context_name: &str,
    rng: &mut StdRng,
    context: &HashMap<String, f64>,
) -> Result<(), SimulationError> {
    let Some(cells) = cells else {
        return Ok(());
    };
    for cell in cells.cells() {
        let value = draw(&cell.distribution, rng, context).map_err(|err| {
            rename_context(
                err,
                &format!("{} cell ({}, {})", context_name, cell.row, cell.col),
            )
        })?;
        matrix.set(cell.row, cell.col, value);
    }
    Ok(())
}

fn rename_context(err: SimulationError, context: &str) -> SimulationError {
    match err {
        SimulationError::InvalidDistribution { detail, .. } => {
            SimulationError::InvalidDistribution {
                context: context.to_string(),
                detail,
            }
        }
        other => other,
    }
}

fn invalid(detail: impl Into<String>) -> SimulationError {
    SimulationError::InvalidDistribution {
        context: String::new(),
        detail: detail.into(),
    }
}

/// Draw one value. Degenerate distributions (zero spread) return their
/// point value exactly, with no generator call.
fn draw(
    distribution: &Distribution,
    rng: &mut StdRng,
    context: &HashMap<String, f64>,
) -> Result<f64, SimulationError> {
    match distribution {
        Distribution::Constant(value) => Ok(*value),

        Distribution::Normal { mean, sd } => {
            // rand_distr accepts negative standard deviations, so the
            // descriptor check has to happen here
            if *sd < 0.0 {
                return Err(invalid(format!("normal with sd {}", sd)));
            }
            if *sd == 0.0 {
                return Ok(*mean);
            }
            let normal = Normal::new(*mean, *sd)
                .map_err(|_| invalid(format!("normal with sd {}", sd)))?;
            Ok(normal.sample(rng))
        }

        Distribution::LogNormal { geo_mean, geo_sd } => {
            if *geo_mean <= 0.0 || *geo_sd < 1.0 {
                return Err(invalid(format!(
                    "log-normal with geometric mean {} and geometric sd {}",
                    geo_mean, geo_sd
                )));
            }
            if *geo_sd == 1.0 {
                return Ok(*geo_mean);
            }
            let log_normal = LogNormal::new(geo_mean.ln(), geo_sd.ln())
                .map_err(|_| invalid(format!("log-normal with geometric sd {}", geo_sd)))?;
            Ok(log_normal.sample(rng))
        }

        Distribution::Triangle { min, mode, max } => {
            if min == max {
                return Ok(*min);
            }
            let triangular = Triangular::new(*min, *max, *mode).map_err(|_| {
                invalid(format!("triangle with min {}, mode {}, max {}", min, mode, max))
            })?;
            Ok(triangular.sample(rng))
        }

        Distribution::Uniform { min, max } => {
            if min == max {
                return Ok(*min);
            }
            if min > max {
                return Err(invalid(format!("uniform with min {} > max {}", min, max)));
            }
            Ok(rng.gen_range(*min..*max))
        }

        Distribution::Parameter { name } => context
            .get(name)
            .copied()
            .ok_or_else(|| SimulationError::UnknownParameter(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcat_core::matrix::HashPointMatrix;
    use lcat_core::uncertainty::UCell;
    use lcat_core::{ProcessId, SolverKind, TechFlow, TechIndex};

    fn two_process_data() -> MatrixData {
        let mut tech_index = TechIndex::new(TechFlow::new(ProcessId::new(1), FlowId::new(1)));
        tech_index.add(TechFlow::new(ProcessId::new(2), FlowId::new(2)));

        let mut a = HashPointMatrix::new(2, 2);
        a.set(0, 0, 1.0);
        a.set(1, 0, -0.2);
        a.set(1, 1, 1.0);

        let mut flow_index = FlowIndex::new();
        flow_index.add_output(FlowId::new(100));
        let mut b = HashPointMatrix::new(1, 2);
        b.set(0, 0, 2.0);
        b.set(0, 1, 3.0);

        MatrixData::new(tech_index, flow_index, Box::new(a), Box::new(b))
    }

    fn simulator(data: MatrixData, seed: u64) -> Simulator {
        Simulator::new(data, SolverKind::Faer.build_solver()).with_seed(seed)
    }

    #[test]
    fn test_constant_cells_give_identical_runs() {
        let mut data = two_process_data();
        let mut u = UMatrix::new();
        u.add(UCell::new(1, 0, Distribution::Constant(-0.2)));
        data.tech_uncertainties = Some(u);

        let mut sim = simulator(data, 7);
        let first = sim.next_run().unwrap();
        let second = sim.next_run().unwrap();
        assert_eq!(first.total_flows, second.total_flows);
        assert_eq!(first.scaling, second.scaling);
    }

    #[test]
    fn test_uniform_draws_stay_in_bounds() {
        let mut data = two_process_data();
        let mut u = UMatrix::new();
        u.add(UCell::new(0, 1, Distribution::Uniform { min: 2.5, max: 3.5 }));
        data.flow_uncertainties = Some(u);

        let mut sim = simulator(data, 11);
        for _ in 0..50 {
            sim.next_run().unwrap();
            let drawn = sim.data().flow_matrix.get(0, 1);
            assert!((2.5..3.5).contains(&drawn), "drew {}", drawn);
        }
    }

    #[test]
    fn test_parameter_cells_share_one_draw_per_pass() {
        let mut data = two_process_data();
        let mut u = UMatrix::new();
        u.add(UCell::new(0, 0, Distribution::Parameter { name: "amount".into() }));
        u.add(UCell::new(0, 1, Distribution::Parameter { name: "amount".into() }));
        data.flow_uncertainties = Some(u);

        let mut parameters = ParameterTable::new();
        parameters.add("amount", Distribution::Uniform { min: 1.0, max: 2.0 });

        let mut sim = simulator(data, 3).with_parameters(parameters);
        let mut previous = None;
        for _ in 0..10 {
            sim.next_run().unwrap();
            let a = sim.data().flow_matrix.get(0, 0);
            let b = sim.data().flow_matrix.get(0, 1);
            assert_eq!(a, b);
            // and it is redrawn across passes
            if let Some(previous) = previous {
                assert_ne!(a, previous);
            }
            previous = Some(a);
        }
    }

    #[test]
    fn test_negative_sd_aborts_the_run() {
        // a negative standard deviation must never sample silently
        let mut data = two_process_data();
        let mut u = UMatrix::new();
        u.add(UCell::new(
            1,
            0,
            Distribution::Normal { mean: -0.2, sd: -1.0 },
        ));
        data.tech_uncertainties = Some(u);

        let mut sim = simulator(data, 1);
        let err = sim.next_run().unwrap_err();
        assert!(matches!(err, SimulationError::InvalidDistribution { .. }));
        assert!(err.to_string().contains("technology matrix cell (1, 0)"));
    }

    #[test]
    fn test_unknown_parameter_is_an_error() {
        let mut data = two_process_data();
        let mut u = UMatrix::new();
        u.add(UCell::new(0, 0, Distribution::Parameter { name: "missing".into() }));
        data.flow_uncertainties = Some(u);

        let mut sim = simulator(data, 1);
        let err = sim.next_run().unwrap_err();
        assert!(matches!(err, SimulationError::UnknownParameter(name) if name == "missing"));
    }

    #[test]
    fn test_seeded_simulations_are_reproducible() {
        let make = || {
            let mut data = two_process_data();
            let mut u = UMatrix::new();
            u.add(UCell::new(
                1,
                0,
                Distribution::Normal { mean: -0.2, sd: 0.05 },
            ));
            data.tech_uncertainties = Some(u);
            simulator(data, 42)
        };
        let first = make().run(20).unwrap();
        let second = make().run(20).unwrap();
        assert_eq!(first.runs(), 20);
        assert_eq!(first.flow_stats()[0].mean(), second.flow_stats()[0].mean());
        assert_eq!(first.flow_stats()[0].min(), second.flow_stats()[0].min());
        assert_eq!(first.flow_stats()[0].max(), second.flow_stats()[0].max());
    }

    #[test]
    fn test_zero_variance_statistics_collapse() {
        let data = two_process_data();
        let mut sim = simulator(data, 5);
        let result = sim.run(8).unwrap();
        let stat = result.flow_stat_of(&FlowId::new(100)).unwrap();
        assert_eq!(stat.count(), 8);
        assert_eq!(stat.min(), stat.max());
        assert_eq!(stat.variance(), 0.0);
    }

    #[test]
    fn test_degenerate_distributions_return_point_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let context = HashMap::new();
        let cases = [
            (Distribution::Normal { mean: 4.0, sd: 0.0 }, 4.0),
            (
                Distribution::LogNormal { geo_mean: 2.0, geo_sd: 1.0 },
                2.0,
            ),
            (
                Distribution::Triangle { min: 3.0, mode: 3.0, max: 3.0 },
                3.0,
            ),
            (Distribution::Uniform { min: 1.5, max: 1.5 }, 1.5),
        ];
        for (distribution, expected) in cases {
            assert_eq!(draw(&distribution, &mut rng, &context).unwrap(), expected);
        }
    }

    #[test]
    fn test_invalid_distributions_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let context = HashMap::new();
        let cases = [
            Distribution::Normal { mean: 0.0, sd: -1.0 },
            Distribution::LogNormal { geo_mean: -1.0, geo_sd: 2.0 },
            Distribution::LogNormal { geo_mean: 1.0, geo_sd: 0.5 },
            Distribution::Uniform { min: 2.0, max: 1.0 },
            Distribution::Triangle { min: 0.0, mode: 5.0, max: 1.0 },
        ];
        for distribution in cases {
            assert!(draw(&distribution, &mut rng, &context).is_err());
        }
    }

    #[test]
    fn test_running_stat_welford() {
        let mut stat = RunningStat::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stat.push(v);
        }
        assert_eq!(stat.count(), 8);
        assert!((stat.mean() - 5.0).abs() < 1e-12);
        assert_eq!(stat.min(), 2.0);
        assert_eq!(stat.max(), 9.0);
        // population variance of this classic set is 4; the unbiased
        // sample variance is 32/7
        assert!((stat.variance() - 32.0 / 7.0).abs() < 1e-12);
    }
}
