//! Result value objects of the three calculation levels.
//!
//! Each result embeds the indices it was calculated with, so positions
//! can always be resolved back to domain identities without the
//! original container. Results are immutable once produced and owned
//! by the caller; the levels escalate by embedding (a full result *is*
//! a contribution result plus upstream decomposition).

use lcat_core::matrix::{DenseMatrix, Matrix};
use lcat_core::{FlowId, FlowIndex, ImpactId, ImpactIndex, TechFlow, TechIndex};
use serde::{Deserialize, Serialize};

/// The total-only result of a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleResult {
    pub tech_index: TechIndex,
    pub flow_index: FlowIndex,
    pub impact_index: Option<ImpactIndex>,

    /// Activity level required of every provider-flow pair to satisfy
    /// the demand.
    pub scaling: Vec<f64>,

    /// `scaling[i] · A[i,i]`: the total produced amount per pair.
    pub total_requirements: Vec<f64>,

    /// Total inventory: amount per elementary flow.
    pub total_flows: Vec<f64>,

    /// Total impact assessment result, when an impact matrix was
    /// present.
    pub total_impacts: Option<Vec<f64>>,

    /// Total net costs, when a cost vector was present.
    pub total_cost: Option<f64>,
}

impl SimpleResult {
    pub fn has_impact_results(&self) -> bool {
        self.total_impacts.is_some()
    }

    pub fn has_cost_results(&self) -> bool {
        self.total_cost.is_some()
    }

    /// Total inventory amount of the given elementary flow.
    pub fn total_flow_of(&self, flow: &FlowId) -> Option<f64> {
        let pos = self.flow_index.position_of(flow)?;
        self.total_flows.get(pos).copied()
    }

    /// Total result of the given impact category.
    pub fn total_impact_of(&self, impact: &ImpactId) -> Option<f64> {
        let pos = self.impact_index.as_ref()?.position_of(impact)?;
        self.total_impacts.as_ref()?.get(pos).copied()
    }

    /// Scaling factor of the given provider-flow pair.
    pub fn scaling_of(&self, tech_flow: &TechFlow) -> Option<f64> {
        let pos = self.tech_index.position_of(tech_flow)?;
        self.scaling.get(pos).copied()
    }
}

/// Total-only result plus per-process direct contributions.
#[derive(Debug)]
pub struct ContributionResult {
    /// The embedded total-only core.
    pub totals: SimpleResult,

    /// Intervention matrix with columns scaled to the computed activity
    /// levels: column i is process i's direct elementary-flow
    /// contribution.
    pub single_flows: Box<dyn Matrix>,

    /// Direct impact contribution per process: `C · single_flows`.
    pub single_impacts: Option<DenseMatrix>,

    /// Characterization factors scaled by the total flow amounts: a
    /// profile per total-flow amount, not per process.
    pub single_flow_impacts: Option<Box<dyn Matrix>>,

    /// Direct net cost per process: `cv[i] · scaling[i]`.
    pub single_costs: Option<Vec<f64>>,
}

impl ContributionResult {
    /// Direct contribution of one process to one elementary flow.
    pub fn single_flow_of(&self, flow: &FlowId, tech_flow: &TechFlow) -> Option<f64> {
        let row = self.totals.flow_index.position_of(flow)?;
        let col = self.totals.tech_index.position_of(tech_flow)?;
        Some(self.single_flows.get(row, col))
    }

    /// Direct contribution of one process to one impact category.
    pub fn single_impact_of(&self, impact: &ImpactId, tech_flow: &TechFlow) -> Option<f64> {
        let row = self.totals.impact_index.as_ref()?.position_of(impact)?;
        let col = self.totals.tech_index.position_of(tech_flow)?;
        Some(self.single_impacts.as_ref()?.get(row, col))
    }

    /// Direct net cost of one process.
    pub fn single_cost_of(&self, tech_flow: &TechFlow) -> Option<f64> {
        let pos = self.totals.tech_index.position_of(tech_flow)?;
        self.single_costs.as_ref()?.get(pos).copied()
    }
}

/// Contribution result plus the full upstream decomposition.
#[derive(Debug)]
pub struct FullResult {
    /// The embedded contribution core.
    pub contributions: ContributionResult,

    /// Technology matrix with columns scaled to the activity levels.
    pub scaled_tech: Box<dyn Matrix>,

    /// Column i is the cumulative (direct plus all upstream)
    /// elementary-flow result of driving process i to its total
    /// required activity.
    pub upstream_flows: DenseMatrix,

    /// Cumulative impact results per process: `C · upstream_flows`.
    pub upstream_impacts: Option<DenseMatrix>,

    /// Cumulative net costs per process as a 1×n matrix.
    pub upstream_costs: Option<DenseMatrix>,
}

impl FullResult {
    pub fn totals(&self) -> &SimpleResult {
        &self.contributions.totals
    }

    /// Cumulative result of one process for one elementary flow.
    pub fn upstream_flow_of(&self, flow: &FlowId, tech_flow: &TechFlow) -> Option<f64> {
        let row = self.totals().flow_index.position_of(flow)?;
        let col = self.totals().tech_index.position_of(tech_flow)?;
        Some(self.upstream_flows.get(row, col))
    }

    /// Cumulative result of one process for one impact category.
    pub fn upstream_impact_of(&self, impact: &ImpactId, tech_flow: &TechFlow) -> Option<f64> {
        let row = self.totals().impact_index.as_ref()?.position_of(impact)?;
        let col = self.totals().tech_index.position_of(tech_flow)?;
        Some(self.upstream_impacts.as_ref()?.get(row, col))
    }

    /// Cumulative net cost of one process.
    pub fn upstream_cost_of(&self, tech_flow: &TechFlow) -> Option<f64> {
        let col = self.totals().tech_index.position_of(tech_flow)?;
        Some(self.upstream_costs.as_ref()?.get(0, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcat_core::ProcessId;

    #[test]
    fn test_simple_result_accessors() {
        let mut tech_index = TechIndex::new(TechFlow::new(ProcessId::new(1), FlowId::new(1)));
        tech_index.add(TechFlow::new(ProcessId::new(2), FlowId::new(2)));
        let mut flow_index = FlowIndex::new();
        flow_index.add_output(FlowId::new(100));

        let result = SimpleResult {
            tech_index,
            flow_index,
            impact_index: None,
            scaling: vec![1.0, 0.5],
            total_requirements: vec![1.0, 0.5],
            total_flows: vec![4.2],
            total_impacts: None,
            total_cost: None,
        };

        assert_eq!(result.total_flow_of(&FlowId::new(100)), Some(4.2));
        assert_eq!(result.total_flow_of(&FlowId::new(999)), None);
        assert_eq!(
            result.scaling_of(&TechFlow::new(ProcessId::new(2), FlowId::new(2))),
            Some(0.5)
        );
        assert!(!result.has_impact_results());
        assert_eq!(result.total_impact_of(&ImpactId::new(1)), None);
    }

    #[test]
    fn test_results_are_debug_formattable() {
        // results end up in assertions and log output; the trait-object
        // matrix fields must not break Debug
        let totals = SimpleResult {
            tech_index: TechIndex::new(TechFlow::new(ProcessId::new(1), FlowId::new(1))),
            flow_index: FlowIndex::new(),
            impact_index: None,
            scaling: vec![1.0],
            total_requirements: vec![1.0],
            total_flows: vec![],
            total_impacts: None,
            total_cost: None,
        };
        let contributions = ContributionResult {
            totals,
            single_flows: Box::new(DenseMatrix::new(0, 1)),
            single_impacts: None,
            single_flow_impacts: None,
            single_costs: None,
        };
        let full = FullResult {
            contributions,
            scaled_tech: Box::new(DenseMatrix::diagonal(1, 1.0)),
            upstream_flows: DenseMatrix::new(0, 1),
            upstream_impacts: None,
            upstream_costs: None,
        };
        let formatted = format!("{:?}", full);
        assert!(formatted.contains("upstream_flows"));
    }

    #[test]
    fn test_simple_result_serializes() {
        let result = SimpleResult {
            tech_index: TechIndex::new(TechFlow::new(ProcessId::new(1), FlowId::new(1))),
            flow_index: FlowIndex::new(),
            impact_index: None,
            scaling: vec![1.0],
            total_requirements: vec![1.0],
            total_flows: vec![],
            total_impacts: None,
            total_cost: Some(12.5),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: SimpleResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_cost, Some(12.5));
        assert_eq!(back.scaling, vec![1.0]);
    }
}
