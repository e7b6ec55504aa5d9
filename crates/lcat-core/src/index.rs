//! Index structures: bijections between matrix positions and domain
//! identities.
//!
//! Every matrix of the assembled system is addressed through one of
//! these indices:
//!
//! - [`TechIndex`]: rows and columns of the technology matrix, and
//!   columns of the intervention matrix
//! - [`FlowIndex`]: rows of the intervention matrix, columns of the
//!   impact matrix
//! - [`ImpactIndex`]: rows of the impact matrix
//!
//! Positions are dense `0..len`, assigned in insertion order.

use crate::{FlowId, ImpactId, TechFlow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Ordered bijection between matrix positions and provider-flow pairs
/// of the technosphere.
///
/// The index is created from the reference pair of the product system,
/// which always occupies position 0. It also carries the demanded
/// output amount of that reference pair; the calculation scales the
/// whole system so that the reference position produces exactly this
/// amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TechIndexRepr", into = "TechIndexRepr")]
pub struct TechIndex {
    flows: Vec<TechFlow>,
    positions: HashMap<TechFlow, usize>,
    demand: f64,
}

/// Serialized form: the position maps are derived from insertion order
/// and rebuilt on deserialization.
#[derive(Serialize, Deserialize)]
struct TechIndexRepr {
    flows: Vec<TechFlow>,
    demand: f64,
}

impl From<TechIndexRepr> for TechIndex {
    fn from(repr: TechIndexRepr) -> Self {
        let positions = repr
            .flows
            .iter()
            .enumerate()
            .map(|(pos, flow)| (*flow, pos))
            .collect();
        Self {
            flows: repr.flows,
            positions,
            demand: repr.demand,
        }
    }
}

impl From<TechIndex> for TechIndexRepr {
    fn from(index: TechIndex) -> Self {
        Self {
            flows: index.flows,
            demand: index.demand,
        }
    }
}

impl TechIndex {
    /// Create an index with the given reference pair at position 0 and
    /// a demand of 1.0.
    pub fn new(ref_flow: TechFlow) -> Self {
        let mut idx = Self {
            flows: Vec::new(),
            positions: HashMap::new(),
            demand: 1.0,
        };
        idx.add(ref_flow);
        idx
    }

    /// Add a provider-flow pair, returning its position. Adding a pair
    /// that is already contained returns the existing position.
    pub fn add(&mut self, flow: TechFlow) -> usize {
        if let Some(&pos) = self.positions.get(&flow) {
            return pos;
        }
        let pos = self.flows.len();
        self.flows.push(flow);
        self.positions.insert(flow, pos);
        pos
    }

    /// The position of the given pair, if contained.
    pub fn position_of(&self, flow: &TechFlow) -> Option<usize> {
        self.positions.get(flow).copied()
    }

    /// The pair at the given position.
    pub fn at(&self, pos: usize) -> Option<&TechFlow> {
        self.flows.get(pos)
    }

    /// The reference pair of the product system.
    pub fn ref_flow(&self) -> &TechFlow {
        // position 0 is occupied by construction
        &self.flows[0]
    }

    /// The position of the reference pair (always 0).
    pub fn ref_position(&self) -> usize {
        0
    }

    /// The demanded output amount of the reference pair.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Override the demanded output amount of the reference pair.
    pub fn set_demand(&mut self, demand: f64) {
        self.demand = demand;
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Iterate over `(position, pair)` in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TechFlow)> {
        self.flows.iter().enumerate()
    }
}

/// Bijection between matrix positions and elementary (environmental)
/// flows. Each flow is tagged as an input (resource) or output
/// (emission) of the technosphere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "FlowIndexRepr", into = "FlowIndexRepr")]
pub struct FlowIndex {
    flows: Vec<FlowId>,
    positions: HashMap<FlowId, usize>,
    inputs: HashSet<FlowId>,
}

#[derive(Serialize, Deserialize)]
struct FlowIndexRepr {
    flows: Vec<FlowId>,
    inputs: Vec<FlowId>,
}

impl From<FlowIndexRepr> for FlowIndex {
    fn from(repr: FlowIndexRepr) -> Self {
        let positions = repr
            .flows
            .iter()
            .enumerate()
            .map(|(pos, flow)| (*flow, pos))
            .collect();
        Self {
            flows: repr.flows,
            positions,
            inputs: repr.inputs.into_iter().collect(),
        }
    }
}

impl From<FlowIndex> for FlowIndexRepr {
    fn from(index: FlowIndex) -> Self {
        // stable order for the serialized form
        let inputs = index
            .flows
            .iter()
            .filter(|flow| index.inputs.contains(flow))
            .copied()
            .collect();
        Self {
            flows: index.flows,
            inputs,
        }
    }
}

impl FlowIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input (resource) flow, returning its position.
    pub fn add_input(&mut self, flow: FlowId) -> usize {
        let pos = self.add(flow);
        self.inputs.insert(flow);
        pos
    }

    /// Register an output (emission) flow, returning its position.
    pub fn add_output(&mut self, flow: FlowId) -> usize {
        self.add(flow)
    }

    fn add(&mut self, flow: FlowId) -> usize {
        if let Some(&pos) = self.positions.get(&flow) {
            return pos;
        }
        let pos = self.flows.len();
        self.flows.push(flow);
        self.positions.insert(flow, pos);
        pos
    }

    pub fn position_of(&self, flow: &FlowId) -> Option<usize> {
        self.positions.get(flow).copied()
    }

    pub fn at(&self, pos: usize) -> Option<&FlowId> {
        self.flows.get(pos)
    }

    /// Whether the given flow is an input (resource) flow.
    pub fn is_input(&self, flow: &FlowId) -> bool {
        self.inputs.contains(flow)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &FlowId)> {
        self.flows.iter().enumerate()
    }
}

/// Bijection between matrix positions and impact categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ImpactIndexRepr", into = "ImpactIndexRepr")]
pub struct ImpactIndex {
    impacts: Vec<ImpactId>,
    positions: HashMap<ImpactId, usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct ImpactIndexRepr {
    impacts: Vec<ImpactId>,
}

impl From<ImpactIndexRepr> for ImpactIndex {
    fn from(repr: ImpactIndexRepr) -> Self {
        let positions = repr
            .impacts
            .iter()
            .enumerate()
            .map(|(pos, impact)| (*impact, pos))
            .collect();
        Self {
            impacts: repr.impacts,
            positions,
        }
    }
}

impl From<ImpactIndex> for ImpactIndexRepr {
    fn from(index: ImpactIndex) -> Self {
        Self {
            impacts: index.impacts,
        }
    }
}

impl ImpactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, impact: ImpactId) -> usize {
        if let Some(&pos) = self.positions.get(&impact) {
            return pos;
        }
        let pos = self.impacts.len();
        self.impacts.push(impact);
        self.positions.insert(impact, pos);
        pos
    }

    pub fn position_of(&self, impact: &ImpactId) -> Option<usize> {
        self.positions.get(impact).copied()
    }

    pub fn at(&self, pos: usize) -> Option<&ImpactId> {
        self.impacts.get(pos)
    }

    pub fn len(&self) -> usize {
        self.impacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.impacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ImpactId)> {
        self.impacts.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProcessId;

    fn tf(process: i64, flow: i64) -> TechFlow {
        TechFlow::new(ProcessId::new(process), FlowId::new(flow))
    }

    #[test]
    fn test_tech_index_reference_at_zero() {
        let mut idx = TechIndex::new(tf(1, 1));
        idx.add(tf(2, 2));
        idx.add(tf(3, 3));

        assert_eq!(idx.len(), 3);
        assert_eq!(idx.ref_position(), 0);
        assert_eq!(idx.at(0), Some(&tf(1, 1)));
        assert_eq!(idx.position_of(&tf(3, 3)), Some(2));
    }

    #[test]
    fn test_tech_index_duplicate_add() {
        let mut idx = TechIndex::new(tf(1, 1));
        let first = idx.add(tf(2, 2));
        let second = idx.add(tf(2, 2));
        assert_eq!(first, second);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_tech_index_demand() {
        let mut idx = TechIndex::new(tf(1, 1));
        assert_eq!(idx.demand(), 1.0);
        idx.set_demand(42.5);
        assert_eq!(idx.demand(), 42.5);
    }

    #[test]
    fn test_flow_index_input_tagging() {
        let mut idx = FlowIndex::new();
        idx.add_input(FlowId::new(10));
        idx.add_output(FlowId::new(20));

        assert!(idx.is_input(&FlowId::new(10)));
        assert!(!idx.is_input(&FlowId::new(20)));
        assert_eq!(idx.position_of(&FlowId::new(20)), Some(1));
    }

    #[test]
    fn test_index_serde_rebuilds_positions() {
        let mut idx = TechIndex::new(tf(1, 1));
        idx.add(tf(2, 2));
        idx.set_demand(3.0);
        let json = serde_json::to_string(&idx).unwrap();
        let back: TechIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back.demand(), 3.0);
        assert_eq!(back.position_of(&tf(2, 2)), Some(1));

        let mut flows = FlowIndex::new();
        flows.add_input(FlowId::new(10));
        flows.add_output(FlowId::new(20));
        let json = serde_json::to_string(&flows).unwrap();
        let back: FlowIndex = serde_json::from_str(&json).unwrap();
        assert!(back.is_input(&FlowId::new(10)));
        assert_eq!(back.position_of(&FlowId::new(20)), Some(1));
    }

    #[test]
    fn test_impact_index() {
        let mut idx = ImpactIndex::new();
        idx.add(ImpactId::new(7));
        idx.add(ImpactId::new(8));
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.at(1), Some(&ImpactId::new(8)));
        assert_eq!(idx.position_of(&ImpactId::new(7)), Some(0));
    }
}
