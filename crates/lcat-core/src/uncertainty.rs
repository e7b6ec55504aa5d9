//! Uncertainty descriptors for Monte Carlo resampling.
//!
//! These are pure data: each [`UMatrix`] describes the distributions of
//! the nonzero entries of exactly one matrix of the container. Drawing
//! values and writing them back into the matrices is the simulator's
//! job (see the calculation crate); nothing here touches a random
//! number generator.

use serde::{Deserialize, Serialize};

/// Probability distribution of a single uncertain value.
///
/// `Parameter` does not carry a distribution of its own: it refers to a
/// named entry of the shared [`ParameterTable`], which is drawn once
/// per resample pass so that every referencing cell sees the same
/// value within one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// A fixed value; resampling always writes exactly this value.
    Constant(f64),
    Normal {
        mean: f64,
        sd: f64,
    },
    /// Log-normal given as geometric mean and geometric standard
    /// deviation, the common form in LCA data sets.
    LogNormal {
        geo_mean: f64,
        geo_sd: f64,
    },
    Triangle {
        min: f64,
        mode: f64,
        max: f64,
    },
    Uniform {
        min: f64,
        max: f64,
    },
    /// Reference to a named parameter of the shared sample context.
    Parameter {
        name: String,
    },
}

/// Uncertainty descriptor of one matrix entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UCell {
    pub row: usize,
    pub col: usize,
    pub distribution: Distribution,
}

impl UCell {
    pub fn new(row: usize, col: usize, distribution: Distribution) -> Self {
        Self {
            row,
            col,
            distribution,
        }
    }
}

/// The uncertainty descriptors of one matrix, structurally aligned to
/// its nonzero entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UMatrix {
    cells: Vec<UCell>,
}

impl UMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cell: UCell) {
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[UCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Named uncertain parameters shared by all matrices of a container.
///
/// Each parameter is drawn once per resample pass; cells referencing it
/// via [`Distribution::Parameter`] are redrawn consistently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    parameters: Vec<(String, Distribution)>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter; a later registration with the same name
    /// replaces the earlier one.
    pub fn add(&mut self, name: impl Into<String>, distribution: Distribution) {
        let name = name.into();
        if let Some(entry) = self.parameters.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = distribution;
        } else {
            self.parameters.push((name, distribution));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Distribution> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Distribution)> {
        self.parameters.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_umatrix_collects_cells() {
        let mut u = UMatrix::new();
        u.add(UCell::new(0, 0, Distribution::Constant(1.0)));
        u.add(UCell::new(1, 0, Distribution::Uniform { min: 0.5, max: 1.5 }));
        assert_eq!(u.len(), 2);
        assert_eq!(u.cells()[1].row, 1);
    }

    #[test]
    fn test_parameter_table_replaces_by_name() {
        let mut table = ParameterTable::new();
        table.add("steel_input", Distribution::Constant(1.0));
        table.add("steel_input", Distribution::Uniform { min: 0.9, max: 1.1 });
        assert_eq!(table.len(), 1);
        assert!(matches!(
            table.get("steel_input"),
            Some(Distribution::Uniform { .. })
        ));
    }

    #[test]
    fn test_distribution_serde_roundtrip() {
        let d = Distribution::Triangle {
            min: 1.0,
            mode: 2.0,
            max: 4.0,
        };
        let json = serde_json::to_string(&d).unwrap();
        let back: Distribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
