//! The assembled matrix container handed to the calculation engine.

use crate::error::{LcatError, LcatResult};
use crate::index::{FlowIndex, ImpactIndex, TechIndex};
use crate::matrix::Matrix;
use crate::uncertainty::UMatrix;

/// Contains the matrices that are the input of a calculation.
///
/// The container arrives fully assembled: the collaborating assembly
/// stage resolves the product-system graph, applies allocation, and
/// builds the cost vector before this type is constructed. The only
/// mutations the core performs afterwards are [`compress`] and the
/// in-place entry overwrites of a Monte Carlo resample pass.
///
/// Resampling follows a single-owner-mutates discipline: concurrent
/// simulation workers must each hold their own [`Clone`] of the
/// container.
///
/// [`compress`]: MatrixData::compress
pub struct MatrixData {
    /// Index of the product and waste flows of the technosphere (the
    /// row and column index of the technology matrix; the column index
    /// of the intervention matrix).
    pub tech_index: TechIndex,

    /// Index of the elementary flows (the row index of the intervention
    /// matrix; the column index of the impact matrix).
    pub flow_index: FlowIndex,

    /// Index of the impact categories (the row index of the impact
    /// matrix). Present exactly when `impact_matrix` is.
    pub impact_index: Option<ImpactIndex>,

    /// The technology matrix (n×n). The diagonal entry of row i is the
    /// reference production amount of provider-flow pair i.
    pub tech_matrix: Box<dyn Matrix>,

    /// The intervention matrix (m×n).
    pub flow_matrix: Box<dyn Matrix>,

    /// The characterization factors (k×m), when an impact assessment
    /// method was selected.
    pub impact_matrix: Option<Box<dyn Matrix>>,

    /// Unscaled net costs per provider-flow pair (length n), when cost
    /// results were requested.
    pub cost_vector: Option<Vec<f64>>,

    /// Uncertainty descriptors of the technology matrix entries.
    pub tech_uncertainties: Option<UMatrix>,

    /// Uncertainty descriptors of the intervention matrix entries.
    pub flow_uncertainties: Option<UMatrix>,

    /// Uncertainty descriptors of the characterization factors.
    pub impact_uncertainties: Option<UMatrix>,
}

impl MatrixData {
    pub fn new(
        tech_index: TechIndex,
        flow_index: FlowIndex,
        tech_matrix: Box<dyn Matrix>,
        flow_matrix: Box<dyn Matrix>,
    ) -> Self {
        Self {
            tech_index,
            flow_index,
            impact_index: None,
            tech_matrix,
            flow_matrix,
            impact_matrix: None,
            cost_vector: None,
            tech_uncertainties: None,
            flow_uncertainties: None,
            impact_uncertainties: None,
        }
    }

    /// Attach an impact assessment method: characterization factors and
    /// their category index.
    pub fn with_impacts(mut self, index: ImpactIndex, matrix: Box<dyn Matrix>) -> Self {
        self.impact_index = Some(index);
        self.impact_matrix = Some(matrix);
        self
    }

    /// Attach a cost vector for life cycle costing.
    pub fn with_costs(mut self, costs: Vec<f64>) -> Self {
        self.cost_vector = Some(costs);
        self
    }

    /// Fail-fast structural checks. Runs before any solver call; a
    /// container that fails here never reaches numerical code.
    pub fn validate(&self) -> LcatResult<()> {
        let n = self.tech_index.len();
        if n == 0 {
            return Err(LcatError::Structure(
                "technology index is empty".into(),
            ));
        }
        if self.tech_matrix.rows() != n || self.tech_matrix.columns() != n {
            return Err(LcatError::Structure(format!(
                "technology matrix is {}x{} but the technology index has {} entries",
                self.tech_matrix.rows(),
                self.tech_matrix.columns(),
                n
            )));
        }

        let m = self.flow_index.len();
        if self.flow_matrix.rows() != m || self.flow_matrix.columns() != n {
            return Err(LcatError::Structure(format!(
                "intervention matrix is {}x{} but expected {}x{}",
                self.flow_matrix.rows(),
                self.flow_matrix.columns(),
                m,
                n
            )));
        }

        match (&self.impact_index, &self.impact_matrix) {
            (None, None) => {}
            (Some(index), Some(matrix)) => {
                let k = index.len();
                if matrix.rows() != k || matrix.columns() != m {
                    return Err(LcatError::Structure(format!(
                        "impact matrix is {}x{} but expected {}x{}",
                        matrix.rows(),
                        matrix.columns(),
                        k,
                        m
                    )));
                }
            }
            _ => {
                return Err(LcatError::Structure(
                    "impact matrix and impact index must be present together".into(),
                ))
            }
        }

        if let Some(costs) = &self.cost_vector {
            if costs.len() != n {
                return Err(LcatError::Structure(format!(
                    "cost vector has length {} but the technology index has {} entries",
                    costs.len(),
                    n
                )));
            }
        }

        self.validate_uncertainties()?;
        Ok(())
    }

    fn validate_uncertainties(&self) -> LcatResult<()> {
        let checks: [(&str, &Option<UMatrix>, &dyn Matrix); 3] = [
            ("technology", &self.tech_uncertainties, &*self.tech_matrix),
            ("intervention", &self.flow_uncertainties, &*self.flow_matrix),
            (
                "impact",
                &self.impact_uncertainties,
                self.impact_matrix
                    .as_deref()
                    .unwrap_or(&*self.tech_matrix),
            ),
        ];
        if self.impact_uncertainties.is_some() && self.impact_matrix.is_none() {
            return Err(LcatError::Structure(
                "impact uncertainties without an impact matrix".into(),
            ));
        }
        for (name, cells, matrix) in checks {
            let Some(cells) = cells else { continue };
            for cell in cells.cells() {
                if cell.row >= matrix.rows() || cell.col >= matrix.columns() {
                    return Err(LcatError::Structure(format!(
                        "{} uncertainty cell ({}, {}) is outside the {}x{} matrix",
                        name,
                        cell.row,
                        cell.col,
                        matrix.rows(),
                        matrix.columns()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether the technology matrix uses a sparse backing. Callers use
    /// this to decide between total-only and full upstream calculations
    /// on large systems.
    pub fn is_sparse(&self) -> bool {
        self.tech_matrix.is_sparse()
    }

    /// Replace every nonzero-keyed sparse matrix of the container with
    /// its compressed-column equivalent, in place. Dense matrices are
    /// left untouched.
    pub fn compress(&mut self) {
        if let Some(csc) = self.tech_matrix.compressed() {
            self.tech_matrix = Box::new(csc);
        }
        if let Some(csc) = self.flow_matrix.compressed() {
            self.flow_matrix = Box::new(csc);
        }
        if let Some(matrix) = &self.impact_matrix {
            if let Some(csc) = matrix.compressed() {
                self.impact_matrix = Some(Box::new(csc));
            }
        }
    }
}

impl Clone for MatrixData {
    fn clone(&self) -> Self {
        Self {
            tech_index: self.tech_index.clone(),
            flow_index: self.flow_index.clone(),
            impact_index: self.impact_index.clone(),
            tech_matrix: self.tech_matrix.copy(),
            flow_matrix: self.flow_matrix.copy(),
            impact_matrix: self.impact_matrix.as_ref().map(|m| m.copy()),
            cost_vector: self.cost_vector.clone(),
            tech_uncertainties: self.tech_uncertainties.clone(),
            flow_uncertainties: self.flow_uncertainties.clone(),
            impact_uncertainties: self.impact_uncertainties.clone(),
        }
    }
}
