use fusion_algebra::DVecF64;

use crate::core::{FactorResult, NonlinearFactor, VariableId};

/// Relative measurement between two Euclidean variables.
///
/// Residual: r = (x1 - x0) - measured. Relies on the linearizer's differentiator.
#[derive(Debug, Clone)]
pub struct BetweenFactor {
    edges: [VariableId; 2],
    measured: DVecF64,
}

impl BetweenFactor {
    /// Create a factor measuring `to - from`.
    pub fn new(from: VariableId, to: VariableId, measured: DVecF64) -> Self {
        Self {
            edges: [from, to],
            measured,
        }
    }
}

impl NonlinearFactor for BetweenFactor {
    fn edges(&self) -> &[VariableId] {
        &self.edges
    }

    fn variable_dims(&self) -> Vec<usize> {
        vec![self.measured.len(); 2]
    }

    fn residual_dim(&self) -> usize {
        self.measured.len()
    }

    fn error_vector(&self, values: &[&[f64]]) -> FactorResult<DVecF64> {
        crate::core::check_values(values, &self.variable_dims())?;
        let from = DVecF64::from_column_slice(values[0]);
        let to = DVecF64::from_column_slice(values[1]);
        Ok(to - from - &self.measured)
    }
}
