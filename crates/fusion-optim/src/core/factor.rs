//! Nonlinear factor trait for factor graph optimization
//!
//! A factor is a term of a sum-of-squared-residuals objective, defined over one or more
//! adjacent variables. It computes an error vector and, optionally, its own Jacobian with
//! respect to the adjacent variables.

use fusion_algebra::{AlgebraError, DMatF64, DVecF64};
use thiserror::Error;

use super::values::VariableId;

#[derive(Debug, Error)]
pub enum FactorError {
    /// Invalid dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A matrix does not have the shape its context requires
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The assignment holds no value for an adjacent variable
    #[error("Variable {0} not found")]
    VariableNotFound(VariableId),

    /// The patch source could not produce a patch
    #[error("Patch extraction failed: {0}")]
    PatchFailed(String),

    /// Invalid algebraic construction
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

/// Result type for factor operations
pub type FactorResult<T> = Result<T, FactorError>;

/// Trait for nonlinear factors.
///
/// Variable values are passed as one slice per adjacent variable, in edge order. Every
/// variable is Euclidean: its tangent dimension equals its value length and increments are
/// added component-wise.
///
/// # Custom linearization
///
/// By default the linearization bridge differentiates [`NonlinearFactor::error_vector`]
/// numerically. A factor that knows its Jacobian (for speed or numerical stability) overrides
/// [`NonlinearFactor::jacobian`] to return one block per adjacent variable.
///
/// # Thread Safety
///
/// Factors must be `Send + Sync` to enable parallel linearization.
pub trait NonlinearFactor: Send + Sync {
    /// Identifiers of the adjacent variables.
    fn edges(&self) -> &[VariableId];

    /// Tangent dimension of each adjacent variable, in edge order.
    fn variable_dims(&self) -> Vec<usize>;

    /// Dimension of the error vector.
    fn residual_dim(&self) -> usize;

    /// Evaluate the error vector at `values`.
    fn error_vector(&self, values: &[&[f64]]) -> FactorResult<DVecF64>;

    /// Per-variable Jacobian blocks of the error vector at `values`, each of shape
    /// `residual_dim x variable_dims()[i]`.
    ///
    /// Returns `None` to fall back on the linearizer's differentiator.
    fn jacobian(&self, _values: &[&[f64]]) -> Option<FactorResult<Vec<DMatF64>>> {
        None
    }

    /// Half the squared norm of the error vector.
    fn error(&self, values: &[&[f64]]) -> FactorResult<f64> {
        Ok(0.5 * self.error_vector(values)?.norm_squared())
    }
}

impl<T: NonlinearFactor + ?Sized> NonlinearFactor for Box<T> {
    fn edges(&self) -> &[VariableId] {
        (**self).edges()
    }

    fn variable_dims(&self) -> Vec<usize> {
        (**self).variable_dims()
    }

    fn residual_dim(&self) -> usize {
        (**self).residual_dim()
    }

    fn error_vector(&self, values: &[&[f64]]) -> FactorResult<DVecF64> {
        (**self).error_vector(values)
    }

    fn jacobian(&self, values: &[&[f64]]) -> Option<FactorResult<Vec<DMatF64>>> {
        (**self).jacobian(values)
    }
}

/// Check that `values` holds one slice of the right length per adjacent variable.
pub(crate) fn check_values(values: &[&[f64]], dims: &[usize]) -> FactorResult<()> {
    if values.len() != dims.len() {
        return Err(FactorError::DimensionMismatch {
            expected: dims.len(),
            actual: values.len(),
        });
    }
    for (value, &dim) in values.iter().zip(dims) {
        if value.len() != dim {
            return Err(FactorError::DimensionMismatch {
                expected: dim,
                actual: value.len(),
            });
        }
    }
    Ok(())
}

/// A prior factor that penalizes deviation from a target value.
///
/// Residual: r = x - target. Supplies its identity Jacobian directly.
#[derive(Debug, Clone)]
pub struct PriorFactor {
    edges: [VariableId; 1],
    target: DVecF64,
}

impl PriorFactor {
    /// Create a new prior factor
    pub fn new(id: VariableId, target: DVecF64) -> Self {
        Self {
            edges: [id],
            target,
        }
    }

    /// The target value.
    pub fn target(&self) -> &DVecF64 {
        &self.target
    }
}

impl NonlinearFactor for PriorFactor {
    fn edges(&self) -> &[VariableId] {
        &self.edges
    }

    fn variable_dims(&self) -> Vec<usize> {
        vec![self.target.len()]
    }

    fn residual_dim(&self) -> usize {
        self.target.len()
    }

    fn error_vector(&self, values: &[&[f64]]) -> FactorResult<DVecF64> {
        check_values(values, &[self.target.len()])?;
        Ok(DVecF64::from_column_slice(values[0]) - &self.target)
    }

    fn jacobian(&self, _values: &[&[f64]]) -> Option<FactorResult<Vec<DMatF64>>> {
        let n = self.target.len();
        Some(Ok(vec![DMatF64::identity(n, n)]))
    }
}
