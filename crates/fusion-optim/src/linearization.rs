//! Linearization bridge: nonlinear factors to linearized (Gaussian) factors.
//!
//! For each factor the bridge reads the adjacent variable values from an [`Assignment`],
//! evaluates the error vector, obtains one Jacobian block per adjacent variable, concatenates
//! the blocks in edge order and stores the result as an immutable [`LinearizedFactor`].
//!
//! Jacobian blocks come from the factor itself when it overrides
//! [`NonlinearFactor::jacobian`], and from the linearizer's [`Differentiator`] otherwise.

use fusion_algebra::{DMatF64, DVecF64};
use rayon::prelude::*;

use crate::core::{
    Assignment, FactorError, FactorResult, LinearizedFactor, NonlinearFactor, VariableId,
};

/// Strategy computing per-variable Jacobian blocks of a factor's error vector.
pub trait Differentiator: Send + Sync {
    /// Jacobian blocks of `factor` at `values`, one per adjacent variable, each of shape
    /// `residual_dim x variable_dims()[i]`.
    fn jacobian<F: NonlinearFactor + ?Sized>(
        &self,
        factor: &F,
        values: &[&[f64]],
    ) -> FactorResult<Vec<DMatF64>>;
}

/// Numerical differentiation by central differences.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CentralDifference {
    /// Perturbation applied to each scalar, in both directions.
    pub step: f64,
}

impl Default for CentralDifference {
    fn default() -> Self {
        Self { step: 1e-6 }
    }
}

impl Differentiator for CentralDifference {
    fn jacobian<F: NonlinearFactor + ?Sized>(
        &self,
        factor: &F,
        values: &[&[f64]],
    ) -> FactorResult<Vec<DMatF64>> {
        let dims = factor.variable_dims();
        let rows = factor.residual_dim();
        let mut perturbed: Vec<Vec<f64>> = values.iter().map(|v| v.to_vec()).collect();

        let mut blocks = Vec::with_capacity(dims.len());
        for (i, &dim) in dims.iter().enumerate() {
            let mut block = DMatF64::zeros(rows, dim);
            for k in 0..dim {
                let original = perturbed[i][k];

                perturbed[i][k] = original + self.step;
                let plus = evaluate(factor, &perturbed)?;
                perturbed[i][k] = original - self.step;
                let minus = evaluate(factor, &perturbed)?;
                perturbed[i][k] = original;

                for evaluated in [&plus, &minus] {
                    if evaluated.len() != rows {
                        return Err(FactorError::DimensionMismatch {
                            expected: rows,
                            actual: evaluated.len(),
                        });
                    }
                }
                block.set_column(k, &((plus - minus) / (2.0 * self.step)));
            }
            blocks.push(block);
        }

        Ok(blocks)
    }
}

fn evaluate<F: NonlinearFactor + ?Sized>(
    factor: &F,
    values: &[Vec<f64>],
) -> FactorResult<DVecF64> {
    let slices: Vec<&[f64]> = values.iter().map(Vec::as_slice).collect();
    factor.error_vector(&slices)
}

/// Builds [`LinearizedFactor`]s from nonlinear factors.
#[derive(Debug, Clone, Default)]
pub struct Linearizer<D = CentralDifference> {
    differentiator: D,
}

impl Linearizer<CentralDifference> {
    /// Create a linearizer that falls back on central differences.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Differentiator> Linearizer<D> {
    /// Create a linearizer with a custom fallback differentiator.
    pub fn with_differentiator(differentiator: D) -> Self {
        Self { differentiator }
    }

    /// The fallback differentiator.
    pub fn differentiator(&self) -> &D {
        &self.differentiator
    }

    /// Linearize `factor` at the values held by `assignment`.
    ///
    /// # Errors
    ///
    /// - [`FactorError::VariableNotFound`] if an adjacent variable is missing.
    /// - [`FactorError::DimensionMismatch`] if a value does not have its variable's dimension.
    /// - [`FactorError::ShapeMismatch`] if a Jacobian block does not have shape
    ///   `residual_dim x variable_dims()[i]`.
    pub fn linearize<F, A>(&self, factor: &F, assignment: &A) -> FactorResult<LinearizedFactor>
    where
        F: NonlinearFactor + ?Sized,
        A: Assignment + ?Sized,
    {
        let edges = factor.edges();
        let values = gather(edges, assignment)?;

        let error = factor.error_vector(&values)?;
        let blocks = match factor.jacobian(&values) {
            Some(blocks) => blocks?,
            None => self.differentiator.jacobian(factor, &values)?,
        };

        let dims = factor.variable_dims();
        if blocks.len() != dims.len() {
            return Err(FactorError::DimensionMismatch {
                expected: dims.len(),
                actual: blocks.len(),
            });
        }
        for (block, &dim) in blocks.iter().zip(&dims) {
            let expected = (error.len(), dim);
            if block.shape() != expected {
                return Err(FactorError::ShapeMismatch {
                    expected,
                    actual: block.shape(),
                });
            }
        }

        LinearizedFactor::from_blocks(-error, &blocks, edges.to_vec())
    }

    /// Linearize every factor at the same assignment, in parallel.
    ///
    /// The output has the same order as `factors`. Fails with the first error encountered.
    pub fn linearize_all<F, A>(
        &self,
        factors: &[F],
        assignment: &A,
    ) -> FactorResult<Vec<LinearizedFactor>>
    where
        F: NonlinearFactor,
        A: Assignment + ?Sized,
    {
        factors
            .par_iter()
            .map(|factor| self.linearize(factor, assignment))
            .collect()
    }
}

fn gather<'a, A: Assignment + ?Sized>(
    edges: &[VariableId],
    assignment: &'a A,
) -> FactorResult<Vec<&'a [f64]>> {
    edges
        .iter()
        .map(|&id| assignment.get(id).ok_or(FactorError::VariableNotFound(id)))
        .collect()
}
