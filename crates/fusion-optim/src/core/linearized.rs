//! A factor linearized at a fixed point.

use fusion_algebra::{BlockVector, DMatF64, DVecF64};

use super::factor::{FactorError, FactorResult};
use super::operator::GaussianFactor;
use super::values::VariableId;

/// A Gaussian factor built from a nonlinear factor's error and Jacobian at a linearization point
/// `x0`.
///
/// Stores `b = -f(x0)` and the combined Jacobian `H` whose column blocks follow the edge order.
/// For an increment `δ`, the error vector is `H flat(δ) - b`, the first-order model of
/// `f(x0 + δ)`. Immutable once built.
#[derive(Debug, Clone)]
pub struct LinearizedFactor {
    error: DVecF64,
    jacobian: DMatF64,
    edges: Vec<VariableId>,
    dims: Vec<usize>,
}

impl LinearizedFactor {
    /// Create a linearized factor from `b`, the combined Jacobian and the block layout.
    ///
    /// # Errors
    ///
    /// - [`FactorError::DimensionMismatch`] if `edges` and `dims` differ in length.
    /// - [`FactorError::ShapeMismatch`] if the Jacobian is not `error.len() x sum(dims)`.
    pub fn new(
        error: DVecF64,
        jacobian: DMatF64,
        edges: Vec<VariableId>,
        dims: Vec<usize>,
    ) -> FactorResult<Self> {
        if edges.len() != dims.len() {
            return Err(FactorError::DimensionMismatch {
                expected: edges.len(),
                actual: dims.len(),
            });
        }

        let expected = (error.len(), dims.iter().sum());
        let actual = jacobian.shape();
        if expected != actual {
            return Err(FactorError::ShapeMismatch { expected, actual });
        }

        Ok(Self {
            error,
            jacobian,
            edges,
            dims,
        })
    }

    /// Create a linearized factor by concatenating per-variable Jacobian blocks horizontally.
    ///
    /// # Errors
    ///
    /// - [`FactorError::DimensionMismatch`] if there is not one block per edge.
    /// - [`FactorError::ShapeMismatch`] if a block does not have `error.len()` rows.
    pub fn from_blocks(
        error: DVecF64,
        blocks: &[DMatF64],
        edges: Vec<VariableId>,
    ) -> FactorResult<Self> {
        if blocks.len() != edges.len() {
            return Err(FactorError::DimensionMismatch {
                expected: edges.len(),
                actual: blocks.len(),
            });
        }

        let rows = error.len();
        let dims: Vec<usize> = blocks.iter().map(|b| b.ncols()).collect();
        let mut jacobian = DMatF64::zeros(rows, dims.iter().sum());

        let mut offset = 0;
        for block in blocks {
            if block.nrows() != rows {
                return Err(FactorError::ShapeMismatch {
                    expected: (rows, block.ncols()),
                    actual: block.shape(),
                });
            }
            jacobian
                .view_mut((0, offset), block.shape())
                .copy_from(block);
            offset += block.ncols();
        }

        Self::new(error, jacobian, edges, dims)
    }

    /// The error vector at the linearization point, negated (`b = -f(x0)`).
    pub fn error_at_linearization_point(&self) -> &DVecF64 {
        &self.error
    }

    /// The combined Jacobian.
    pub fn jacobian(&self) -> &DMatF64 {
        &self.jacobian
    }

    /// Tangent dimension of each input block.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// A zero increment with this factor's block layout.
    pub fn zero_input(&self) -> BlockVector {
        BlockVector::zeros(&self.dims)
    }

}

impl GaussianFactor for LinearizedFactor {
    type InputVector = BlockVector;
    type ErrorVector = DVecF64;

    fn edges(&self) -> &[VariableId] {
        &self.edges
    }

    fn error_vector(&self, x: &BlockVector) -> DVecF64 {
        self.apply_linear_forward(x) - &self.error
    }

    /// # Panics
    ///
    /// Panics if `p` does not have this factor's block layout.
    fn apply_linear_forward(&self, p: &BlockVector) -> DVecF64 {
        assert_eq!(p.dims(), self.dims, "increment layout does not match factor");
        &self.jacobian * p.to_flat()
    }

    /// # Panics
    ///
    /// Panics if `r` does not have the factor's error dimension.
    fn apply_linear_transpose(&self, r: &DVecF64) -> BlockVector {
        assert_eq!(r.len(), self.error.len(), "error dimension does not match factor");
        // Hᵀr has exactly sum(dims) rows by construction.
        BlockVector::from_flat(&self.jacobian.tr_mul(r), &self.dims)
            .expect("jacobian columns match the block layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fusion_algebra::EuclideanVector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DMatF64 {
        DMatF64::from_fn(rows, cols, |_, _| rng.random_range(-1.0..1.0))
    }

    fn random_vector(rng: &mut StdRng, n: usize) -> DVecF64 {
        DVecF64::from_fn(n, |_, _| rng.random_range(-1.0..1.0))
    }

    fn ids(n: usize) -> Vec<VariableId> {
        (0..n).map(VariableId::new).collect()
    }

    #[test]
    fn test_from_blocks_layout() -> FactorResult<()> {
        let b0 = DMatF64::from_row_slice(2, 1, &[1.0, 2.0]);
        let b1 = DMatF64::from_row_slice(2, 2, &[3.0, 4.0, 5.0, 6.0]);
        let f = LinearizedFactor::from_blocks(DVecF64::zeros(2), &[b0, b1], ids(2))?;
        assert_eq!(f.dims(), &[1, 2]);
        assert_eq!(
            f.jacobian(),
            &DMatF64::from_row_slice(2, 3, &[1.0, 3.0, 4.0, 2.0, 5.0, 6.0])
        );

        let p = BlockVector::new(vec![
            DVecF64::from_vec(vec![1.0]),
            DVecF64::from_vec(vec![0.0, 1.0]),
        ]);
        assert_eq!(
            f.apply_linear_forward(&p),
            DVecF64::from_vec(vec![5.0, 8.0])
        );

        let back = f.apply_linear_transpose(&DVecF64::from_vec(vec![1.0, 0.0]));
        assert_eq!(back.dims(), vec![1, 2]);
        assert_eq!(back.to_flat(), DVecF64::from_vec(vec![1.0, 3.0, 4.0]));
        Ok(())
    }

    #[test]
    fn test_transpose_splits_by_edge_dims() -> FactorResult<()> {
        // [[1 2 | | 3], [4 5 | | 6]] with an empty middle block.
        let f = LinearizedFactor::new(
            DVecF64::zeros(2),
            DMatF64::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            ids(3),
            vec![2, 0, 1],
        )?;
        let back = f.apply_linear_transpose(&DVecF64::from_vec(vec![1.0, 1.0]));
        assert_eq!(back.dims(), vec![2, 0, 1]);
        assert_eq!(back.block(0), Some(&DVecF64::from_vec(vec![5.0, 7.0])));
        assert_eq!(back.block(1), Some(&DVecF64::zeros(0)));
        assert_eq!(back.block(2), Some(&DVecF64::from_vec(vec![9.0])));
        Ok(())
    }

    #[test]
    fn test_shape_mismatch_at_construction() {
        let err = LinearizedFactor::new(
            DVecF64::zeros(3),
            DMatF64::zeros(3, 4),
            ids(2),
            vec![2, 3],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FactorError::ShapeMismatch {
                expected: (3, 5),
                actual: (3, 4)
            }
        ));

        let err = LinearizedFactor::from_blocks(
            DVecF64::zeros(3),
            &[DMatF64::zeros(3, 2), DMatF64::zeros(2, 2)],
            ids(2),
        )
        .unwrap_err();
        assert!(matches!(err, FactorError::ShapeMismatch { .. }));

        let err =
            LinearizedFactor::from_blocks(DVecF64::zeros(3), &[DMatF64::zeros(3, 2)], ids(2))
                .unwrap_err();
        assert!(matches!(
            err,
            FactorError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_error_vector_model() -> FactorResult<()> {
        // f(x0) = [1, -1], H = I => error_vector(δ) = δ + f(x0)
        let f = LinearizedFactor::new(
            DVecF64::from_vec(vec![-1.0, 1.0]),
            DMatF64::identity(2, 2),
            ids(1),
            vec![2],
        )?;
        let zero = f.zero_input();
        assert_eq!(f.error_vector(&zero), DVecF64::from_vec(vec![1.0, -1.0]));
        assert_eq!(f.error(&zero), 1.0);

        let delta = BlockVector::new(vec![DVecF64::from_vec(vec![-1.0, 1.0])]);
        assert_eq!(f.error_vector(&delta), DVecF64::zeros(2));
        Ok(())
    }

    #[test]
    fn test_forward_transpose_adjoint() -> FactorResult<()> {
        let mut rng = StdRng::seed_from_u64(1234);
        let dims = [3, 5, 2];
        for _ in 0..10 {
            let rows = 7;
            let blocks: Vec<DMatF64> = dims
                .iter()
                .map(|&d| random_matrix(&mut rng, rows, d))
                .collect();
            let f = LinearizedFactor::from_blocks(random_vector(&mut rng, rows), &blocks, ids(3))?;

            let p = BlockVector::new(dims.iter().map(|&d| random_vector(&mut rng, d)).collect());
            let r = random_vector(&mut rng, rows);

            let lhs = EuclideanVector::dot(&f.apply_linear_forward(&p), &r);
            let rhs = p.dot(&f.apply_linear_transpose(&r));
            assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    #[should_panic(expected = "increment layout")]
    fn test_forward_rejects_wrong_layout() {
        let f = LinearizedFactor::new(
            DVecF64::zeros(2),
            DMatF64::zeros(2, 3),
            ids(1),
            vec![3],
        )
        .unwrap();
        let _ = f.apply_linear_forward(&BlockVector::zeros(&[2, 1]));
    }
}
