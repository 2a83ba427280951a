//! The linear-operator contract consumed by iterative solvers.

use fusion_algebra::{matvec, matvec_transposed, EuclideanVector, Matrix3, Vector3};

use super::values::VariableId;

/// A linear (or linearized) factor: a linear map `A` from an input (tangent) space to an error
/// space, together with the error vector `b` at the linearization point.
///
/// The error vector at an input `x` is `A x - b`, and the factor's cost is half its squared
/// norm.
///
/// # Contract
///
/// [`GaussianFactor::apply_linear_forward`] and [`GaussianFactor::apply_linear_transpose`] must
/// be exact adjoints under the Euclidean inner products:
///
/// `⟨forward(p), r⟩ == ⟨p, transpose(r)⟩` for all `p`, `r`.
///
/// Solvers cannot detect a violation; they silently converge to the wrong point.
pub trait GaussianFactor {
    /// The tangent space the operator maps from.
    type InputVector: EuclideanVector;

    /// The space of error vectors.
    type ErrorVector: EuclideanVector;

    /// Identifiers of the adjacent variables, in the order of the input blocks.
    fn edges(&self) -> &[VariableId];

    /// The error vector at `x`.
    fn error_vector(&self, x: &Self::InputVector) -> Self::ErrorVector;

    /// Apply the linear map: `A p`.
    fn apply_linear_forward(&self, p: &Self::InputVector) -> Self::ErrorVector;

    /// Apply the adjoint of the linear map: `Aᵀ r`.
    fn apply_linear_transpose(&self, r: &Self::ErrorVector) -> Self::InputVector;

    /// Half the squared norm of the error vector at `x`.
    fn error(&self, x: &Self::InputVector) -> f64 {
        0.5 * self.error_vector(x).squared_norm()
    }
}

/// A Gaussian factor on one 3-dimensional variable: `error_vector(x) = A x - b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3Factor {
    a: Matrix3,
    b: Vector3,
    edges: [VariableId; 1],
}

impl Matrix3Factor {
    /// Create a factor from its matrix and right-hand side.
    pub fn new(id: VariableId, a: Matrix3, b: Vector3) -> Self {
        Self { a, b, edges: [id] }
    }

    /// The linear map.
    pub fn matrix(&self) -> &Matrix3 {
        &self.a
    }

    /// The right-hand side.
    pub fn rhs(&self) -> &Vector3 {
        &self.b
    }
}

impl GaussianFactor for Matrix3Factor {
    type InputVector = Vector3;
    type ErrorVector = Vector3;

    fn edges(&self) -> &[VariableId] {
        &self.edges
    }

    fn error_vector(&self, x: &Vector3) -> Vector3 {
        matvec(&self.a, x) - self.b
    }

    fn apply_linear_forward(&self, p: &Vector3) -> Vector3 {
        matvec(&self.a, p)
    }

    fn apply_linear_transpose(&self, r: &Vector3) -> Vector3 {
        matvec_transposed(&self.a, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_matrix3_factor_error() {
        let a = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 1.0, 0.0, 1.0);
        let f = Matrix3Factor::new(VariableId::new(0), a, Vector3::new(2.0, 3.0, 2.0));
        assert_eq!(f.error_vector(&Vector3::new(1.0, 1.0, 1.0)), Vector3::ZERO);
        assert_eq!(f.error(&Vector3::ZERO), 8.5);
        assert_eq!(f.edges(), &[VariableId::new(0)]);
    }

    #[test]
    fn test_matrix3_factor_adjoint() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..20 {
            let a = Matrix3::from_array(std::array::from_fn(|_| rng.random_range(-2.0..2.0)));
            let f = Matrix3Factor::new(VariableId::new(0), a, Vector3::ZERO);
            let p = Vector3::from_array(std::array::from_fn(|_| rng.random_range(-1.0..1.0)));
            let r = Vector3::from_array(std::array::from_fn(|_| rng.random_range(-1.0..1.0)));
            assert_abs_diff_eq!(
                f.apply_linear_forward(&p).dot(r),
                p.dot(f.apply_linear_transpose(&r)),
                epsilon = 1e-12
            );
        }
    }
}
