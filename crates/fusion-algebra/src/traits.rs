//! Vector-space contracts shared by every algebraic type.

use std::fmt::Debug;
use std::ops::{Add, Sub};

use crate::{AlgebraError, DVecF64};

/// An element of a real inner-product space.
///
/// This is the bookkeeping the CGLS solver needs from both the input (tangent) space and the
/// error space of a linear operator. Each implementation is its own tangent space: moving along
/// a direction is component-wise addition.
pub trait EuclideanVector: Clone + Debug + Add<Output = Self> + Sub<Output = Self> {
    /// Sum of element-wise products.
    fn dot(&self, other: &Self) -> f64;

    /// Squared Euclidean norm, `self · self`.
    fn squared_norm(&self) -> f64 {
        self.dot(self)
    }

    /// Returns `self` multiplied by `scalar`.
    fn scaled(&self, scalar: f64) -> Self;

    /// Number of scalars in the vector.
    fn dimension(&self) -> usize;

    /// Moves `self` along `direction` (component-wise addition).
    fn move_along(&mut self, direction: &Self) {
        *self = self.clone() + direction.clone();
    }
}

/// A vector whose dimension is fixed at the type level.
pub trait FixedSizeVector: EuclideanVector + Copy {
    /// Number of scalars held by the type.
    const DIMENSION: usize;

    /// The additive identity.
    fn zero() -> Self;

    /// Builds the vector from its scalars in construction order.
    ///
    /// # Errors
    ///
    /// Returns [`AlgebraError::ShapeMismatch`] if `scalars.len() != Self::DIMENSION`.
    fn from_scalars(scalars: &[f64]) -> Result<Self, AlgebraError>;

    /// The scalars in construction order, such that `from_scalars(&v.to_scalars()) == v`.
    fn to_scalars(&self) -> Vec<f64>;

    /// The canonical basis: `DIMENSION` elements, element `k` holding a single unit scalar at
    /// construction position `k`.
    fn standard_basis() -> Vec<Self>;
}

impl EuclideanVector for DVecF64 {
    #[inline]
    fn dot(&self, other: &Self) -> f64 {
        nalgebra::Matrix::dot(self, other)
    }

    #[inline]
    fn squared_norm(&self) -> f64 {
        self.norm_squared()
    }

    #[inline]
    fn scaled(&self, scalar: f64) -> Self {
        self.scale(scalar)
    }

    #[inline]
    fn dimension(&self) -> usize {
        self.len()
    }

    #[inline]
    fn move_along(&mut self, direction: &Self) {
        *self += direction;
    }
}
