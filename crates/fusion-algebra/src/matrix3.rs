//! 3x3 matrix (double precision).
//!
//! Scalars are stored in nine named slots in row-major semantic order. Construction from a flat
//! sequence ([`Matrix3::from_array`], [`Matrix3::from_scalars`]) is row-major, while the flat
//! [`Matrix3::vec`] view is column-major (columns concatenated). Jacobians are assembled column by
//! column, so the two orders must never be swapped.

use std::ops::{Index, IndexMut};

use crate::{AlgebraError, EuclideanVector, FixedSizeVector, Vector3, Vector9};

/// 3x3 matrix (double precision).
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Matrix3 {
    s00: f64,
    s01: f64,
    s02: f64,
    s10: f64,
    s11: f64,
    s12: f64,
    s20: f64,
    s21: f64,
    s22: f64,
}

impl Matrix3 {
    /// Number of rows.
    pub const ROW_COUNT: usize = 3;

    /// Number of columns.
    pub const COLUMN_COUNT: usize = 3;

    /// The additive identity.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    /// The multiplicative identity for [`matmul`].
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);

    /// Create a matrix from its entries in row-major order.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        s00: f64,
        s01: f64,
        s02: f64,
        s10: f64,
        s11: f64,
        s12: f64,
        s20: f64,
        s21: f64,
        s22: f64,
    ) -> Self {
        Self {
            s00,
            s01,
            s02,
            s10,
            s11,
            s12,
            s20,
            s21,
            s22,
        }
    }

    /// Create a matrix from a row-major array.
    #[inline]
    pub fn from_array(arr: [f64; 9]) -> Self {
        let [s00, s01, s02, s10, s11, s12, s20, s21, s22] = arr;
        Self::new(s00, s01, s02, s10, s11, s12, s20, s21, s22)
    }

    /// Convert the matrix to a row-major array.
    #[inline]
    pub fn to_array(self) -> [f64; 9] {
        [
            self.s00, self.s01, self.s02, self.s10, self.s11, self.s12, self.s20, self.s21,
            self.s22,
        ]
    }

    /// Create a matrix by stacking three rows.
    #[inline]
    pub fn from_rows(row0: Vector3, row1: Vector3, row2: Vector3) -> Self {
        Self::new(
            row0.x, row0.y, row0.z, row1.x, row1.y, row1.z, row2.x, row2.y, row2.z,
        )
    }

    /// Create a matrix from three columns.
    #[inline]
    pub fn from_columns(col0: Vector3, col1: Vector3, col2: Vector3) -> Self {
        Self::new(
            col0.x, col1.x, col2.x, col0.y, col1.y, col2.y, col0.z, col1.z, col2.z,
        )
    }

    /// Returns row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i > 2`.
    pub fn row(&self, i: usize) -> Vector3 {
        Vector3::new(self[(i, 0)], self[(i, 1)], self[(i, 2)])
    }

    /// Returns column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j > 2`.
    pub fn column(&self, j: usize) -> Vector3 {
        Vector3::new(self[(0, j)], self[(1, j)], self[(2, j)])
    }

    /// The matrix as a flat vector in column-major order.
    #[inline]
    pub fn vec(&self) -> Vector9 {
        Vector9::new(
            self.s00, self.s10, self.s20, self.s01, self.s11, self.s21, self.s02, self.s12,
            self.s22,
        )
    }

    /// Inverse of [`Matrix3::vec`]: builds a matrix from a column-major flat vector.
    #[inline]
    pub fn from_vec(v: Vector9) -> Self {
        Self::new(v.s0, v.s3, v.s6, v.s1, v.s4, v.s7, v.s2, v.s5, v.s8)
    }

    /// Returns the transpose.
    #[inline]
    pub fn transposed(&self) -> Self {
        Self::new(
            self.s00, self.s10, self.s20, self.s01, self.s11, self.s21, self.s02, self.s12,
            self.s22,
        )
    }

    /// Returns the entry at `(row, col)`, or `None` when out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.slot(row, col).copied()
    }

    /// Sum of element-wise products.
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.s00 * other.s00
            + self.s01 * other.s01
            + self.s02 * other.s02
            + self.s10 * other.s10
            + self.s11 * other.s11
            + self.s12 * other.s12
            + self.s20 * other.s20
            + self.s21 * other.s21
            + self.s22 * other.s22
    }

    fn slot(&self, row: usize, col: usize) -> Option<&f64> {
        match (row, col) {
            (0, 0) => Some(&self.s00),
            (0, 1) => Some(&self.s01),
            (0, 2) => Some(&self.s02),
            (1, 0) => Some(&self.s10),
            (1, 1) => Some(&self.s11),
            (1, 2) => Some(&self.s12),
            (2, 0) => Some(&self.s20),
            (2, 1) => Some(&self.s21),
            (2, 2) => Some(&self.s22),
            _ => None,
        }
    }

    fn slot_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        match (row, col) {
            (0, 0) => Some(&mut self.s00),
            (0, 1) => Some(&mut self.s01),
            (0, 2) => Some(&mut self.s02),
            (1, 0) => Some(&mut self.s10),
            (1, 1) => Some(&mut self.s11),
            (1, 2) => Some(&mut self.s12),
            (2, 0) => Some(&mut self.s20),
            (2, 1) => Some(&mut self.s21),
            (2, 2) => Some(&mut self.s22),
            _ => None,
        }
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_array(self.to_array().map(f))
    }

    fn zip_map(self, rhs: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let a = self.to_array();
        let b = rhs.to_array();
        Self::from_array(std::array::from_fn(|i| f(a[i], b[i])))
    }
}

/// Matrix-vector product `lhs * rhs`.
#[inline]
pub fn matvec(lhs: &Matrix3, rhs: &Vector3) -> Vector3 {
    Vector3::new(
        lhs.s00 * rhs.x + lhs.s01 * rhs.y + lhs.s02 * rhs.z,
        lhs.s10 * rhs.x + lhs.s11 * rhs.y + lhs.s12 * rhs.z,
        lhs.s20 * rhs.x + lhs.s21 * rhs.y + lhs.s22 * rhs.z,
    )
}

/// Transposed matrix-vector product `lhsᵀ * rhs`, computed without forming the transpose.
///
/// Bit-identical to `matvec(&lhs.transposed(), rhs)`.
#[inline]
pub fn matvec_transposed(lhs: &Matrix3, rhs: &Vector3) -> Vector3 {
    Vector3::new(
        lhs.s00 * rhs.x + lhs.s10 * rhs.y + lhs.s20 * rhs.z,
        lhs.s01 * rhs.x + lhs.s11 * rhs.y + lhs.s21 * rhs.z,
        lhs.s02 * rhs.x + lhs.s12 * rhs.y + lhs.s22 * rhs.z,
    )
}

/// Matrix product `lhs * rhs`.
///
/// Applies `lhs` to each column of `rhs` and reassembles the columns, so the rounding matches
/// applying the linear map column by column.
pub fn matmul(lhs: &Matrix3, rhs: &Matrix3) -> Matrix3 {
    let v0 = matvec(lhs, &rhs.column(0));
    let v1 = matvec(lhs, &rhs.column(1));
    let v2 = matvec(lhs, &rhs.column(2));
    Matrix3::from_columns(v0, v1, v2)
}

impl Index<(usize, usize)> for Matrix3 {
    type Output = f64;

    /// # Panics
    ///
    /// Panics if `row` or `col` is out of `0..3`.
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        match self.slot(row, col) {
            Some(value) => value,
            None => panic!("Matrix3 index ({row}, {col}) out of range"),
        }
    }
}

impl IndexMut<(usize, usize)> for Matrix3 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        match self.slot_mut(row, col) {
            Some(value) => value,
            None => panic!("Matrix3 index ({row}, {col}) out of range"),
        }
    }
}

impl EuclideanVector for Matrix3 {
    #[inline]
    fn dot(&self, other: &Self) -> f64 {
        Matrix3::dot(self, other)
    }

    #[inline]
    fn scaled(&self, scalar: f64) -> Self {
        *self * scalar
    }

    #[inline]
    fn dimension(&self) -> usize {
        9
    }

    #[inline]
    fn move_along(&mut self, direction: &Self) {
        *self += *direction;
    }
}

impl FixedSizeVector for Matrix3 {
    const DIMENSION: usize = 9;

    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    /// Builds the matrix from nine scalars in row-major order.
    fn from_scalars(scalars: &[f64]) -> Result<Self, AlgebraError> {
        let arr: [f64; 9] = scalars
            .try_into()
            .map_err(|_| AlgebraError::ShapeMismatch {
                expected: 9,
                actual: scalars.len(),
            })?;
        Ok(Self::from_array(arr))
    }

    fn to_scalars(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }

    /// Element `k` has its unit entry at `(k / 3, k % 3)`.
    fn standard_basis() -> Vec<Self> {
        (0..9)
            .map(|k| {
                let mut basis = Self::ZERO;
                basis[(k / 3, k % 3)] = 1.0;
                basis
            })
            .collect()
    }
}

impl std::ops::Add for Matrix3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl std::ops::Sub for Matrix3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl std::ops::Neg for Matrix3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        self.map(|a| -a)
    }
}

impl std::ops::Mul<f64> for Matrix3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|a| a * rhs)
    }
}

impl std::ops::Mul<Matrix3> for f64 {
    type Output = Matrix3;

    #[inline]
    fn mul(self, rhs: Matrix3) -> Self::Output {
        rhs.map(|a| self * a)
    }
}

impl std::ops::Div<f64> for Matrix3 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self::Output {
        self.map(|a| a / rhs)
    }
}

impl std::ops::Mul<Matrix3> for Matrix3 {
    type Output = Matrix3;

    #[inline]
    fn mul(self, rhs: Matrix3) -> Self::Output {
        matmul(&self, &rhs)
    }
}

impl std::ops::Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Vector3) -> Self::Output {
        matvec(&self, &rhs)
    }
}

impl std::ops::AddAssign for Matrix3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::SubAssign for Matrix3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::ops::MulAssign<f64> for Matrix3 {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl std::ops::DivAssign<f64> for Matrix3 {
    #[inline]
    fn div_assign(&mut self, rhs: f64) {
        *self = *self / rhs;
    }
}

// glam stores matrices column-major, the same order as `vec`.
impl From<glam::DMat3> for Matrix3 {
    #[inline]
    fn from(m: glam::DMat3) -> Self {
        Self::from_vec(Vector9::from_array(m.to_cols_array()))
    }
}

impl From<Matrix3> for glam::DMat3 {
    #[inline]
    fn from(m: Matrix3) -> Self {
        glam::DMat3::from_cols_array(&m.vec().to_array())
    }
}

#[cfg(feature = "approx")]
impl approx::AbsDiffEq for Matrix3 {
    type Epsilon = f64;

    #[inline]
    fn default_epsilon() -> Self::Epsilon {
        <f64 as approx::AbsDiffEq>::default_epsilon()
    }

    #[inline]
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| approx::AbsDiffEq::abs_diff_eq(a, b, epsilon))
    }
}

#[cfg(feature = "approx")]
impl approx::RelativeEq for Matrix3 {
    #[inline]
    fn default_max_relative() -> Self::Epsilon {
        <f64 as approx::RelativeEq>::default_max_relative()
    }

    #[inline]
    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| approx::RelativeEq::relative_eq(a, b, epsilon, max_relative))
    }
}
