//! Macro to define a fixed-size vector type.
//!
//! # Arguments
//!
//! * `name` - The name of the vector type.
//! * `dim` - The number of scalars.
//! * `fields` - The fields of the vector, in construction order.
//!
//! Arithmetic is written out slot by slot so results do not depend on any SIMD backend.
macro_rules! define_vector_type {
    ($(#[$meta:meta])* $name:ident, $dim:literal, [$($field:ident),+]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $(
                #[allow(missing_docs)]
                pub $field: f64
            ),+
        }

        impl $name {
            /// Zero vector.
            pub const ZERO: Self = Self {
                $($field: 0.0),+
            };

            /// Create a new vector from its components.
            #[inline]
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: f64),+) -> Self {
                Self { $($field),+ }
            }

            /// Create a vector from an array.
            #[inline]
            pub fn from_array(arr: [f64; $dim]) -> Self {
                let [$($field),+] = arr;
                Self { $($field),+ }
            }

            /// Convert the vector to an array.
            #[inline]
            pub fn to_array(self) -> [f64; $dim] {
                [$(self.$field),+]
            }

            /// Dot product between two vectors.
            #[inline]
            pub fn dot(self, rhs: Self) -> f64 {
                0.0 $(+ self.$field * rhs.$field)+
            }

            /// Squared Euclidean length.
            #[inline]
            pub fn squared_norm(self) -> f64 {
                self.dot(self)
            }
        }

        impl crate::EuclideanVector for $name {
            #[inline]
            fn dot(&self, other: &Self) -> f64 {
                $name::dot(*self, *other)
            }

            #[inline]
            fn scaled(&self, scalar: f64) -> Self {
                *self * scalar
            }

            #[inline]
            fn dimension(&self) -> usize {
                $dim
            }

            #[inline]
            fn move_along(&mut self, direction: &Self) {
                *self += *direction;
            }
        }

        impl crate::FixedSizeVector for $name {
            const DIMENSION: usize = $dim;

            #[inline]
            fn zero() -> Self {
                Self::ZERO
            }

            fn from_scalars(scalars: &[f64]) -> Result<Self, crate::AlgebraError> {
                let arr: [f64; $dim] =
                    scalars
                        .try_into()
                        .map_err(|_| crate::AlgebraError::ShapeMismatch {
                            expected: $dim,
                            actual: scalars.len(),
                        })?;
                Ok(Self::from_array(arr))
            }

            fn to_scalars(&self) -> Vec<f64> {
                self.to_array().to_vec()
            }

            fn standard_basis() -> Vec<Self> {
                (0..$dim)
                    .map(|k| {
                        let mut arr = [0.0; $dim];
                        arr[k] = 1.0;
                        Self::from_array(arr)
                    })
                    .collect()
            }
        }

        // Conversions to and from arrays.
        impl From<[f64; $dim]> for $name {
            #[inline]
            fn from(arr: [f64; $dim]) -> Self {
                Self::from_array(arr)
            }
        }

        impl From<$name> for [f64; $dim] {
            #[inline]
            fn from(v: $name) -> Self {
                v.to_array()
            }
        }

        #[cfg(feature = "approx")]
        impl approx::AbsDiffEq for $name {
            type Epsilon = f64;

            #[inline]
            fn default_epsilon() -> Self::Epsilon {
                <f64 as approx::AbsDiffEq>::default_epsilon()
            }

            #[inline]
            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                true $(&& approx::AbsDiffEq::abs_diff_eq(&self.$field, &other.$field, epsilon))+
            }
        }

        #[cfg(feature = "approx")]
        impl approx::RelativeEq for $name {
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
                true $(&& approx::RelativeEq::relative_eq(
                    &self.$field,
                    &other.$field,
                    epsilon,
                    max_relative,
                ))+
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self::Output {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self::Output {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl std::ops::Mul<f64> for $name {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: f64) -> Self::Output {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl std::ops::Mul<$name> for f64 {
            type Output = $name;

            #[inline]
            fn mul(self, rhs: $name) -> Self::Output {
                $name { $($field: self * rhs.$field),+ }
            }
        }

        impl std::ops::Div<f64> for $name {
            type Output = Self;

            #[inline]
            fn div(self, rhs: f64) -> Self::Output {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self::Output {
                Self { $($field: -self.$field),+ }
            }
        }

        impl std::ops::AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl std::ops::SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$field -= rhs.$field;)+
            }
        }

        impl std::ops::MulAssign<f64> for $name {
            #[inline]
            fn mul_assign(&mut self, rhs: f64) {
                $(self.$field *= rhs;)+
            }
        }

        impl std::ops::DivAssign<f64> for $name {
            #[inline]
            fn div_assign(&mut self, rhs: f64) {
                $(self.$field /= rhs;)+
            }
        }
    };
}

define_vector_type!(
    /// 3D vector (double precision).
    Vector3,
    3,
    [x, y, z]
);

define_vector_type!(
    /// 5D vector (double precision), e.g. a PPCA latent code.
    Vector5,
    5,
    [s0, s1, s2, s3, s4]
);

define_vector_type!(
    /// 9D vector (double precision), the flattened view of a [`crate::Matrix3`].
    Vector9,
    9,
    [s0, s1, s2, s3, s4, s5, s6, s7, s8]
);

impl From<glam::DVec3> for Vector3 {
    #[inline]
    fn from(v: glam::DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for glam::DVec3 {
    #[inline]
    fn from(v: Vector3) -> Self {
        glam::DVec3::new(v.x, v.y, v.z)
    }
}
