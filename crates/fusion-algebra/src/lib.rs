#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Fusion Algebra
//!
//! Dense kernels used by the linearization bridge and the CGLS solver:
//!
//! - Fixed-size vectors ([`Vector3`], [`Vector5`], [`Vector9`]) with exact, slot-ordered
//!   arithmetic.
//! - [`Matrix3`], a 3x3 matrix with row-major construction and a column-major [`Matrix3::vec`]
//!   view, plus [`matvec`], [`matvec_transposed`] and [`matmul`].
//! - Dynamic vectors ([`DVecF64`]) and per-variable [`BlockVector`] increments.
//!
//! Every type implements [`EuclideanVector`], the inner-product contract the solver relies on.
//!
//! ## Example
//!
//! ```rust
//! use fusion_algebra::{matmul, matvec, Matrix3, Vector3};
//!
//! let a = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
//! assert_eq!(matmul(&a, &Matrix3::IDENTITY), a);
//! assert_eq!(matvec(&a, &Vector3::new(1.0, 0.0, 0.0)), Vector3::new(1.0, 4.0, 7.0));
//! ```

mod block;
mod error;
mod matrix3;
mod traits;
mod vector;

pub use block::BlockVector;
pub use error::AlgebraError;
pub use matrix3::{matmul, matvec, matvec_transposed, Matrix3};
pub use traits::{EuclideanVector, FixedSizeVector};
pub use vector::{Vector3, Vector5, Vector9};

/// Dynamic-sized vector with f64 elements.
pub type DVecF64 = nalgebra::DVector<f64>;

/// Dynamic-sized matrix with f64 elements.
pub type DMatF64 = nalgebra::DMatrix<f64>;
