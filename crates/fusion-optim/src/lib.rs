#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Fusion Optim
//!
//! The numerical core of factor-graph estimation:
//!
//! - [`core::NonlinearFactor`]: an error function over several adjacent variables.
//! - [`linearization::Linearizer`]: turns a nonlinear factor and a variable assignment into a
//!   [`core::LinearizedFactor`], using the factor's own Jacobian when it supplies one and a
//!   [`linearization::Differentiator`] otherwise.
//! - [`core::GaussianFactor`]: the linear-operator contract (forward and adjoint application).
//! - [`solvers::Cgls`]: Conjugate Gradient Least Squares over any Gaussian factor.
//!
//! A typical iteration linearizes at the current estimate, refines a zero increment with CGLS,
//! and writes the increment back into the assignment.
//!
//! ```rust
//! use fusion_algebra::{BlockVector, DVecF64};
//! use fusion_optim::core::{Assignment, GaussianFactor, PriorFactor, Values};
//! use fusion_optim::linearization::Linearizer;
//! use fusion_optim::solvers::Cgls;
//!
//! let mut values = Values::new();
//! let id = values.insert(vec![0.0, 0.0]);
//! let prior = PriorFactor::new(id, DVecF64::from_vec(vec![1.0, -2.0]));
//!
//! let linearized = Linearizer::new().linearize(&prior, &values)?;
//! let mut delta = BlockVector::zeros(&[2]);
//! Cgls::default().optimize(&linearized, &mut delta);
//! values.move_along(linearized.edges(), &delta)?;
//!
//! assert!((values.get(id).unwrap()[0] - 1.0).abs() < 1e-9);
//! # Ok::<(), fusion_optim::core::FactorError>(())
//! ```

pub mod core;
pub mod factors;
pub mod linearization;
pub mod solvers;
