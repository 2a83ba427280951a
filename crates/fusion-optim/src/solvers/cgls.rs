//! Conjugate Gradient Least Squares.
//!
//! Minimizes `‖A x - b‖²` for a [`GaussianFactor`] through forward and transpose applications of
//! `A` only. The normal-equations matrix `AᵀA` is never formed.

use fusion_algebra::EuclideanVector;

use crate::core::GaussianFactor;

/// CGLS configuration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CglsConfig {
    /// Threshold on the squared magnitude of the last update, `α²‖p‖²`.
    pub precision: f64,
    /// Ceiling on the step counter, shared by every call on one solver.
    pub max_iteration: usize,
}

impl Default for CglsConfig {
    fn default() -> Self {
        Self {
            precision: 1e-10,
            max_iteration: 400,
        }
    }
}

/// Where a solve stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CglsState {
    /// No solve has run since creation or the last reset.
    Initializing,
    /// A solve is in progress.
    Iterating,
    /// The update magnitude became negligible, or the problem was trivially solved.
    Converged,
    /// The step counter reached `max_iteration`. The estimate is the best one available.
    MaxIterationsReached,
}

/// Outcome of one call to [`Cgls::optimize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CglsSummary {
    /// Final state of the solve.
    pub state: CglsState,
    /// Loop iterations run by this call.
    pub iterations: usize,
    /// Value of the solver's step counter on return.
    pub step: usize,
    /// Whether a zero denominator (`gamma` or `‖q‖²`) ended the solve.
    pub trivial: bool,
}

/// A CGLS solver.
///
/// The step counter persists across calls to [`Cgls::optimize`] on the same instance, so repeated
/// solves share one `max_iteration` budget. Call [`Cgls::reset`] to start over.
///
/// # Example
///
/// ```
/// use fusion_algebra::{Matrix3, Vector3};
/// use fusion_optim::core::{Matrix3Factor, VariableId};
/// use fusion_optim::solvers::{Cgls, CglsState};
///
/// let a = Matrix3::new(4.0, 1.0, 0.0, 1.0, 3.0, 0.0, 0.0, 0.0, 2.0);
/// let factor = Matrix3Factor::new(VariableId::new(0), a, Vector3::new(1.0, 2.0, 3.0));
///
/// let mut x = Vector3::ZERO;
/// let summary = Cgls::default().optimize(&factor, &mut x);
/// assert_eq!(summary.state, CglsState::Converged);
/// ```
#[derive(Debug, Clone)]
pub struct Cgls {
    /// Solver configuration.
    pub config: CglsConfig,
    step: usize,
    state: CglsState,
}

impl Default for Cgls {
    fn default() -> Self {
        Self::new(CglsConfig::default())
    }
}

impl Cgls {
    /// Create a solver with a zeroed step counter.
    pub fn new(config: CglsConfig) -> Self {
        Self {
            config,
            step: 0,
            state: CglsState::Initializing,
        }
    }

    /// The step counter.
    pub fn step(&self) -> usize {
        self.step
    }

    /// The state reached by the last solve.
    pub fn state(&self) -> CglsState {
        self.state
    }

    /// Zero the step counter.
    pub fn reset(&mut self) {
        self.step = 0;
        self.state = CglsState::Initializing;
    }

    /// Refine `initial` towards the least-squares minimum of `factor`.
    ///
    /// `initial` is overwritten with the refined estimate. Running out of iterations is not an
    /// error: the best estimate is still written back and a warning is logged.
    pub fn optimize<F>(&mut self, factor: &F, initial: &mut F::InputVector) -> CglsSummary
    where
        F: GaussianFactor + ?Sized,
    {
        self.step += 1;
        self.state = CglsState::Initializing;

        let mut x = initial.clone();
        let mut r = factor.error_vector(&x).scaled(-1.0);
        let mut s = factor.apply_linear_transpose(&r);
        let mut p = s.clone();
        let mut gamma = s.squared_norm();

        if gamma == 0.0 {
            log::debug!("CGLS: gradient vanishes at the initial estimate");
            return self.finish(CglsState::Converged, 0, true);
        }

        self.state = CglsState::Iterating;
        let mut iterations = 0;

        while self.step < self.config.max_iteration {
            iterations += 1;

            let q = factor.apply_linear_forward(&p);
            let q_norm = q.squared_norm();
            if q_norm == 0.0 {
                log::debug!("CGLS: search direction in the null space at step {}", self.step);
                *initial = x;
                return self.finish(CglsState::Converged, iterations, true);
            }

            let alpha = gamma / q_norm;
            x.move_along(&p.scaled(alpha));
            r = r - q.scaled(alpha);
            s = factor.apply_linear_transpose(&r);

            let gamma_next = s.squared_norm();
            let beta = gamma_next / gamma;
            gamma = gamma_next;
            p = s.clone() + p.scaled(beta);

            let update = alpha * alpha * p.squared_norm();
            log::debug!(
                "CGLS step {}: alpha {:e}, gamma {:e}, update {:e}",
                self.step,
                alpha,
                gamma,
                update
            );

            if update < self.config.precision {
                log::warn!(
                    "CGLS: early exit at step {} with update {:e} below precision {:e}",
                    self.step,
                    update,
                    self.config.precision
                );
                *initial = x;
                return self.finish(CglsState::Converged, iterations, false);
            }

            self.step += 1;
        }

        log::warn!(
            "CGLS: reached max_iteration {} without converging",
            self.config.max_iteration
        );
        *initial = x;
        self.finish(CglsState::MaxIterationsReached, iterations, false)
    }

    fn finish(&mut self, state: CglsState, iterations: usize, trivial: bool) -> CglsSummary {
        self.state = state;
        CglsSummary {
            state,
            iterations,
            step: self.step,
            trivial,
        }
    }
}
