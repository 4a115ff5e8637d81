//! Direction-momentum L-BFGS (dmL-BFGS).
//!
//! Runs the L-BFGS engine with two extra blends controlled by a momentum
//! coefficient `μ ∈ [0, 1)`:
//!
//! ```text
//! x_{k+1} = μ x_k     + (1 - μ) x_ls        (x_ls: point accepted by the line search)
//! d_{k+1} = μ d_k     + (1 - μ) d_two_loop
//! ```
//!
//! The objective is re-evaluated at the blended point so the stored
//! curvature pair matches the iterate. A blended direction that is not a
//! descent direction is discarded in favour of the two-loop direction.
//! With `μ = 0` the trajectory is exactly that of [`LBFGS`].

use qnopt_core::{
    evaluation::EvaluationLogic,
    optimization::{OptimizationResult, Optimizer, Path},
    params::Parameters,
    types::{DVector, Scalar},
};

use crate::lbfgs::LBFGS;

/// L-BFGS with iterate and direction momentum.
#[derive(Debug, Clone)]
pub struct DmLBFGS<T: Scalar> {
    engine: LBFGS<T>,
    momentum: T,
}

impl<T: Scalar> DmLBFGS<T> {
    /// Creates the optimizer. `momentum` is checked when a run starts.
    pub fn new(params: Parameters<T>, momentum: T) -> Self {
        Self {
            engine: LBFGS::new(params),
            momentum,
        }
    }

    /// Sets the momentum coefficient.
    pub fn with_momentum(mut self, momentum: T) -> Self {
        self.momentum = momentum;
        self
    }

    /// Momentum coefficient.
    pub fn momentum(&self) -> T {
        self.momentum
    }

    /// Returns the parameters.
    pub fn params(&self) -> &Parameters<T> {
        self.engine.params()
    }

    /// Points visited by the last run.
    pub fn path(&self) -> &Path<T> {
        self.engine.path()
    }
}

impl<T: Scalar> Optimizer<T> for DmLBFGS<T> {
    fn name(&self) -> &str {
        "dmL-BFGS"
    }

    fn minimize<E>(&mut self, n: usize, x0: &DVector<T>, logic: &mut E) -> OptimizationResult<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        self.engine.run(n, x0, logic, Some(self.momentum))
    }
}
