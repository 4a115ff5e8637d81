//! # qnopt
//!
//! Quasi-Newton minimization of smooth functions in Rust.
//!
//! This crate bundles the building blocks from `qnopt-core` with the
//! engines from `qnopt-optim`:
//!
//! - [`LBFGS`]: limited-memory BFGS, or OWL-QN when an L1 term is configured
//! - [`DmLBFGS`]: L-BFGS with momentum on the iterate and the direction
//! - [`BFGS`]: full-memory BFGS with an explicit inverse Hessian
//!
//! Problems are described through [`EvaluationLogic`](qnopt_core::evaluation::EvaluationLogic):
//! a value and a gradient at a point, and an optional progress hook that may
//! cancel the run.
//!
//! ## Quick Start
//!
//! ```rust
//! use qnopt::prelude::*;
//!
//! // f(x, y) = (x + 2y - 7)² + (2x + y - 5)²
//! let mut booth = FnEvaluation::new(|x: &DVector<f64>| {
//!     let a = x[0] + 2.0 * x[1] - 7.0;
//!     let b = 2.0 * x[0] + x[1] - 5.0;
//!     let g = DVector::from_vec(vec![2.0 * a + 4.0 * b, 4.0 * a + 2.0 * b]);
//!     Ok((a * a + b * b, g))
//! });
//!
//! let result = qnopt::minimize(2, &DVector::zeros(2), &mut booth, Parameters::default());
//! assert!(result.is_success());
//! assert!((result.optimized_variables[0] - 1.0).abs() < 1e-4);
//! assert!((result.optimized_variables[1] - 3.0).abs() < 1e-4);
//! ```
//!
//! ## Sparse solutions
//!
//! ```rust
//! use qnopt::prelude::*;
//!
//! // ½‖x - b‖² + 0.5‖x‖₁
//! let b = DVector::from_vec(vec![2.0, 0.1, -0.3]);
//! let mut logic = FnEvaluation::new(move |x: &DVector<f64>| {
//!     let r = x - &b;
//!     Ok((0.5 * r.dot(&r), r))
//! });
//!
//! let mut owlqn = LBFGS::new(Parameters::orthant_wise(OrthantWiseParams::new(0.5)));
//! let result = owlqn.minimize(3, &DVector::zeros(3), &mut logic);
//! assert!(result.is_success());
//! assert_eq!(result.optimized_variables[1], 0.0);
//! assert_eq!(result.optimized_variables[2], 0.0);
//! ```

// Re-export core functionality
pub use qnopt_core;
pub use qnopt_optim;
pub use nalgebra;

pub use qnopt_core::{OptimizerError, Result, ReturnCode};
pub use qnopt_optim::{minimize, BFGSConfig, BFGSLineSearch, DmLBFGS, BFGS, LBFGS};

/// Prelude module for convenient imports
pub mod prelude {
    pub use qnopt_optim::minimize;
    pub use qnopt_optim::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_reaches_every_engine() {
        let mut logic = FnEvaluation::new(|x: &DVector<f64>| {
            let r = x - DVector::from_vec(vec![1.0, 2.0]);
            Ok((r.dot(&r), r * 2.0))
        });
        let x0 = DVector::zeros(2);

        let engines: Vec<OptimizationResult<f64>> = vec![
            LBFGS::with_default_config().minimize(2, &x0, &mut logic),
            DmLBFGS::new(Parameters::default(), 0.25).minimize(2, &x0, &mut logic),
            BFGS::with_default_config().minimize(2, &x0, &mut logic),
        ];
        for result in engines {
            assert!(result.is_success(), "{}", result.return_code);
        }
    }
}
