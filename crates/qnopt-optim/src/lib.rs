//! Quasi-Newton minimizers.
//!
//! This crate provides the optimization engines built on `qnopt-core`:
//!
//! # Available Optimizers
//!
//! - **L-BFGS**: limited-memory BFGS with a ring buffer of `m` curvature
//!   pairs; switches to OWL-QN when orthant-wise (L1) parameters are set
//! - **dmL-BFGS**: L-BFGS with momentum on the iterate and the direction
//! - **BFGS**: full-memory BFGS with an explicit inverse-Hessian matrix and
//!   a choice of exact, backtracking or pluggable line search
//!
//! [`penalty`] folds inequality and equality constraints into an objective.
//!
//! # Examples
//!
//! ```rust
//! use qnopt_core::prelude::*;
//! use qnopt_optim::{LBFGS, BFGS, BFGSConfig};
//!
//! let mut logic = FnEvaluation::new(|x: &DVector<f64>| {
//!     let r = x - DVector::from_vec(vec![3.0, -1.0]);
//!     Ok((r.dot(&r), r * 2.0))
//! });
//! let x0 = DVector::zeros(2);
//!
//! let mut lbfgs = LBFGS::new(Parameters::default().with_memory(4));
//! assert!(lbfgs.minimize(2, &x0, &mut logic).is_success());
//!
//! let mut bfgs = BFGS::new(BFGSConfig::new());
//! assert!(bfgs.minimize(2, &x0, &mut logic).is_success());
//! ```

pub mod bfgs;
pub mod dm_lbfgs;
pub mod lbfgs;
pub mod penalty;
mod utils;

// Re-export main optimizers for convenience
pub use bfgs::{inverse_hessian_increment, BFGSConfig, BFGSLineSearch, BFGS};
pub use dm_lbfgs::DmLBFGS;
pub use lbfgs::{minimize, History, IterationData, LBFGS};
pub use penalty::{Constraints, PenaltyObjective};

// Re-export commonly used items from core
pub use qnopt_core::{
    optimization::{OptimizationResult, Optimizer},
    params::{LineSearchParams, Parameters},
    ReturnCode,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        BFGSConfig, BFGSLineSearch, Constraints, DmLBFGS, PenaltyObjective, BFGS, LBFGS,
    };
    pub use qnopt_core::prelude::*;
}
