//! Core traits and types for quasi-Newton minimization.
//!
//! This crate provides everything the minimizers in `qnopt-optim` share:
//! the scalar abstraction, the return-code taxonomy, the evaluation
//! contract between a problem and an optimizer, parameter records with
//! validation, the orthant-wise (L1) helpers and the line searches.
//!
//! # Key Concepts
//!
//! - **Evaluation logic**: maps a point to an objective value and gradient,
//!   and observes progress after every accepted iteration
//! - **Line search**: picks a step along a descent direction, or fails with
//!   a typed return code
//! - **Return code**: every run ends with one, success or not; failures are
//!   data, never panics
//!
//! # Modules
//!
//! - [`error`]: return codes and the collaborator error type
//! - [`evaluation`]: evaluation contract and adapters
//! - [`types`]: scalar trait, vector aliases and numerical constants
//! - [`optimization`]: parameters, line searches, result record, optimizer trait

pub mod core;
pub mod optimization;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub use utils::test_functions;

// Re-export core modules at the crate root
pub use crate::core::{error, evaluation, types};
pub use optimization::{line_search, orthantwise, params};

pub use error::{OptimizerError, Result, ReturnCode};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use qnopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::error::{OptimizerError, Result, ReturnCode};
    pub use crate::core::evaluation::{
        CallbackData, CountingEvaluation, EvaluationLogic, FiniteDifference, FnEvaluation,
        FnObjective, Objective, ProgressReport, WithProgress,
    };
    pub use crate::core::types::{constants, DMatrix, DVector, Scalar};
    pub use crate::optimization::{
        BacktrackingArmijo, BacktrackingOrthantWise, BacktrackingStrongWolfe, BacktrackingWolfe,
        LineSearch, LineSearchAlgorithm, LineSearchFailure, LineSearchIncomplete,
        LineSearchOutcome, LineSearchParams, LineSearchStep, LineSearchStrategy, MoreThuente,
        OptimizationResult, Optimizer, OrthantWiseParams, Parameters, Path, PrintProgress,
    };
}
