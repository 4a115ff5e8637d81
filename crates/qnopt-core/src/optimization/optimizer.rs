//! Result record and the common optimizer interface.
//!
//! Every engine returns an [`OptimizationResult`] instead of an error: the
//! return code says how the run ended and the caller decides what to trust.
//! On failure `optimized_variables` and `final_function_value` describe the
//! last accepted point, not a minimizer.

use crate::{
    core::evaluation::EvaluationLogic,
    error::{OptimizerError, ReturnCode},
    types::{DVector, Scalar},
};
use std::fmt::Debug;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Last accepted point when a line search fails.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSearchIncomplete<T: Scalar> {
    /// Point the failed line search started from
    pub variable_values: DVector<T>,
    /// Objective at that point
    pub function_value: T,
}

/// Terminal outcome of a run.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T: Scalar> {
    /// How the run ended
    pub return_code: ReturnCode,

    /// Final point, or the last accepted point on failure
    pub optimized_variables: DVector<T>,

    /// Objective at `optimized_variables`, absent when nothing was evaluated
    pub final_function_value: Option<T>,

    /// Diagnostics of a failed line search
    pub line_search_incomplete: Option<LineSearchIncomplete<T>>,

    /// Number of completed iterations
    pub iterations: usize,

    /// Number of calls into the evaluation logic
    pub evaluations: usize,

    /// Wall-clock time of the run
    pub duration: Duration,
}

impl<T: Scalar> OptimizationResult<T> {
    /// Creates a result with no evaluations recorded.
    pub fn new(return_code: ReturnCode, optimized_variables: DVector<T>, duration: Duration) -> Self {
        Self {
            return_code,
            optimized_variables,
            final_function_value: None,
            line_search_incomplete: None,
            iterations: 0,
            evaluations: 0,
            duration,
        }
    }

    /// Result of a run rejected before the first evaluation.
    pub fn rejected(return_code: ReturnCode, x0: &DVector<T>) -> Self {
        Self::new(return_code, x0.clone(), Duration::ZERO)
    }

    /// Sets the final objective value.
    pub fn with_final_value(mut self, value: T) -> Self {
        self.final_function_value = Some(value);
        self
    }

    /// Attaches the diagnostics of a failed line search.
    pub fn with_line_search_incomplete(mut self, x: DVector<T>, f: T) -> Self {
        self.line_search_incomplete = Some(LineSearchIncomplete {
            variable_values: x,
            function_value: f,
        });
        self
    }

    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the evaluation count.
    pub fn with_evaluations(mut self, evaluations: usize) -> Self {
        self.evaluations = evaluations;
        self
    }

    /// Returns `true` when the return code belongs to the success family.
    pub fn is_success(&self) -> bool {
        self.return_code.is_success()
    }

    /// Converts a failed run into an error, for `?`-style callers.
    pub fn into_result(self) -> Result<Self, OptimizerError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(OptimizerError::Terminated {
                code: self.return_code,
            })
        }
    }
}

/// Common interface of the minimizers.
pub trait Optimizer<T>: Debug
where
    T: Scalar,
{
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Minimizes the objective provided by `logic`, starting from `x0`.
    ///
    /// `n` is the problem dimension and must equal `x0.len()`. Invalid
    /// configurations are reported through the return code before any
    /// evaluation.
    fn minimize<E>(&mut self, n: usize, x0: &DVector<T>, logic: &mut E) -> OptimizationResult<T>
    where
        E: EvaluationLogic<T> + ?Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let result = OptimizationResult::new(ReturnCode::MinimumStep, x.clone(), Duration::ZERO)
            .with_final_value(3.0)
            .with_line_search_incomplete(x.clone(), 3.0)
            .with_iterations(4)
            .with_evaluations(9);

        assert!(!result.is_success());
        assert_eq!(result.final_function_value, Some(3.0));
        assert_eq!(result.iterations, 4);
        let incomplete = result.line_search_incomplete.clone().unwrap();
        assert_eq!(incomplete.variable_values, x);

        let err = result.into_result().unwrap_err();
        assert_eq!(err.return_code(), ReturnCode::MinimumStep);
    }

    #[test]
    fn test_rejected_has_no_value() {
        let x0 = DVector::from_vec(vec![0.5]);
        let result = OptimizationResult::<f64>::rejected(ReturnCode::InvalidN, &x0);
        assert_eq!(result.final_function_value, None);
        assert_eq!(result.evaluations, 0);
        assert_eq!(result.optimized_variables, x0);
        assert!(result.into_result().is_err());
    }
}
