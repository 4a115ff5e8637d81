//! Return codes and error types for quasi-Newton minimization.
//!
//! Every solve entry point reports its outcome as a [`ReturnCode`]. The
//! taxonomy has three families: success codes, parameter-validation codes
//! (detected before any evaluation) and runtime codes (raised by a line
//! search, by the engine, or by a collaborator).
//!
//! [`OptimizerError`] is the error type raised by collaborators such as
//! evaluation callbacks. It always maps back onto a return code, so the
//! engines can report it as data instead of propagating it.

use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of an optimization run or of a line search.
///
/// The numeric values returned by [`ReturnCode::code`] follow the
/// liblbfgs convention so results can be compared with C tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReturnCode {
    /// The gradient-norm convergence test was satisfied.
    Success,
    /// The relative objective-decrease test stopped the run.
    Stop,
    /// The initial point already satisfies the convergence test.
    AlreadyMinimized,

    /// The problem dimension is zero or does not match the start point.
    InvalidN,
    /// The history depth `m` is zero.
    InvalidMemory,
    /// `epsilon` is negative or NaN.
    InvalidEpsilon,
    /// The test period `past` cannot be used with the given `delta`.
    InvalidTestPeriod,
    /// `delta` is negative or NaN.
    InvalidDelta,
    /// The requested line search cannot be used with these parameters.
    InvalidLineSearch,
    /// `min_step` is negative or NaN.
    InvalidMinStep,
    /// `max_step` is smaller than `min_step`.
    InvalidMaxStep,
    /// `ftol` is negative or NaN.
    InvalidFTOL,
    /// `wolfe` is not in `(ftol, 1)` for a Wolfe backtracking search.
    InvalidWolfe,
    /// `gtol` is negative or NaN.
    InvalidGTOL,
    /// `xtol` is negative or NaN.
    InvalidXTOL,
    /// `max_line_search` is zero.
    InvalidMaxLineSearch,
    /// The orthant-wise coefficient is negative, or missing for the orthant-wise search.
    InvalidOrthantwise,
    /// The orthant-wise start index is out of range.
    InvalidOrthantwiseStart,
    /// The orthant-wise end index is out of range.
    InvalidOrthantwiseEnd,
    /// The momentum coefficient is outside `[0, 1)`.
    InvalidMomentum,

    /// An unclassified failure, including a failing evaluation callback.
    UnknownError,
    /// A collaborator broke the evaluation contract.
    LogicError,
    /// Storage for the history or the inverse Hessian could not be allocated.
    OutOfMemory,
    /// The progress callback requested termination.
    Canceled,
    /// Rounding errors prevent further progress.
    RoundingError,
    /// A trial step left the interval of uncertainty.
    OutOfInterval,
    /// The interval bounds of a More-Thuente step are inconsistent.
    IncorrectTMinMax,
    /// The line-search step became smaller than `min_step`.
    MinimumStep,
    /// The line-search step became larger than `max_step`.
    MaximumStep,
    /// The line search reached `max_line_search` evaluations.
    MaximumLineSearch,
    /// The run reached `max_iterations`.
    MaximumIteration,
    /// The relative width of the interval of uncertainty fell below `xtol`.
    WidthTooSmall,
    /// The line search received an invalid initial step.
    InvalidParameters,
    /// The search direction does not decrease the objective.
    IncreaseGradient,
}

impl ReturnCode {
    /// Every return code, success family first.
    pub const ALL: [ReturnCode; 34] = [
        ReturnCode::Success,
        ReturnCode::Stop,
        ReturnCode::AlreadyMinimized,
        ReturnCode::InvalidN,
        ReturnCode::InvalidMemory,
        ReturnCode::InvalidEpsilon,
        ReturnCode::InvalidTestPeriod,
        ReturnCode::InvalidDelta,
        ReturnCode::InvalidLineSearch,
        ReturnCode::InvalidMinStep,
        ReturnCode::InvalidMaxStep,
        ReturnCode::InvalidFTOL,
        ReturnCode::InvalidWolfe,
        ReturnCode::InvalidGTOL,
        ReturnCode::InvalidXTOL,
        ReturnCode::InvalidMaxLineSearch,
        ReturnCode::InvalidOrthantwise,
        ReturnCode::InvalidOrthantwiseStart,
        ReturnCode::InvalidOrthantwiseEnd,
        ReturnCode::InvalidMomentum,
        ReturnCode::UnknownError,
        ReturnCode::LogicError,
        ReturnCode::OutOfMemory,
        ReturnCode::Canceled,
        ReturnCode::RoundingError,
        ReturnCode::OutOfInterval,
        ReturnCode::IncorrectTMinMax,
        ReturnCode::MinimumStep,
        ReturnCode::MaximumStep,
        ReturnCode::MaximumLineSearch,
        ReturnCode::MaximumIteration,
        ReturnCode::WidthTooSmall,
        ReturnCode::InvalidParameters,
        ReturnCode::IncreaseGradient,
    ];

    /// Returns `true` for `Success`, `Stop` and `AlreadyMinimized`.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ReturnCode::Success | ReturnCode::Stop | ReturnCode::AlreadyMinimized
        )
    }

    /// Returns `true` for codes produced by parameter validation.
    pub fn is_validation_error(self) -> bool {
        matches!(
            self,
            ReturnCode::InvalidN
                | ReturnCode::InvalidMemory
                | ReturnCode::InvalidEpsilon
                | ReturnCode::InvalidTestPeriod
                | ReturnCode::InvalidDelta
                | ReturnCode::InvalidLineSearch
                | ReturnCode::InvalidMinStep
                | ReturnCode::InvalidMaxStep
                | ReturnCode::InvalidFTOL
                | ReturnCode::InvalidWolfe
                | ReturnCode::InvalidGTOL
                | ReturnCode::InvalidXTOL
                | ReturnCode::InvalidMaxLineSearch
                | ReturnCode::InvalidOrthantwise
                | ReturnCode::InvalidOrthantwiseStart
                | ReturnCode::InvalidOrthantwiseEnd
                | ReturnCode::InvalidMomentum
        )
    }

    /// Stable numeric value of the code.
    pub fn code(self) -> i32 {
        match self {
            ReturnCode::Success => 0,
            ReturnCode::Stop => 1,
            ReturnCode::AlreadyMinimized => 2,
            ReturnCode::UnknownError => -1024,
            ReturnCode::LogicError => -1023,
            ReturnCode::OutOfMemory => -1022,
            ReturnCode::Canceled => -1021,
            ReturnCode::InvalidN => -1020,
            ReturnCode::InvalidEpsilon => -1017,
            ReturnCode::InvalidTestPeriod => -1016,
            ReturnCode::InvalidDelta => -1015,
            ReturnCode::InvalidLineSearch => -1014,
            ReturnCode::InvalidMinStep => -1013,
            ReturnCode::InvalidMaxStep => -1012,
            ReturnCode::InvalidFTOL => -1011,
            ReturnCode::InvalidWolfe => -1010,
            ReturnCode::InvalidGTOL => -1009,
            ReturnCode::InvalidXTOL => -1008,
            ReturnCode::InvalidMaxLineSearch => -1007,
            ReturnCode::InvalidOrthantwise => -1006,
            ReturnCode::InvalidOrthantwiseStart => -1005,
            ReturnCode::InvalidOrthantwiseEnd => -1004,
            ReturnCode::OutOfInterval => -1003,
            ReturnCode::IncorrectTMinMax => -1002,
            ReturnCode::RoundingError => -1001,
            ReturnCode::MinimumStep => -1000,
            ReturnCode::MaximumStep => -999,
            ReturnCode::MaximumLineSearch => -998,
            ReturnCode::MaximumIteration => -997,
            ReturnCode::WidthTooSmall => -996,
            ReturnCode::InvalidParameters => -995,
            ReturnCode::IncreaseGradient => -994,
            ReturnCode::InvalidMomentum => -993,
            ReturnCode::InvalidMemory => -992,
        }
    }

    /// Human readable description of the code.
    pub fn description(self) -> &'static str {
        match self {
            ReturnCode::Success => "the convergence test was satisfied",
            ReturnCode::Stop => "the objective decrease test stopped the run",
            ReturnCode::AlreadyMinimized => "the initial point is already a minimizer",
            ReturnCode::InvalidN => "invalid number of variables",
            ReturnCode::InvalidMemory => "invalid history depth m",
            ReturnCode::InvalidEpsilon => "invalid parameter epsilon",
            ReturnCode::InvalidTestPeriod => "invalid parameter past",
            ReturnCode::InvalidDelta => "invalid parameter delta",
            ReturnCode::InvalidLineSearch => "invalid line search algorithm",
            ReturnCode::InvalidMinStep => "invalid parameter min_step",
            ReturnCode::InvalidMaxStep => "invalid parameter max_step",
            ReturnCode::InvalidFTOL => "invalid parameter ftol",
            ReturnCode::InvalidWolfe => "invalid parameter wolfe",
            ReturnCode::InvalidGTOL => "invalid parameter gtol",
            ReturnCode::InvalidXTOL => "invalid parameter xtol",
            ReturnCode::InvalidMaxLineSearch => "invalid parameter max_line_search",
            ReturnCode::InvalidOrthantwise => "invalid orthant-wise coefficient",
            ReturnCode::InvalidOrthantwiseStart => "invalid orthant-wise start index",
            ReturnCode::InvalidOrthantwiseEnd => "invalid orthant-wise end index",
            ReturnCode::InvalidMomentum => "momentum must lie in [0, 1)",
            ReturnCode::UnknownError => "unknown error",
            ReturnCode::LogicError => "logic error",
            ReturnCode::OutOfMemory => "insufficient memory",
            ReturnCode::Canceled => "the minimization was canceled",
            ReturnCode::RoundingError => "rounding errors prevent further progress",
            ReturnCode::OutOfInterval => "the step went out of the interval of uncertainty",
            ReturnCode::IncorrectTMinMax => "the interval of uncertainty became inconsistent",
            ReturnCode::MinimumStep => "the line-search step became smaller than min_step",
            ReturnCode::MaximumStep => "the line-search step became larger than max_step",
            ReturnCode::MaximumLineSearch => "the line search reached max_line_search evaluations",
            ReturnCode::MaximumIteration => "the run reached max_iterations",
            ReturnCode::WidthTooSmall => "the interval of uncertainty is narrower than xtol",
            ReturnCode::InvalidParameters => "the line search received invalid parameters",
            ReturnCode::IncreaseGradient => "the search direction increases the objective",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Errors raised by collaborators of the optimizers.
#[derive(Debug, Clone, Error)]
pub enum OptimizerError {
    /// The evaluation callback failed.
    ///
    /// User callbacks return this when the objective cannot be computed
    /// at the requested point.
    #[error("Evaluation failed: {reason}")]
    EvaluationFailed {
        /// Description of why the evaluation failed
        reason: String,
    },

    /// Dimension mismatch between vectors.
    ///
    /// Raised when a callback returns a gradient whose length differs from
    /// the problem dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Storage for the optimizer state could not be allocated.
    #[error("Allocation of {elements} elements failed")]
    AllocationFailed {
        /// Number of scalars requested
        elements: usize,
    },

    /// The run ended with a non-success return code.
    #[error("Optimization terminated: {code}")]
    Terminated {
        /// The terminal return code
        code: ReturnCode,
    },
}

impl OptimizerError {
    /// Create an EvaluationFailed error with a custom reason.
    pub fn evaluation_failed<S: Into<String>>(reason: S) -> Self {
        Self::EvaluationFailed {
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Return code reported when this error ends a run.
    pub fn return_code(&self) -> ReturnCode {
        match self {
            OptimizerError::EvaluationFailed { .. } => ReturnCode::UnknownError,
            OptimizerError::DimensionMismatch { .. } => ReturnCode::LogicError,
            OptimizerError::AllocationFailed { .. } => ReturnCode::OutOfMemory,
            OptimizerError::Terminated { code } => *code,
        }
    }
}

impl From<ReturnCode> for OptimizerError {
    fn from(code: ReturnCode) -> Self {
        OptimizerError::Terminated { code }
    }
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;
