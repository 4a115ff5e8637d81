//! Parameter records for the limited-memory engines and their line searches.
//!
//! Both records follow the same pattern: `Default` carries the classic
//! L-BFGS settings, `with_*` setters adjust single fields, and `validate`
//! maps the first violated constraint to its [`ReturnCode`]. Validation
//! happens once, before the first evaluation, so an invalid run has no
//! side effects.
//!
//! # Defaults
//!
//! | field              | default |
//! |--------------------|---------|
//! | `m`                | 6       |
//! | `epsilon`          | 1e-5    |
//! | `past`             | 0       |
//! | `delta`            | 1e-5    |
//! | `max_iterations`   | 0 (unbounded) |
//! | `max_line_search`  | 40      |
//! | `default_step`     | 1.0     |
//! | `min_step`         | 1e-20   |
//! | `max_step`         | 1e20    |
//! | `ftol`             | 1e-4    |
//! | `wolfe`            | 0.9     |
//! | `gtol`             | 0.9     |
//! | `xtol`             | 1e-16   |

use crate::{
    error::ReturnCode,
    optimization::{line_search::LineSearchAlgorithm, orthantwise::OrthantWiseParams},
    types::Scalar,
};
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerances and limits shared by every line search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSearchParams<T: Scalar> {
    /// Maximum number of evaluations per line search.
    pub max_line_search: usize,
    /// Initial trial step from the second iteration on.
    pub default_step: T,
    /// Smallest admissible step.
    pub min_step: T,
    /// Largest admissible step.
    pub max_step: T,
    /// Sufficient-decrease coefficient.
    pub ftol: T,
    /// Curvature coefficient of the backtracking Wolfe tests.
    pub wolfe: T,
    /// Curvature coefficient of the More-Thuente search.
    pub gtol: T,
    /// Relative width below which the interval of uncertainty is too small.
    pub xtol: T,
}

impl<T: Scalar> Default for LineSearchParams<T> {
    fn default() -> Self {
        Self {
            max_line_search: 40,
            default_step: T::one(),
            min_step: T::MIN_STEP_SIZE,
            max_step: T::MAX_STEP_SIZE,
            ftol: <T as Scalar>::from_f64(1e-4),
            wolfe: <T as Scalar>::from_f64(0.9),
            gtol: <T as Scalar>::from_f64(0.9),
            xtol: <T as Scalar>::from_f64(1e-16),
        }
    }
}

impl<T: Scalar> LineSearchParams<T> {
    /// Creates the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the evaluation budget per line search.
    pub fn with_max_line_search(mut self, max_line_search: usize) -> Self {
        self.max_line_search = max_line_search;
        self
    }

    /// Sets the initial trial step used after the first iteration.
    pub fn with_default_step(mut self, step: T) -> Self {
        self.default_step = step;
        self
    }

    /// Sets the admissible step range.
    pub fn with_step_bounds(mut self, min_step: T, max_step: T) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    /// Sets the sufficient-decrease coefficient.
    pub fn with_ftol(mut self, ftol: T) -> Self {
        self.ftol = ftol;
        self
    }

    /// Sets the Wolfe curvature coefficient.
    pub fn with_wolfe(mut self, wolfe: T) -> Self {
        self.wolfe = wolfe;
        self
    }

    /// Sets the More-Thuente curvature coefficient.
    pub fn with_gtol(mut self, gtol: T) -> Self {
        self.gtol = gtol;
        self
    }

    /// Sets the interval width tolerance.
    pub fn with_xtol(mut self, xtol: T) -> Self {
        self.xtol = xtol;
        self
    }

    /// Checks the step bounds, tolerances and budget.
    ///
    /// `wolfe` is only checked for the backtracking Wolfe variants, which
    /// are the only ones reading it.
    pub fn validate(&self, algorithm: LineSearchAlgorithm) -> Result<(), ReturnCode> {
        let zero = T::zero();

        if !(self.min_step >= zero) {
            return Err(ReturnCode::InvalidMinStep);
        }
        if !(self.max_step >= self.min_step) {
            return Err(ReturnCode::InvalidMaxStep);
        }
        if !(self.ftol >= zero) {
            return Err(ReturnCode::InvalidFTOL);
        }
        if algorithm.uses_wolfe() && !(self.wolfe > self.ftol && self.wolfe < T::one()) {
            return Err(ReturnCode::InvalidWolfe);
        }
        if !(self.gtol >= zero) {
            return Err(ReturnCode::InvalidGTOL);
        }
        if !(self.xtol >= zero) {
            return Err(ReturnCode::InvalidXTOL);
        }
        if self.max_line_search == 0 {
            return Err(ReturnCode::InvalidMaxLineSearch);
        }
        Ok(())
    }
}

/// Configuration of an L-BFGS (or OWL-QN, or dmL-BFGS) run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameters<T: Scalar> {
    /// Number of correction pairs kept in the history.
    pub m: usize,
    /// Gradient-norm convergence tolerance: stop when `‖g‖ / max(1, ‖x‖) <= epsilon`.
    pub epsilon: T,
    /// Distance, in iterations, of the relative-decrease test. Zero disables it.
    pub past: usize,
    /// Relative-decrease tolerance used with `past`.
    pub delta: T,
    /// Iteration cap. Zero means unbounded.
    pub max_iterations: usize,
    /// Line search used by the engine.
    pub line_search: LineSearchAlgorithm,
    /// Line-search tolerances.
    pub line_search_params: LineSearchParams<T>,
    /// L1 penalty, only valid with the orthant-wise line search.
    pub orthant_wise: Option<OrthantWiseParams<T>>,
}

impl<T: Scalar> Default for Parameters<T> {
    fn default() -> Self {
        Self {
            m: 6,
            epsilon: T::DEFAULT_GRADIENT_TOLERANCE,
            past: 0,
            delta: T::DEFAULT_DELTA,
            max_iterations: 0,
            line_search: LineSearchAlgorithm::Default,
            line_search_params: LineSearchParams::default(),
            orthant_wise: None,
        }
    }
}

impl<T: Scalar> Parameters<T> {
    /// Creates the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// OWL-QN parameters: the given L1 penalty with the orthant-wise line search.
    pub fn orthant_wise(orthant_wise: OrthantWiseParams<T>) -> Self {
        Self {
            line_search: LineSearchAlgorithm::BacktrackingOrthantWise,
            orthant_wise: Some(orthant_wise),
            ..Self::default()
        }
    }

    /// Sets the history depth.
    pub fn with_memory(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Sets the gradient-norm tolerance.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enables the relative-decrease test over `past` iterations.
    pub fn with_past(mut self, past: usize, delta: T) -> Self {
        self.past = past;
        self.delta = delta;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Selects the line search.
    pub fn with_line_search(mut self, algorithm: LineSearchAlgorithm) -> Self {
        self.line_search = algorithm;
        self
    }

    /// Replaces the line-search tolerances.
    pub fn with_line_search_params(mut self, params: LineSearchParams<T>) -> Self {
        self.line_search_params = params;
        self
    }

    /// Sets the L1 penalty without touching the line search.
    pub fn with_orthant_wise(mut self, orthant_wise: OrthantWiseParams<T>) -> Self {
        self.orthant_wise = Some(orthant_wise);
        self
    }

    /// Checks every parameter against a problem of dimension `n`.
    ///
    /// Checks run in a fixed order and the first violation wins, so the same
    /// invalid configuration always reports the same code.
    pub fn validate(&self, n: usize) -> Result<(), ReturnCode> {
        if n == 0 {
            return Err(ReturnCode::InvalidN);
        }
        if self.m == 0 {
            return Err(ReturnCode::InvalidMemory);
        }
        if !(self.epsilon >= T::zero()) {
            return Err(ReturnCode::InvalidEpsilon);
        }
        if self.past > 0 && !<T as Float>::is_finite(self.delta) {
            return Err(ReturnCode::InvalidTestPeriod);
        }
        if !(self.delta >= T::zero()) {
            return Err(ReturnCode::InvalidDelta);
        }

        self.line_search_params.validate(self.line_search)?;

        let orthant_wise_search = self.line_search.is_orthant_wise();
        match &self.orthant_wise {
            None if orthant_wise_search => return Err(ReturnCode::InvalidOrthantwise),
            Some(params) => {
                params.validate(n)?;
                if !orthant_wise_search {
                    return Err(ReturnCode::InvalidLineSearch);
                }
            }
            None => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let params = Parameters::<f64>::default();
        assert_eq!(params.m, 6);
        assert_eq!(params.line_search_params.max_line_search, 40);
        assert_eq!(params.line_search, LineSearchAlgorithm::Default);
        assert!(params.validate(3).is_ok());

        for algorithm in LineSearchAlgorithm::ALL {
            if !algorithm.is_orthant_wise() {
                assert!(params.clone().with_line_search(algorithm).validate(3).is_ok());
            }
        }
    }

    #[test]
    fn test_single_violations() {
        let base = Parameters::<f64>::default();
        let cases = vec![
            (base.clone().with_memory(0), ReturnCode::InvalidMemory),
            (base.clone().with_epsilon(-1.0), ReturnCode::InvalidEpsilon),
            (base.clone().with_epsilon(f64::NAN), ReturnCode::InvalidEpsilon),
            (base.clone().with_past(3, f64::INFINITY), ReturnCode::InvalidTestPeriod),
            (base.clone().with_past(3, -1.0), ReturnCode::InvalidDelta),
            (
                base.clone()
                    .with_line_search_params(LineSearchParams::new().with_step_bounds(-1.0, 1.0)),
                ReturnCode::InvalidMinStep,
            ),
            (
                base.clone()
                    .with_line_search_params(LineSearchParams::new().with_step_bounds(1.0, 0.5)),
                ReturnCode::InvalidMaxStep,
            ),
            (
                base.clone()
                    .with_line_search_params(LineSearchParams::new().with_ftol(-1e-4)),
                ReturnCode::InvalidFTOL,
            ),
            (
                base.clone()
                    .with_line_search_params(LineSearchParams::new().with_gtol(-0.1)),
                ReturnCode::InvalidGTOL,
            ),
            (
                base.clone()
                    .with_line_search_params(LineSearchParams::new().with_xtol(-0.1)),
                ReturnCode::InvalidXTOL,
            ),
            (
                base.clone()
                    .with_line_search_params(LineSearchParams::new().with_max_line_search(0)),
                ReturnCode::InvalidMaxLineSearch,
            ),
        ];

        for (params, expected) in cases {
            assert_eq!(params.validate(2), Err(expected));
        }
    }

    #[test]
    fn test_wolfe_only_checked_for_wolfe_searches() {
        let params = Parameters::<f64>::default()
            .with_line_search_params(LineSearchParams::new().with_wolfe(1e-5));

        assert!(params.validate(2).is_ok());
        assert!(params
            .clone()
            .with_line_search(LineSearchAlgorithm::BacktrackingArmijo)
            .validate(2)
            .is_ok());
        assert_eq!(
            params
                .clone()
                .with_line_search(LineSearchAlgorithm::BacktrackingWolfe)
                .validate(2),
            Err(ReturnCode::InvalidWolfe)
        );
        assert_eq!(
            params
                .with_line_search(LineSearchAlgorithm::BacktrackingStrongWolfe)
                .validate(2),
            Err(ReturnCode::InvalidWolfe)
        );
    }

    #[test]
    fn test_orthant_wise_pairing() {
        let ow = OrthantWiseParams::new(1.0);
        assert!(Parameters::orthant_wise(ow.clone()).validate(2).is_ok());

        assert_eq!(
            Parameters::<f64>::default()
                .with_orthant_wise(ow.clone())
                .validate(2),
            Err(ReturnCode::InvalidLineSearch)
        );
        assert_eq!(
            Parameters::<f64>::default()
                .with_line_search(LineSearchAlgorithm::BacktrackingOrthantWise)
                .validate(2),
            Err(ReturnCode::InvalidOrthantwise)
        );
        assert_eq!(
            Parameters::orthant_wise(ow.with_end(5)).validate(2),
            Err(ReturnCode::InvalidOrthantwiseEnd)
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let params = Parameters::<f64>::default()
            .with_epsilon(-1.0)
            .with_memory(0);
        assert_eq!(params.validate(0), Err(ReturnCode::InvalidN));
        assert_eq!(params.validate(2), Err(ReturnCode::InvalidMemory));
    }

    #[test]
    fn test_builders_only_touch_their_field() {
        let params = Parameters::<f64>::default().with_memory(10).with_past(4, 1e-6);
        let expected = Parameters {
            m: 10,
            past: 4,
            delta: 1e-6,
            ..Parameters::default()
        };
        assert_eq!(params, expected);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_parameters_from_json() {
        let params = Parameters::<f64>::orthant_wise(OrthantWiseParams::new(0.5).with_start(1))
            .with_max_iterations(250);
        let json = serde_json::to_string(&params).unwrap();
        let parsed: Parameters<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
        assert_eq!(parsed.validate(4), Ok(()));
    }
}
