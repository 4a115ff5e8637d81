//! Line search algorithms for quasi-Newton methods.
//!
//! A line search receives the current point `x`, its objective `f`, its
//! gradient `g` (the pseudo-gradient for orthant-wise runs), a search
//! direction `s` and an initial trial step, and looks for a step `α` such
//! that `x + α s` is acceptable.
//!
//! # Acceptance Conditions
//!
//! ## Armijo Condition (Sufficient Decrease)
//! f(x + α s) ≤ f(x) + ftol · α · ⟨g, s⟩
//!
//! ## Wolfe Conditions
//! Armijo plus the curvature condition
//! ⟨g(x + α s), s⟩ ≥ wolfe · ⟨g, s⟩
//!
//! ## Strong Wolfe Conditions
//! Armijo plus the symmetric curvature condition
//! |⟨g(x + α s), s⟩| ≤ wolfe · |⟨g, s⟩|
//!
//! # Algorithm Variants
//!
//! - [`MoreThuente`]: safeguarded cubic/quadratic interpolation, the default
//! - [`BacktrackingArmijo`]: halve the step until sufficient decrease holds
//! - [`BacktrackingWolfe`]: halve on insufficient decrease, grow by 2.1 on
//!   insufficient curvature
//! - [`BacktrackingStrongWolfe`]: as above, also halving when the slope
//!   turns too positive
//! - [`BacktrackingOrthantWise`]: Armijo-type search confined to one orthant
//!   for L1-regularized objectives
//!
//! # Failure
//!
//! Every variant fails with a typed [`LineSearchFailure`] instead of an
//! error: initial step `<= 0` gives `InvalidParameters`, a non-descent
//! direction gives `IncreaseGradient`, leaving `[min_step, max_step]` gives
//! `MinimumStep`/`MaximumStep` and exhausting `max_line_search` evaluations
//! gives `MaximumLineSearch`. A failing evaluation callback ends the search
//! with the code of its error.

use crate::{
    core::evaluation::{CallbackData, EvaluationLogic},
    error::{OptimizerError, ReturnCode},
    optimization::{
        backtracking::{
            BacktrackingArmijo, BacktrackingOrthantWise, BacktrackingStrongWolfe,
            BacktrackingWolfe,
        },
        more_thuente::MoreThuente,
        orthantwise::OrthantWiseParams,
        params::LineSearchParams,
    },
    types::{DVector, Scalar},
};
use log::warn;
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accepted step of a successful line search.
#[derive(Debug, Clone)]
pub struct LineSearchStep<T: Scalar> {
    /// The accepted point `x + step · s`
    pub x: DVector<T>,
    /// Gradient at the accepted point
    pub g: DVector<T>,
    /// Objective at the accepted point, L1 term included for orthant-wise runs
    pub f: T,
    /// The accepted step
    pub step: T,
    /// Number of evaluations performed
    pub evaluations: usize,
}

/// Typed failure of a line search.
///
/// The engine reports the last accepted point alongside this record, never
/// the failed trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchFailure<T: Scalar> {
    /// Why the search failed
    pub code: ReturnCode,
    /// Number of evaluations performed before failing
    pub evaluations: usize,
    /// Last trial step
    pub step: T,
}

impl<T: Scalar> LineSearchFailure<T> {
    /// Creates a failure record.
    pub fn new(code: ReturnCode, evaluations: usize, step: T) -> Self {
        Self {
            code,
            evaluations,
            step,
        }
    }

    /// Failure caused by an evaluation error.
    pub fn from_error(error: &OptimizerError, evaluations: usize, step: T) -> Self {
        warn!("evaluation failed during line search at step {}: {}", step, error);
        Self::new(error.return_code(), evaluations, step)
    }
}

/// Outcome of a line search.
pub type LineSearchOutcome<T> = std::result::Result<LineSearchStep<T>, LineSearchFailure<T>>;

/// Interface shared by every line search.
pub trait LineSearch<T>: Debug
where
    T: Scalar,
{
    /// Searches along `s` from `x`, starting with the trial step `step`.
    ///
    /// # Arguments
    ///
    /// * `x` - Current point
    /// * `f` - Objective at `x`
    /// * `g` - Gradient at `x` (pseudo-gradient for orthant-wise searches)
    /// * `s` - Search direction, expected to satisfy `⟨g, s⟩ < 0`
    /// * `step` - Initial trial step, must be positive
    /// * `data` - Dimension and evaluation logic of the run
    /// * `params` - Tolerances and limits
    /// * `orthant_wise` - L1 penalty, required by the orthant-wise search
    #[allow(clippy::too_many_arguments)]
    fn search<E>(
        &mut self,
        x: &DVector<T>,
        f: T,
        g: &DVector<T>,
        s: &DVector<T>,
        step: T,
        data: &mut CallbackData<'_, E>,
        params: &LineSearchParams<T>,
        orthant_wise: Option<&OrthantWiseParams<T>>,
    ) -> LineSearchOutcome<T>
    where
        E: EvaluationLogic<T> + ?Sized;

    /// Name used in log messages.
    fn name(&self) -> &str;
}

/// Line search selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineSearchAlgorithm {
    /// More-Thuente.
    #[default]
    Default,
    /// More-Thuente interpolation search.
    MoreThuente,
    /// Backtracking with the Armijo condition.
    BacktrackingArmijo,
    /// Backtracking with the Wolfe conditions.
    BacktrackingWolfe,
    /// Backtracking with the strong Wolfe conditions.
    BacktrackingStrongWolfe,
    /// Backtracking for L1-regularized objectives.
    BacktrackingOrthantWise,
}

impl LineSearchAlgorithm {
    /// Every selector.
    pub const ALL: [LineSearchAlgorithm; 6] = [
        LineSearchAlgorithm::Default,
        LineSearchAlgorithm::MoreThuente,
        LineSearchAlgorithm::BacktrackingArmijo,
        LineSearchAlgorithm::BacktrackingWolfe,
        LineSearchAlgorithm::BacktrackingStrongWolfe,
        LineSearchAlgorithm::BacktrackingOrthantWise,
    ];

    /// Returns `true` for the orthant-wise search.
    pub fn is_orthant_wise(self) -> bool {
        self == LineSearchAlgorithm::BacktrackingOrthantWise
    }

    /// Returns `true` for the searches reading `LineSearchParams::wolfe`.
    pub fn uses_wolfe(self) -> bool {
        matches!(
            self,
            LineSearchAlgorithm::BacktrackingWolfe | LineSearchAlgorithm::BacktrackingStrongWolfe
        )
    }

    /// Builds the line search this selector names.
    pub fn strategy(self) -> LineSearchStrategy {
        match self {
            LineSearchAlgorithm::Default | LineSearchAlgorithm::MoreThuente => {
                LineSearchStrategy::MoreThuente(MoreThuente::new())
            }
            LineSearchAlgorithm::BacktrackingArmijo => {
                LineSearchStrategy::Armijo(BacktrackingArmijo::new())
            }
            LineSearchAlgorithm::BacktrackingWolfe => {
                LineSearchStrategy::Wolfe(BacktrackingWolfe::new())
            }
            LineSearchAlgorithm::BacktrackingStrongWolfe => {
                LineSearchStrategy::StrongWolfe(BacktrackingStrongWolfe::new())
            }
            LineSearchAlgorithm::BacktrackingOrthantWise => {
                LineSearchStrategy::OrthantWise(BacktrackingOrthantWise::new())
            }
        }
    }
}

/// Any of the built-in line searches, chosen at runtime.
#[derive(Debug, Clone)]
pub enum LineSearchStrategy {
    /// More-Thuente
    MoreThuente(MoreThuente),
    /// Backtracking, Armijo
    Armijo(BacktrackingArmijo),
    /// Backtracking, Wolfe
    Wolfe(BacktrackingWolfe),
    /// Backtracking, strong Wolfe
    StrongWolfe(BacktrackingStrongWolfe),
    /// Backtracking, orthant-wise
    OrthantWise(BacktrackingOrthantWise),
}

impl<T: Scalar> LineSearch<T> for LineSearchStrategy {
    fn search<E>(
        &mut self,
        x: &DVector<T>,
        f: T,
        g: &DVector<T>,
        s: &DVector<T>,
        step: T,
        data: &mut CallbackData<'_, E>,
        params: &LineSearchParams<T>,
        orthant_wise: Option<&OrthantWiseParams<T>>,
    ) -> LineSearchOutcome<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        match self {
            Self::MoreThuente(ls) => ls.search(x, f, g, s, step, data, params, orthant_wise),
            Self::Armijo(ls) => ls.search(x, f, g, s, step, data, params, orthant_wise),
            Self::Wolfe(ls) => ls.search(x, f, g, s, step, data, params, orthant_wise),
            Self::StrongWolfe(ls) => ls.search(x, f, g, s, step, data, params, orthant_wise),
            Self::OrthantWise(ls) => ls.search(x, f, g, s, step, data, params, orthant_wise),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::MoreThuente(ls) => LineSearch::<T>::name(ls),
            Self::Armijo(ls) => LineSearch::<T>::name(ls),
            Self::Wolfe(ls) => LineSearch::<T>::name(ls),
            Self::StrongWolfe(ls) => LineSearch::<T>::name(ls),
            Self::OrthantWise(ls) => LineSearch::<T>::name(ls),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_factory() {
        let names: Vec<String> = LineSearchAlgorithm::ALL
            .iter()
            .map(|a| LineSearch::<f64>::name(&a.strategy()).to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "More-Thuente",
                "More-Thuente",
                "Backtracking-Armijo",
                "Backtracking-Wolfe",
                "Backtracking-StrongWolfe",
                "Backtracking-OrthantWise",
            ]
        );
    }

    #[test]
    fn test_algorithm_flags() {
        assert!(LineSearchAlgorithm::BacktrackingOrthantWise.is_orthant_wise());
        assert!(!LineSearchAlgorithm::Default.is_orthant_wise());
        assert!(LineSearchAlgorithm::BacktrackingWolfe.uses_wolfe());
        assert!(!LineSearchAlgorithm::MoreThuente.uses_wolfe());
        assert_eq!(LineSearchAlgorithm::default(), LineSearchAlgorithm::Default);
    }
}
