//! Full-memory BFGS with an explicit inverse-Hessian approximation.
//!
//! Keeps a dense `n × n` matrix `H ≈ ∇²f⁻¹`, starting from the identity,
//! and applies the rank-2 update after every accepted step:
//!
//! ```text
//! sy = max(s·y, EPS)
//! Δ  = (s sᵀ)(sy + yᵀHy) / sy² − (Hy sᵀ + s (Hy)ᵀ) / sy
//! H ← H + Δ                       (H + damping·Δ with a pluggable line search)
//! ```
//!
//! The search direction is `d = −H g`, or `−g` in steepest-descent mode.
//! Three line searches are available through [`BFGSLineSearch`]:
//! golden-section minimisation along `d`, Wolfe backtracking from
//! `1/‖d‖`, or any [`LineSearchAlgorithm`] from `qnopt-core`.
//!
//! The run converges when the mean squared gradient `g·g/n` falls below
//! [`BFGSConfig::tolerance`] and stops when the objective stagnates for
//! [`BFGSConfig::max_count`] consecutive iterations. A non-finite trial
//! halves the step scale and retries the iteration.
//!
//! Costs O(n²) memory and time per iteration; prefer [`LBFGS`](crate::LBFGS)
//! for large problems.

use log::{debug, info, warn};
use num_traits::Float;
use qnopt_core::{
    evaluation::{CallbackData, EvaluationLogic, FiniteDifference, Objective, ProgressReport},
    line_search::{
        LineSearch, LineSearchAlgorithm, LineSearchFailure, LineSearchOutcome, LineSearchStep,
    },
    optimization::{OptimizationResult, Optimizer, Path},
    params::LineSearchParams,
    types::{all_finite, constants, norm, DMatrix, DVector, Scalar},
    ReturnCode,
};
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::try_identity;

const NAME: &str = "BFGS";

/// Line search used by [`BFGS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BFGSLineSearch {
    /// Golden-section minimisation of `f(x + t d)`
    #[default]
    Exact,
    /// Wolfe backtracking starting from `1/‖d‖`
    Backtracking,
    /// A line search from `qnopt-core`, starting from `default_step`
    Strategy(LineSearchAlgorithm),
}

/// Configuration for the BFGS optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BFGSConfig<T: Scalar> {
    /// Iteration cap, 0 for none
    pub max_iterations: usize,
    /// Threshold on the mean squared gradient `g·g/n`
    pub tolerance: T,
    /// Consecutive stagnating iterations before stopping, 0 to disable
    pub max_count: usize,
    /// Relative objective change counted as stagnation
    pub stagnation_tolerance: T,
    /// Use `d = −g` instead of `d = −H g`
    pub steepest_descent: bool,
    /// Line search
    pub line_search: BFGSLineSearch,
    /// Factor applied to the update with [`BFGSLineSearch::Strategy`]
    pub damping: T,
    /// Tolerances shared by every line search
    pub line_search_params: LineSearchParams<T>,
}

impl<T: Scalar> Default for BFGSConfig<T> {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: <T as Scalar>::from_f64(1e-12),
            max_count: 10,
            stagnation_tolerance: <T as Scalar>::from_f64(1e-12),
            steepest_descent: false,
            line_search: BFGSLineSearch::default(),
            damping: <T as Scalar>::from_f64(0.99),
            line_search_params: LineSearchParams::default(),
        }
    }
}

impl<T: Scalar> BFGSConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the mean-squared-gradient threshold.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the stagnation test.
    pub fn with_stagnation(mut self, max_count: usize, tolerance: T) -> Self {
        self.max_count = max_count;
        self.stagnation_tolerance = tolerance;
        self
    }

    /// Switches to steepest descent.
    pub fn with_steepest_descent(mut self, steepest_descent: bool) -> Self {
        self.steepest_descent = steepest_descent;
        self
    }

    /// Sets the line search.
    pub fn with_line_search(mut self, line_search: BFGSLineSearch) -> Self {
        self.line_search = line_search;
        self
    }

    /// Sets the damping of the update.
    pub fn with_damping(mut self, damping: T) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the line-search tolerances.
    pub fn with_line_search_params(mut self, params: LineSearchParams<T>) -> Self {
        self.line_search_params = params;
        self
    }

    /// Checks the configuration; the first violation wins.
    pub fn validate(&self) -> Result<(), ReturnCode> {
        if !(self.tolerance >= T::zero()) {
            return Err(ReturnCode::InvalidEpsilon);
        }
        if !(self.stagnation_tolerance >= T::zero()) {
            return Err(ReturnCode::InvalidDelta);
        }
        if !(self.damping > T::zero() && self.damping <= T::one()) {
            return Err(ReturnCode::InvalidParameters);
        }
        match self.line_search {
            BFGSLineSearch::Exact => self
                .line_search_params
                .validate(LineSearchAlgorithm::MoreThuente),
            BFGSLineSearch::Backtracking => self
                .line_search_params
                .validate(LineSearchAlgorithm::BacktrackingWolfe),
            BFGSLineSearch::Strategy(algorithm) => {
                self.line_search_params.validate(algorithm)?;
                if algorithm.is_orthant_wise() {
                    return Err(ReturnCode::InvalidLineSearch);
                }
                Ok(())
            }
        }
    }
}

/// Increment `Δ` of the inverse-Hessian approximation for the pair `(s, y)`.
///
/// `h` must be symmetric. The curvature `s·y` is floored at machine epsilon.
pub fn inverse_hessian_increment<T: Scalar>(
    h: &DMatrix<T>,
    s: &DVector<T>,
    y: &DVector<T>,
) -> DMatrix<T> {
    let hy = h * y;
    let sy = <T as Float>::max(s.dot(y), T::EPSILON);
    let yhy = y.dot(&hy);

    let ss = s * s.transpose();
    let cross = &hy * s.transpose() + s * hy.transpose();
    ss * ((sy + yhy) / (sy * sy)) - cross / sy
}

/// Full-memory BFGS minimizer.
#[derive(Debug, Clone)]
pub struct BFGS<T: Scalar> {
    config: BFGSConfig<T>,
    path: Path<T>,
    inverse_hessian: Option<DMatrix<T>>,
}

impl<T: Scalar> BFGS<T> {
    /// Creates a new BFGS optimizer with the given configuration.
    pub fn new(config: BFGSConfig<T>) -> Self {
        Self {
            config,
            path: Path::new(),
            inverse_hessian: None,
        }
    }

    /// Creates a new BFGS optimizer with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(BFGSConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BFGSConfig<T> {
        &self.config
    }

    /// Points visited by the last run.
    pub fn path(&self) -> &Path<T> {
        &self.path
    }

    /// Inverse-Hessian approximation at the end of the last run.
    pub fn inverse_hessian(&self) -> Option<&DMatrix<T>> {
        self.inverse_hessian.as_ref()
    }

    /// Minimizes a value-only objective with central-difference gradients.
    pub fn minimize_numerically<O>(
        &mut self,
        n: usize,
        x0: &DVector<T>,
        objective: O,
    ) -> OptimizationResult<T>
    where
        O: Objective<T>,
    {
        let mut logic = FiniteDifference::new(objective);
        self.minimize(n, x0, &mut logic)
    }

    fn run<E>(&mut self, n: usize, x0: &DVector<T>, logic: &mut E) -> OptimizationResult<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        let start = Instant::now();
        self.path.clear();

        if n == 0 || x0.len() != n {
            return OptimizationResult::rejected(ReturnCode::InvalidN, x0);
        }
        if let Err(code) = self.config.validate() {
            debug!("{}: rejected configuration: {}", NAME, code);
            return OptimizationResult::rejected(code, x0);
        }
        let config = self.config.clone();
        let ls_params = &config.line_search_params;

        let h = match try_identity(n) {
            Ok(identity) => self.inverse_hessian.insert(identity),
            Err(code) => {
                self.inverse_hessian = None;
                return OptimizationResult::rejected(code, x0);
            }
        };

        let mut searcher = match config.line_search {
            BFGSLineSearch::Exact => None,
            BFGSLineSearch::Backtracking => {
                Some(LineSearchAlgorithm::BacktrackingWolfe.strategy())
            }
            BFGSLineSearch::Strategy(algorithm) => Some(algorithm.strategy()),
        };
        let damping = match config.line_search {
            BFGSLineSearch::Strategy(_) => config.damping,
            _ => T::one(),
        };

        let mut data = CallbackData::new(n, logic);
        let mut evaluations = 1;
        let finish = |code: ReturnCode, x: DVector<T>, k: usize, evaluations: usize| {
            OptimizationResult::new(code, x, start.elapsed())
                .with_iterations(k)
                .with_evaluations(evaluations)
        };

        let mut x = x0.clone();
        let (mut fx, mut g) = match data.evaluate(&x, T::zero()) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}: evaluation at the initial point failed: {}", NAME, e);
                return finish(e.return_code(), x, 0, evaluations);
            }
        };
        if !<T as Float>::is_finite(fx) || !all_finite(&g) {
            warn!("{}: non-finite objective or gradient at the initial point", NAME);
            return finish(ReturnCode::RoundingError, x, 0, evaluations);
        }
        self.path.push(&x);

        let dimension = <T as Scalar>::from_usize(n);
        if g.dot(&g) / dimension <= config.tolerance {
            info!("{}: initial point is already a minimizer", NAME);
            return finish(ReturnCode::AlreadyMinimized, x, 0, evaluations).with_final_value(fx);
        }

        let half = <T as Scalar>::from_f64(0.5);
        let mut scale = T::one();
        let mut stall = 0;
        let mut k = 0;

        loop {
            if config.max_iterations != 0 && k >= config.max_iterations {
                info!("{}: reached the iteration cap", NAME);
                return finish(ReturnCode::MaximumIteration, x, k, evaluations)
                    .with_final_value(fx);
            }
            k += 1;

            let mut d = if config.steepest_descent {
                -&g
            } else {
                -(&*h * &g)
            };
            if !(d.dot(&g) < T::zero()) {
                debug!("{}: not a descent direction, resetting the approximation", NAME);
                h.fill_with_identity();
                d = -&g;
            }

            let outcome = match searcher.as_mut() {
                None => {
                    let upper = scale * ls_params.default_step;
                    golden_section(&mut data, &x, fx, &d, upper, ls_params)
                }
                Some(search) => {
                    let step = match config.line_search {
                        BFGSLineSearch::Backtracking => scale / norm(&d),
                        _ => scale * ls_params.default_step,
                    };
                    search.search(&x, fx, &g, &d, step, &mut data, ls_params, None)
                }
            };

            let accepted = match outcome {
                Ok(accepted)
                    if <T as Float>::is_finite(accepted.f) && all_finite(&accepted.g) =>
                {
                    evaluations += accepted.evaluations;
                    accepted
                }
                Ok(LineSearchStep { evaluations: used, .. })
                | Err(LineSearchFailure {
                    code: ReturnCode::RoundingError,
                    evaluations: used,
                    ..
                }) => {
                    evaluations += used;
                    scale *= half;
                    warn!("{}: non-finite trial, step scale halved to {}", NAME, scale);
                    if scale < ls_params.min_step {
                        return finish(ReturnCode::RoundingError, x.clone(), k, evaluations)
                            .with_final_value(fx)
                            .with_line_search_incomplete(x, fx);
                    }
                    continue;
                }
                Err(failure) => {
                    evaluations += failure.evaluations;
                    warn!("{}: line search failed at iteration {}: {}", NAME, k, failure.code);
                    return finish(failure.code, x.clone(), k - 1, evaluations)
                        .with_final_value(fx)
                        .with_line_search_incomplete(x, fx);
                }
            };
            scale = T::one();

            if !config.steepest_descent {
                let s = &accepted.x - &x;
                let y = &accepted.g - &g;
                let delta = inverse_hessian_increment(h, &s, &y);
                *h += delta * damping;
                if !h.iter().all(|v| <T as Float>::is_finite(*v)) {
                    warn!("{}: non-finite approximation, resetting to identity", NAME);
                    h.fill_with_identity();
                }
            }

            let change = <T as Float>::abs(fx - accepted.f);
            let reference = <T as Float>::max(T::one(), <T as Float>::abs(fx));
            if change <= config.stagnation_tolerance * reference {
                stall += 1;
            } else {
                stall = 0;
            }

            x = accepted.x;
            fx = accepted.f;
            g = accepted.g;
            self.path.push(&x);

            let gnorm = norm(&g);
            debug!(
                "{}: iteration {}: f = {}, |g| = {}, step = {}, ls = {}",
                NAME, k, fx, gnorm, accepted.step, accepted.evaluations
            );
            let report = ProgressReport {
                x: &x,
                g: &g,
                fx,
                xnorm: norm(&x),
                gnorm,
                step: accepted.step,
                n,
                k,
                ls: accepted.evaluations,
            };
            let code = data.progress(&report);
            if code != ReturnCode::Success {
                info!("{}: progress callback stopped the run: {}", NAME, code);
                return finish(code, x, k, evaluations).with_final_value(fx);
            }

            if g.dot(&g) / dimension <= config.tolerance {
                info!("{}: converged after {} iterations", NAME, k);
                return finish(ReturnCode::Success, x, k, evaluations).with_final_value(fx);
            }
            if config.max_count != 0 && stall >= config.max_count {
                info!("{}: objective stagnated after {} iterations", NAME, k);
                return finish(ReturnCode::Stop, x, k, evaluations).with_final_value(fx);
            }
        }
    }
}

/// `f(x + t d)`, with non-finite values mapped to `+∞`.
fn trial_value<T, E>(
    data: &mut CallbackData<'_, E>,
    x: &DVector<T>,
    d: &DVector<T>,
    t: T,
) -> qnopt_core::Result<T>
where
    T: Scalar,
    E: EvaluationLogic<T> + ?Sized,
{
    let f = data.value(&(x + d * t))?;
    Ok(if <T as Float>::is_finite(f) {
        f
    } else {
        <T as Float>::infinity()
    })
}

/// Golden-section minimisation of `f(x + t d)` over `t ≥ 0`.
///
/// Expands `[0, upper]` by the golden ratio while the objective keeps
/// decreasing, then shrinks the bracket for up to `max_line_search`
/// iterations. The gradient is evaluated once, at the best point.
fn golden_section<T, E>(
    data: &mut CallbackData<'_, E>,
    x: &DVector<T>,
    f0: T,
    d: &DVector<T>,
    upper: T,
    params: &LineSearchParams<T>,
) -> LineSearchOutcome<T>
where
    T: Scalar,
    E: EvaluationLogic<T> + ?Sized,
{
    let golden = constants::golden_ratio::<T>();
    let section = constants::inverse_golden_ratio::<T>();
    let mut count = 0;
    let mut best = (T::zero(), f0);
    let mut saw_non_finite = false;

    let mut probe = |t: T, count: &mut usize, best: &mut (T, T)| {
        *count += 1;
        let f = trial_value(data, x, d, t)
            .map_err(|e| LineSearchFailure::from_error(&e, *count, t))?;
        if f < best.1 {
            *best = (t, f);
        }
        Ok::<T, LineSearchFailure<T>>(f)
    };

    let mut a = T::zero();
    let mut b = upper;
    let mut fb = probe(b, &mut count, &mut best)?;
    saw_non_finite |= fb == <T as Float>::infinity();
    let mut hi = b;
    if fb < f0 {
        let mut c = b + golden * (b - a);
        let mut fc = probe(c, &mut count, &mut best)?;
        while fc < fb && count < params.max_line_search {
            a = b;
            b = c;
            fb = fc;
            c = b + golden * (b - a);
            fc = probe(c, &mut count, &mut best)?;
        }
        saw_non_finite |= fc == <T as Float>::infinity();
        hi = c;
    }

    let mut lo = a;
    let mut x1 = hi - section * (hi - lo);
    let mut x2 = lo + section * (hi - lo);
    let mut f1 = probe(x1, &mut count, &mut best)?;
    let mut f2 = probe(x2, &mut count, &mut best)?;
    let budget = count + params.max_line_search;
    while count < budget && hi - lo > params.xtol * <T as Float>::max(T::one(), hi) {
        // Ties keep the left part, which holds the finite region.
        if !(f1 > f2) {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - section * (hi - lo);
            f1 = probe(x1, &mut count, &mut best)?;
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + section * (hi - lo);
            f2 = probe(x2, &mut count, &mut best)?;
        }
    }

    let (step, _) = best;
    if step == T::zero() {
        let code = if saw_non_finite {
            ReturnCode::RoundingError
        } else {
            ReturnCode::MinimumStep
        };
        return Err(LineSearchFailure::new(code, count, step));
    }

    let x_new = x + d * step;
    count += 1;
    let (f, g) = data
        .evaluate(&x_new, step)
        .map_err(|e| LineSearchFailure::from_error(&e, count, step))?;
    Ok(LineSearchStep {
        x: x_new,
        g,
        f,
        step,
        evaluations: count,
    })
}

impl<T: Scalar> Default for BFGS<T> {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl<T: Scalar> Optimizer<T> for BFGS<T> {
    fn name(&self) -> &str {
        NAME
    }

    fn minimize<E>(&mut self, n: usize, x0: &DVector<T>, logic: &mut E) -> OptimizationResult<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        self.run(n, x0, logic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qnopt_core::{
        evaluation::{CountingEvaluation, FnEvaluation, FnObjective},
        test_functions::{Booth, Rosenbrock, ShiftedQuadratic},
    };

    #[test]
    fn test_increment_satisfies_secant_equation() {
        let h = DMatrix::<f64>::identity(3, 3);
        let s = DVector::from_vec(vec![1.0, 0.5, -0.2]);
        let y = DVector::from_vec(vec![2.0, 1.5, 0.1]);
        let updated = &h + inverse_hessian_increment(&h, &s, &y);

        let hy = &updated * &y;
        for i in 0..3 {
            assert_relative_eq!(hy[i], s[i], epsilon = 1e-12);
        }
        assert_relative_eq!(updated.clone(), updated.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn test_config_validation() {
        assert!(BFGSConfig::<f64>::default().validate().is_ok());
        assert_eq!(
            BFGSConfig::<f64>::new().with_tolerance(-1.0).validate(),
            Err(ReturnCode::InvalidEpsilon)
        );
        assert_eq!(
            BFGSConfig::<f64>::new().with_damping(0.0).validate(),
            Err(ReturnCode::InvalidParameters)
        );
        assert_eq!(
            BFGSConfig::<f64>::new()
                .with_line_search(BFGSLineSearch::Strategy(
                    LineSearchAlgorithm::BacktrackingOrthantWise
                ))
                .validate(),
            Err(ReturnCode::InvalidLineSearch)
        );
        assert_eq!(
            BFGSConfig::<f64>::new()
                .with_line_search(BFGSLineSearch::Backtracking)
                .with_line_search_params(LineSearchParams::default().with_wolfe(1e-5))
                .validate(),
            Err(ReturnCode::InvalidWolfe)
        );
    }

    #[test]
    fn test_booth_with_every_line_search() {
        for line_search in [
            BFGSLineSearch::Exact,
            BFGSLineSearch::Backtracking,
            BFGSLineSearch::Strategy(LineSearchAlgorithm::MoreThuente),
            BFGSLineSearch::Strategy(LineSearchAlgorithm::BacktrackingStrongWolfe),
        ] {
            let mut optimizer = BFGS::new(BFGSConfig::new().with_line_search(line_search));
            let result = optimizer.minimize(2, &DVector::<f64>::zeros(2), &mut Booth);

            assert!(result.is_success(), "{:?}: {}", line_search, result.return_code);
            assert_relative_eq!(result.optimized_variables[0], 1.0, epsilon = 1e-4);
            assert_relative_eq!(result.optimized_variables[1], 3.0, epsilon = 1e-4);
            assert_eq!(optimizer.path().len(), result.iterations + 1);
        }
    }

    #[test]
    fn test_rosenbrock() {
        let config = BFGSConfig::new()
            .with_line_search(BFGSLineSearch::Strategy(LineSearchAlgorithm::MoreThuente));
        let mut optimizer = BFGS::new(config);
        let x0 = DVector::from_vec(vec![-1.2, 1.0]);
        let result = optimizer.minimize(2, &x0, &mut Rosenbrock::new(2));
        assert!(result.is_success(), "{}", result.return_code);
        assert_relative_eq!(result.optimized_variables[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimized_variables[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_steepest_descent_keeps_identity() {
        let center = DVector::from_vec(vec![1.0, -1.0]);
        let mut optimizer = BFGS::new(BFGSConfig::new().with_steepest_descent(true));
        let mut logic = ShiftedQuadratic::new(center);
        let result = optimizer.minimize(2, &DVector::zeros(2), &mut logic);

        assert!(result.is_success());
        assert_eq!(optimizer.inverse_hessian().unwrap(), &DMatrix::identity(2, 2));
    }

    #[test]
    fn test_numeric_gradient() {
        let objective =
            FnObjective::new(|x: &DVector<f64>| (x[0] - 2.0).powi(2) + 3.0 * (x[1] + 1.0).powi(2));
        let mut optimizer = BFGS::new(BFGSConfig::new().with_tolerance(1e-14));
        let result = optimizer.minimize_numerically(2, &DVector::zeros(2), objective);

        assert!(result.is_success(), "{}", result.return_code);
        assert_relative_eq!(result.optimized_variables[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(result.optimized_variables[1], -1.0, epsilon = 1e-5);
    }

    /// `(x - 2)²`, undefined beyond `x = 3`.
    fn bounded_parabola(x: &DVector<f64>) -> qnopt_core::Result<(f64, DVector<f64>)> {
        if x[0] > 3.0 {
            Ok((f64::NAN, DVector::from_element(1, f64::NAN)))
        } else {
            let r = x[0] - 2.0;
            Ok((r * r, DVector::from_element(1, 2.0 * r)))
        }
    }

    #[test]
    fn test_golden_section_reports_non_finite_bracket() {
        let mut logic = FnEvaluation::new(bounded_parabola);
        let mut data = CallbackData::new(1, &mut logic);
        let x = DVector::from_element(1, -2.0);
        let d = DVector::from_element(1, 8.0);
        let params = LineSearchParams::default();

        let failure = golden_section(&mut data, &x, 16.0, &d, 1e9, &params).unwrap_err();
        assert_eq!(failure.code, ReturnCode::RoundingError);
        assert_eq!(failure.evaluations, 43);

        let accepted = golden_section(&mut data, &x, 16.0, &d, 1.0, &params).unwrap();
        assert_relative_eq!(accepted.step, 0.5, epsilon = 1e-6);
        assert_relative_eq!(accepted.x[0], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_non_finite_trials_halve_the_step_scale() {
        // The first two attempts only probe the undefined region.
        let mut logic = CountingEvaluation::new(FnEvaluation::new(bounded_parabola));
        let config = BFGSConfig::new()
            .with_max_iterations(3)
            .with_line_search_params(LineSearchParams::default().with_default_step(1e9));
        let mut optimizer = BFGS::new(config);
        let result = optimizer.minimize(1, &DVector::from_element(1, -2.0), &mut logic);

        assert_eq!(result.return_code, ReturnCode::MaximumIteration);
        assert_eq!(result.iterations, 3);
        assert_eq!(optimizer.path().len(), 2);
        assert!(result.final_function_value.unwrap() < 16.0);
        assert!(result.optimized_variables[0] <= 3.0);
        assert_eq!(logic.value_calls(), 3 * 43);
    }

    #[test]
    fn test_already_minimized_and_rejected() {
        let mut logic = CountingEvaluation::new(Booth);
        let mut optimizer = BFGS::with_default_config();
        let result = optimizer.minimize(2, &DVector::from_vec(vec![1.0, 3.0]), &mut logic);
        assert_eq!(result.return_code, ReturnCode::AlreadyMinimized);
        assert_eq!(logic.evaluations(), 1);

        let result = optimizer.minimize(0, &DVector::zeros(0), &mut logic);
        assert_eq!(result.return_code, ReturnCode::InvalidN);
        assert_eq!(logic.evaluations(), 1);
    }

    #[test]
    fn test_iteration_cap() {
        let mut optimizer = BFGS::new(BFGSConfig::new().with_max_iterations(1));
        let result = optimizer.minimize(2, &DVector::from_vec(vec![-1.2, 1.0]), &mut Rosenbrock::new(2));
        assert_eq!(result.return_code, ReturnCode::MaximumIteration);
        assert_eq!(result.iterations, 1);
    }
}
