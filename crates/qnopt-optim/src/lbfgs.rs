//! Limited-memory BFGS (L-BFGS) and orthant-wise OWL-QN.
//!
//! L-BFGS approximates the inverse Hessian from the `m` most recent
//! curvature pairs and never forms a matrix. The search direction comes
//! from the two-loop recursion:
//!
//! ```text
//! d = -g
//! for j = newest..oldest:   alpha_j = (s_j · d) / ys_j;  d -= alpha_j y_j
//! d *= ys / yy                                  (newest pair)
//! for j = oldest..newest:   beta_j  = (y_j · d) / ys_j;  d += (alpha_j - beta_j) s_j
//! ```
//!
//! When [`Parameters::orthant_wise`] is set the engine minimizes
//! `f(x) + c‖x‖₁` (OWL-QN): the pseudo-gradient replaces the gradient in
//! every test, the direction is constrained to the pseudo-gradient orthant
//! and the orthant-wise backtracking search keeps iterates in that orthant.
//!
//! # References
//!
//! - Nocedal, "Updating quasi-Newton matrices with limited storage" (1980)
//! - Andrew & Gao, "Scalable training of L1-regularized log-linear models" (2007)

use log::{debug, info, warn};
use num_traits::Float;
use qnopt_core::{
    evaluation::{CallbackData, EvaluationLogic, ProgressReport},
    line_search::LineSearch,
    optimization::{OptimizationResult, Optimizer, Path},
    orthantwise::OrthantWiseParams,
    params::Parameters,
    types::{all_finite, norm, DVector, Scalar},
    ReturnCode,
};
use std::time::Instant;

use crate::utils::{pair_elements, try_zeros};

/// One stored curvature pair.
#[derive(Debug, Clone)]
pub struct IterationData<T: Scalar> {
    /// Step `x_{k+1} - x_k`
    pub s: DVector<T>,
    /// Gradient difference `g_{k+1} - g_k`
    pub y: DVector<T>,
    /// `y · s`
    pub ys: T,
    /// Scratch value of the two-loop recursion
    pub alpha: T,
}

/// Fixed-capacity ring buffer of curvature pairs.
///
/// All `m` slots are allocated up front; a new pair overwrites the slot at
/// `end`, so once the buffer is full the oldest pair is evicted. Candidate
/// pairs are built in scratch vectors and swapped in only when accepted.
#[derive(Debug, Clone)]
pub struct History<T: Scalar> {
    slots: Vec<IterationData<T>>,
    scratch_s: DVector<T>,
    scratch_y: DVector<T>,
    end: usize,
    len: usize,
}

impl<T: Scalar> History<T> {
    /// Allocates `m` pairs of length `n`.
    ///
    /// Returns `OutOfMemory` when the storage cannot be reserved.
    pub fn try_new(m: usize, n: usize) -> Result<Self, ReturnCode> {
        pair_elements(n, m.checked_add(1).ok_or(ReturnCode::OutOfMemory)?)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(m)
            .map_err(|_| ReturnCode::OutOfMemory)?;
        for _ in 0..m {
            slots.push(IterationData {
                s: try_zeros(n)?,
                y: try_zeros(n)?,
                ys: T::zero(),
                alpha: T::zero(),
            });
        }
        Ok(Self {
            slots,
            scratch_s: try_zeros(n)?,
            scratch_y: try_zeros(n)?,
            end: 0,
            len: 0,
        })
    }

    /// Capacity `m`.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of valid pairs, at most `m`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` before the first pair is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every stored pair.
    pub fn clear(&mut self) {
        self.end = 0;
        self.len = 0;
    }

    /// Stores the pair built from two consecutive iterates.
    ///
    /// The pair is committed only when `ys > EPSILON·yy`; otherwise the
    /// stored history is untouched and `false` is returned.
    pub fn update(
        &mut self,
        x: &DVector<T>,
        xp: &DVector<T>,
        g: &DVector<T>,
        gp: &DVector<T>,
    ) -> bool {
        self.scratch_s.copy_from(x);
        self.scratch_s -= xp;
        self.scratch_y.copy_from(g);
        self.scratch_y -= gp;

        let ys = self.scratch_y.dot(&self.scratch_s);
        let yy = self.scratch_y.dot(&self.scratch_y);
        if !(ys > T::EPSILON * yy) || yy == T::zero() {
            return false;
        }

        let m = self.slots.len();
        let slot = &mut self.slots[self.end];
        std::mem::swap(&mut slot.s, &mut self.scratch_s);
        std::mem::swap(&mut slot.y, &mut self.scratch_y);
        slot.ys = ys;
        self.end = (self.end + 1) % m;
        self.len = (self.len + 1).min(m);
        true
    }

    /// Applies the two-loop recursion to `d` in place.
    ///
    /// `d` holds the negated (pseudo-)gradient on entry and the quasi-Newton
    /// direction on return. An empty history leaves `d` unchanged.
    pub fn two_loop(&mut self, d: &mut DVector<T>) {
        if self.len == 0 {
            return;
        }
        let m = self.slots.len();
        let newest = (self.end + m - 1) % m;
        let scale = {
            let it = &self.slots[newest];
            it.ys / it.y.dot(&it.y)
        };

        let mut j = self.end;
        for _ in 0..self.len {
            j = (j + m - 1) % m;
            let it = &mut self.slots[j];
            it.alpha = it.s.dot(d) / it.ys;
            d.axpy(-it.alpha, &it.y, T::one());
        }

        *d *= scale;

        for _ in 0..self.len {
            let it = &self.slots[j];
            let beta = it.y.dot(d) / it.ys;
            d.axpy(it.alpha - beta, &it.s, T::one());
            j = (j + 1) % m;
        }
    }
}

/// L-BFGS minimizer.
///
/// Owns its parameters and the path of the last run. The same instance can
/// be reused for sequential runs; each run starts with a cleared path.
#[derive(Debug, Clone)]
pub struct LBFGS<T: Scalar> {
    params: Parameters<T>,
    path: Path<T>,
}

impl<T: Scalar> LBFGS<T> {
    /// Creates a new L-BFGS optimizer with the given parameters.
    pub fn new(params: Parameters<T>) -> Self {
        Self {
            params,
            path: Path::new(),
        }
    }

    /// Creates a new L-BFGS optimizer with default parameters.
    pub fn with_default_config() -> Self {
        Self::new(Parameters::default())
    }

    /// Returns the parameters.
    pub fn params(&self) -> &Parameters<T> {
        &self.params
    }

    /// Points visited by the last run, initial point included.
    pub fn path(&self) -> &Path<T> {
        &self.path
    }

    /// Shared engine of L-BFGS and dmL-BFGS.
    ///
    /// `momentum` is `None` for plain L-BFGS. It is validated after every
    /// other parameter.
    pub(crate) fn run<E>(
        &mut self,
        n: usize,
        x0: &DVector<T>,
        logic: &mut E,
        momentum: Option<T>,
    ) -> OptimizationResult<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        let start = Instant::now();
        self.path.clear();

        if n == 0 || x0.len() != n {
            return OptimizationResult::rejected(ReturnCode::InvalidN, x0);
        }
        if let Err(code) = self.params.validate(n) {
            debug!("{}: rejected parameters: {}", self.name(), code);
            return OptimizationResult::rejected(code, x0);
        }
        if let Some(mom) = momentum {
            if !(mom >= T::zero() && mom < T::one()) {
                return OptimizationResult::rejected(ReturnCode::InvalidMomentum, x0);
            }
        }
        let momentum = momentum.unwrap_or_else(T::zero);

        let params = self.params.clone();
        let ls_params = &params.line_search_params;
        let ow = params.orthant_wise.as_ref();

        let mut history = match History::try_new(params.m, n) {
            Ok(history) => history,
            Err(code) => return OptimizationResult::rejected(code, x0),
        };
        let mut pf = Vec::new();
        if pf.try_reserve_exact(params.past).is_err() {
            return OptimizationResult::rejected(ReturnCode::OutOfMemory, x0);
        }
        pf.resize(params.past, T::zero());

        let mut strategy = params.line_search.strategy();
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
                warn!("{}: evaluation at the initial point failed: {}", self.name(), e);
                return finish(e.return_code(), x, 0, evaluations);
            }
        };
        if !<T as Float>::is_finite(fx) || !all_finite(&g) {
            warn!("{}: non-finite objective or gradient at the initial point", self.name());
            return finish(ReturnCode::RoundingError, x, 0, evaluations);
        }

        let mut pg = search_gradient(ow, &mut fx, &x, &g);
        self.path.push(&x);
        if let Some(first) = pf.first_mut() {
            *first = fx;
        }

        let mut d = -&pg;
        let xnorm = <T as Float>::max(T::one(), norm(&x));
        let gnorm = norm(&pg);
        if gnorm / xnorm <= params.epsilon {
            info!("{}: initial point is already a minimizer", self.name());
            return finish(ReturnCode::AlreadyMinimized, x, 0, evaluations).with_final_value(fx);
        }

        let mut step = T::one() / norm(&d);
        let mut previous_direction = (momentum > T::zero()).then(|| d.clone());
        let mut k = 1;

        loop {
            let xp = x.clone();
            let gp = g.clone();
            let fp = fx;

            let accepted = match strategy.search(
                &x,
                fx,
                &pg,
                &d,
                step,
                &mut data,
                ls_params,
                ow,
            ) {
                Ok(accepted) => accepted,
                Err(failure) => {
                    evaluations += failure.evaluations;
                    warn!(
                        "{}: line search failed at iteration {}: {}",
                        self.name(),
                        k,
                        failure.code
                    );
                    return finish(failure.code, xp.clone(), k - 1, evaluations)
                        .with_final_value(fx)
                        .with_line_search_incomplete(xp, fx);
                }
            };
            evaluations += accepted.evaluations;
            let ls = accepted.evaluations;
            step = accepted.step;

            if momentum > T::zero() {
                let blended = &xp * momentum + &accepted.x * (T::one() - momentum);
                evaluations += 1;
                match data.evaluate(&blended, step) {
                    Ok((f, gradient)) => {
                        x = blended;
                        fx = f;
                        g = gradient;
                        if let Some(ow) = ow {
                            fx += ow.penalty(&x);
                        }
                    }
                    Err(e) => {
                        warn!("{}: evaluation at the blended point failed: {}", self.name(), e);
                        return finish(e.return_code(), xp, k - 1, evaluations)
                            .with_final_value(fx);
                    }
                }
            } else {
                x = accepted.x;
                fx = accepted.f;
                g = accepted.g;
            }

            // A search that only tests the value can accept a broken gradient.
            if !<T as Float>::is_finite(fx) || !all_finite(&g) {
                warn!("{}: non-finite objective or gradient at iteration {}", self.name(), k);
                return finish(ReturnCode::RoundingError, xp.clone(), k - 1, evaluations)
                    .with_final_value(fp)
                    .with_line_search_incomplete(xp, fp);
            }

            pg = match ow {
                Some(ow) => ow.pseudo_gradient(&x, &g),
                None => g.clone(),
            };
            self.path.push(&x);

            let xnorm = norm(&x);
            let gnorm = norm(&pg);
            debug!(
                "{}: iteration {}: f = {}, |g| = {}, step = {}, ls = {}",
                self.name(),
                k,
                fx,
                gnorm,
                step,
                ls
            );

            let report = ProgressReport {
                x: &x,
                g: &g,
                fx,
                xnorm,
                gnorm,
                step,
                n,
                k,
                ls,
            };
            let code = data.progress(&report);
            if code != ReturnCode::Success {
                info!("{}: progress callback stopped the run: {}", self.name(), code);
                return finish(code, x, k, evaluations).with_final_value(fx);
            }

            if gnorm / <T as Float>::max(T::one(), xnorm) <= params.epsilon {
                info!("{}: converged after {} iterations", self.name(), k);
                return finish(ReturnCode::Success, x, k, evaluations).with_final_value(fx);
            }

            if params.past > 0 {
                let slot = k % params.past;
                if params.past <= k {
                    let rate = <T as Float>::abs(pf[slot] - fx) / <T as Float>::abs(fx);
                    if rate < params.delta {
                        info!("{}: objective stalled after {} iterations", self.name(), k);
                        return finish(ReturnCode::Stop, x, k, evaluations).with_final_value(fx);
                    }
                }
                pf[slot] = fx;
            }

            if params.max_iterations != 0 && params.max_iterations < k + 1 {
                info!("{}: reached the iteration cap", self.name());
                return finish(ReturnCode::MaximumIteration, x, k, evaluations)
                    .with_final_value(fx);
            }

            if !history.update(&x, &xp, &g, &gp) {
                debug!("{}: skipped a pair with non-positive curvature", self.name());
            }
            k += 1;

            d = -&pg;
            history.two_loop(&mut d);
            if let Some(ow) = ow {
                ow.constrain_direction(&mut d, &pg);
            }

            if let Some(prev) = previous_direction.as_mut() {
                let blended = &*prev * momentum + &d * (T::one() - momentum);
                if blended.dot(&pg) < T::zero() {
                    d = blended;
                }
                prev.copy_from(&d);
            }

            step = ls_params.default_step;
        }
    }
}

/// Adds the L1 penalty to `fx` and returns the gradient the tests use.
fn search_gradient<T: Scalar>(
    ow: Option<&OrthantWiseParams<T>>,
    fx: &mut T,
    x: &DVector<T>,
    g: &DVector<T>,
) -> DVector<T> {
    match ow {
        Some(ow) => {
            *fx += ow.penalty(x);
            ow.pseudo_gradient(x, g)
        }
        None => g.clone(),
    }
}

impl<T: Scalar> Default for LBFGS<T> {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl<T: Scalar> Optimizer<T> for LBFGS<T> {
    fn name(&self) -> &str {
        if self.params.orthant_wise.is_some() {
            "OWL-QN"
        } else {
            "L-BFGS"
        }
    }

    fn minimize<E>(&mut self, n: usize, x0: &DVector<T>, logic: &mut E) -> OptimizationResult<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        self.run(n, x0, logic, None)
    }
}

/// Minimizes with a fresh L-BFGS engine.
///
/// # Example
///
/// ```
/// use qnopt_core::prelude::*;
/// use qnopt_optim::lbfgs;
///
/// let mut logic = FnEvaluation::new(|x: &DVector<f64>| {
///     let r = x - DVector::from_vec(vec![1.0, -2.0]);
///     Ok((r.dot(&r), r * 2.0))
/// });
/// let x0 = DVector::from_vec(vec![0.0, 0.0]);
/// let result = lbfgs::minimize(2, &x0, &mut logic, Parameters::default());
/// assert!(result.is_success());
/// ```
pub fn minimize<T, E>(
    n: usize,
    x0: &DVector<T>,
    logic: &mut E,
    params: Parameters<T>,
) -> OptimizationResult<T>
where
    T: Scalar,
    E: EvaluationLogic<T> + ?Sized,
{
    LBFGS::new(params).minimize(n, x0, logic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qnopt_core::{
        evaluation::{CountingEvaluation, FnEvaluation, WithProgress},
        line_search::LineSearchAlgorithm,
        test_functions::{Booth, Rosenbrock, ShiftedQuadratic},
        OptimizerError,
    };

    fn pair(s: &[f64], y: &[f64]) -> (DVector<f64>, DVector<f64>) {
        (DVector::from_column_slice(s), DVector::from_column_slice(y))
    }

    fn push(history: &mut History<f64>, s: &[f64], y: &[f64]) -> bool {
        let (s, y) = pair(s, y);
        let zero = DVector::zeros(s.len());
        history.update(&s, &zero, &y, &zero)
    }

    #[test]
    fn test_two_loop_single_pair_matches_bfgs_update() {
        // With one pair and H0 = (ys/yy) I, the recursion yields the BFGS
        // update of H0 applied to -g.
        let mut history = History::try_new(3, 2).unwrap();
        assert!(push(&mut history, &[1.0, 0.0], &[2.0, 0.0]));

        let mut d = DVector::from_vec(vec![-4.0, -2.0]);
        history.two_loop(&mut d);
        // Curvature 2 along e1 and H0 = 0.5 I along e2.
        assert_relative_eq!(d[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_history_wraps_and_forgets_old_pairs() {
        let mut wrapped = History::try_new(2, 3).unwrap();
        assert!(push(&mut wrapped, &[5.0, 1.0, 0.0], &[1.0, 7.0, 0.5]));
        assert!(push(&mut wrapped, &[1.0, 0.0, 0.0], &[3.0, 0.0, 0.0]));
        assert!(push(&mut wrapped, &[0.0, 1.0, 1.0], &[0.0, 2.0, 1.0]));
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped.capacity(), 2);

        let mut fresh = History::try_new(2, 3).unwrap();
        assert!(push(&mut fresh, &[1.0, 0.0, 0.0], &[3.0, 0.0, 0.0]));
        assert!(push(&mut fresh, &[0.0, 1.0, 1.0], &[0.0, 2.0, 1.0]));

        let mut d1 = DVector::from_vec(vec![-1.0, 2.0, -3.0]);
        let mut d2 = d1.clone();
        wrapped.two_loop(&mut d1);
        fresh.two_loop(&mut d2);
        for i in 0..3 {
            assert_relative_eq!(d1[i], d2[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_non_positive_curvature_is_skipped() {
        let mut history = History::try_new(4, 2).unwrap();
        assert!(!push(&mut history, &[1.0, 0.0], &[-1.0, 0.0]));
        assert!(!push(&mut history, &[1.0, 0.0], &[0.0, 0.0]));
        assert!(history.is_empty());

        let mut d = DVector::from_vec(vec![1.0, 1.0]);
        history.two_loop(&mut d);
        assert_eq!(d, DVector::from_vec(vec![1.0, 1.0]));

        assert!(push(&mut history, &[1.0, 0.0], &[1.0, 0.0]));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_rejected_pair_keeps_full_history_intact() {
        let mut history = History::try_new(1, 2).unwrap();
        assert!(push(&mut history, &[1.0, 0.0], &[2.0, 0.0]));
        assert!(!push(&mut history, &[0.0, 1.0], &[0.0, -1.0]));
        assert_eq!(history.len(), 1);

        let mut d = DVector::from_vec(vec![-4.0, -2.0]);
        history.two_loop(&mut d);
        assert_relative_eq!(d[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_history_allocation_overflow() {
        assert_eq!(
            History::<f64>::try_new(usize::MAX, 4).unwrap_err(),
            ReturnCode::OutOfMemory
        );
    }

    #[test]
    fn test_booth_converges() {
        let x0 = DVector::from_vec(vec![0.0, 0.0]);
        let result = minimize(2, &x0, &mut Booth, Parameters::default());

        assert_eq!(result.return_code, ReturnCode::Success);
        assert_relative_eq!(result.optimized_variables[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.optimized_variables[1], 3.0, epsilon = 1e-4);
        assert!(result.final_function_value.unwrap() < 1e-8);
    }

    #[test]
    fn test_rosenbrock_with_each_line_search() {
        for algorithm in [
            LineSearchAlgorithm::MoreThuente,
            LineSearchAlgorithm::BacktrackingArmijo,
            LineSearchAlgorithm::BacktrackingWolfe,
            LineSearchAlgorithm::BacktrackingStrongWolfe,
        ] {
            let params = Parameters::default()
                .with_line_search(algorithm)
                .with_max_iterations(2000);
            let mut optimizer = LBFGS::new(params);
            let x0 = DVector::from_vec(vec![-1.2, 1.0]);
            let result = optimizer.minimize(2, &x0, &mut Rosenbrock::new(2));

            assert!(result.is_success(), "{:?}: {}", algorithm, result.return_code);
            assert_relative_eq!(result.optimized_variables[0], 1.0, epsilon = 1e-3);
            assert_relative_eq!(result.optimized_variables[1], 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_path_records_every_accepted_point() {
        let mut optimizer = LBFGS::with_default_config();
        let x0 = DVector::from_vec(vec![3.0, -1.0]);
        let mut logic = ShiftedQuadratic::new(DVector::from_vec(vec![1.0, 2.0]));
        let result = optimizer.minimize(2, &x0, &mut logic);

        assert!(result.is_success());
        assert_eq!(optimizer.path().len(), result.iterations + 1);
        assert_eq!(optimizer.path().points()[0], x0);
        assert_eq!(optimizer.path().last().unwrap(), &result.optimized_variables);

        let again = optimizer.minimize(2, &x0, &mut logic);
        assert_eq!(optimizer.path().len(), again.iterations + 1);
    }

    #[test]
    fn test_already_minimized_makes_no_line_search() {
        let mut logic = CountingEvaluation::new(Booth);
        let x0 = DVector::from_vec(vec![1.0, 3.0]);
        let result = minimize(2, &x0, &mut logic, Parameters::default());

        assert_eq!(result.return_code, ReturnCode::AlreadyMinimized);
        assert_eq!(result.iterations, 0);
        assert_eq!(logic.evaluations(), 1);
        assert_eq!(logic.progress_calls(), 0);
        assert_eq!(result.final_function_value, Some(0.0));
    }

    #[test]
    fn test_invalid_input_is_rejected_before_evaluation() {
        let mut logic = CountingEvaluation::new(Booth);
        let x0 = DVector::from_vec(vec![0.0, 0.0]);

        let result = minimize(3, &x0, &mut logic, Parameters::default());
        assert_eq!(result.return_code, ReturnCode::InvalidN);

        let params = Parameters::default().with_epsilon(-1.0).with_memory(0);
        let result = minimize(2, &x0, &mut logic, params);
        assert_eq!(result.return_code, ReturnCode::InvalidMemory);
        assert_eq!(logic.evaluations(), 0);
    }

    #[test]
    fn test_progress_cancels_run() {
        let mut logic = WithProgress::new(Rosenbrock::new(2), |report: &ProgressReport<'_, f64>| {
            if report.k >= 3 {
                ReturnCode::Canceled
            } else {
                ReturnCode::Success
            }
        });
        let x0 = DVector::from_vec(vec![-1.2, 1.0]);
        let result = minimize(2, &x0, &mut logic, Parameters::default());

        assert_eq!(result.return_code, ReturnCode::Canceled);
        assert_eq!(result.iterations, 3);
        assert!(result.final_function_value.is_some());
    }

    #[test]
    fn test_iteration_cap() {
        let params = Parameters::default().with_max_iterations(2);
        let x0 = DVector::from_vec(vec![-1.2, 1.0]);
        let result = minimize(2, &x0, &mut Rosenbrock::new(2), params);

        assert_eq!(result.return_code, ReturnCode::MaximumIteration);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_non_finite_initial_point() {
        let mut logic = FnEvaluation::new(|x: &DVector<f64>| Ok((f64::NAN, x.clone())));
        let x0 = DVector::from_vec(vec![1.0]);
        let result = minimize(1, &x0, &mut logic, Parameters::default());
        assert_eq!(result.return_code, ReturnCode::RoundingError);
        assert_eq!(result.evaluations, 1);
    }

    /// `(x - 3)²` whose gradient is NaN past `x = 0.5`.
    fn broken_gradient(x: &DVector<f64>) -> qnopt_core::Result<(f64, DVector<f64>)> {
        let r = x[0] - 3.0;
        let g = if x[0] > 0.5 { f64::NAN } else { 2.0 * r };
        Ok((r * r, DVector::from_vec(vec![g])))
    }

    #[test]
    fn test_non_finite_gradient_after_line_search() {
        let x0 = DVector::from_vec(vec![0.0]);
        for algorithm in [
            LineSearchAlgorithm::BacktrackingArmijo,
            LineSearchAlgorithm::BacktrackingWolfe,
        ] {
            let mut optimizer = LBFGS::new(Parameters::default().with_line_search(algorithm));
            let result = optimizer.minimize(1, &x0, &mut FnEvaluation::new(broken_gradient));

            assert_eq!(result.return_code, ReturnCode::RoundingError, "{:?}", algorithm);
            assert_eq!(result.optimized_variables, x0);
            assert_eq!(result.final_function_value, Some(9.0));
            assert_eq!(result.iterations, 0);
            let incomplete = result.line_search_incomplete.unwrap();
            assert_eq!(incomplete.variable_values, x0);
            assert_eq!(optimizer.path().len(), 1);
        }
    }

    #[test]
    fn test_evaluation_error_at_start() {
        let mut logic = FnEvaluation::new(|_: &DVector<f64>| {
            Err(OptimizerError::evaluation_failed("no model"))
        });
        let x0 = DVector::from_vec(vec![1.0]);
        let result = minimize(1, &x0, &mut logic, Parameters::default());
        assert_eq!(result.return_code, ReturnCode::UnknownError);
    }

    #[test]
    fn test_f32_quadratic() {
        let center = DVector::from_vec(vec![0.5f32, -1.5, 2.0]);
        let mut logic = ShiftedQuadratic::new(center.clone());
        let params = Parameters::<f32>::default().with_epsilon(1e-4);
        let result = minimize(3, &DVector::zeros(3), &mut logic, params);

        assert!(result.is_success());
        for i in 0..3 {
            assert_relative_eq!(result.optimized_variables[i], center[i], epsilon = 1e-3);
        }
    }
}
