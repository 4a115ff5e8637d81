//! Evaluation interface between user problems and the optimizers.
//!
//! The optimizers never see the problem directly. They talk to an
//! [`EvaluationLogic`], which maps a point to an objective value and a
//! gradient, and which receives a [`ProgressReport`] after every accepted
//! iteration. Returning anything but [`ReturnCode::Success`] from
//! [`EvaluationLogic::progress`] cancels the run with that code.
//!
//! # Adapters
//!
//! - [`FnEvaluation`]: closure returning value and gradient
//! - [`FnObjective`]: closure returning only the value
//! - [`FiniteDifference`]: central-difference gradients for any [`Objective`]
//! - [`CountingEvaluation`]: counts every call, for tests and diagnostics
//! - [`WithProgress`]: attaches a progress closure to any logic
//!
//! Any state the problem needs (data sets, scratch buffers, counters) lives
//! in the implementing value itself.

use crate::{
    error::{OptimizerError, Result, ReturnCode},
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;

/// Snapshot handed to [`EvaluationLogic::progress`] after an accepted step.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReport<'a, T: Scalar> {
    /// Current point
    pub x: &'a DVector<T>,
    /// Current gradient (pseudo-gradient when orthant-wise is active)
    pub g: &'a DVector<T>,
    /// Current objective value
    pub fx: T,
    /// Euclidean norm of `x`
    pub xnorm: T,
    /// Euclidean norm of `g`
    pub gnorm: T,
    /// Step accepted by the line search
    pub step: T,
    /// Problem dimension
    pub n: usize,
    /// Iteration number, starting at 1
    pub k: usize,
    /// Evaluations spent by the line search of this iteration
    pub ls: usize,
}

/// Objective value and gradient provider.
///
/// This is the only trait an optimizer requires from a problem.
pub trait EvaluationLogic<T: Scalar> {
    /// Evaluates the objective and its gradient at `x`.
    ///
    /// `step` is the line-search step that produced `x`. Implementations
    /// must not keep references to `x`.
    fn evaluate(&mut self, x: &DVector<T>, step: T) -> Result<(T, DVector<T>)>;

    /// Evaluates only the objective at `x`.
    ///
    /// The default implementation calls [`evaluate`](Self::evaluate) and
    /// discards the gradient.
    fn value(&mut self, x: &DVector<T>) -> Result<T> {
        self.evaluate(x, T::zero()).map(|(f, _)| f)
    }

    /// Receives the state after each accepted iteration.
    ///
    /// Any code other than [`ReturnCode::Success`] terminates the run with
    /// that code.
    fn progress(&mut self, _report: &ProgressReport<'_, T>) -> ReturnCode {
        ReturnCode::Success
    }
}

impl<T: Scalar, E: EvaluationLogic<T> + ?Sized> EvaluationLogic<T> for &mut E {
    fn evaluate(&mut self, x: &DVector<T>, step: T) -> Result<(T, DVector<T>)> {
        (**self).evaluate(x, step)
    }

    fn value(&mut self, x: &DVector<T>) -> Result<T> {
        (**self).value(x)
    }

    fn progress(&mut self, report: &ProgressReport<'_, T>) -> ReturnCode {
        (**self).progress(report)
    }
}

/// Value-only objective, for problems without an analytic gradient.
pub trait Objective<T: Scalar>: Debug {
    /// Evaluates the objective at `x`.
    fn value(&self, x: &DVector<T>) -> Result<T>;
}

/// [`EvaluationLogic`] backed by a closure returning `(f, g)`.
pub struct FnEvaluation<F> {
    f: F,
}

impl<F> FnEvaluation<F> {
    /// Wraps a closure.
    pub fn new<T>(f: F) -> Self
    where
        T: Scalar,
        F: FnMut(&DVector<T>) -> Result<(T, DVector<T>)>,
    {
        Self { f }
    }
}

impl<F> Debug for FnEvaluation<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnEvaluation")
    }
}

impl<T, F> EvaluationLogic<T> for FnEvaluation<F>
where
    T: Scalar,
    F: FnMut(&DVector<T>) -> Result<(T, DVector<T>)>,
{
    fn evaluate(&mut self, x: &DVector<T>, _step: T) -> Result<(T, DVector<T>)> {
        (self.f)(x)
    }
}

/// [`Objective`] backed by a closure returning `f`.
pub struct FnObjective<F> {
    f: F,
}

impl<F> FnObjective<F> {
    /// Wraps a closure.
    pub fn new<T>(f: F) -> Self
    where
        T: Scalar,
        F: Fn(&DVector<T>) -> T,
    {
        Self { f }
    }
}

impl<F> Debug for FnObjective<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnObjective")
    }
}

impl<T, F> Objective<T> for FnObjective<F>
where
    T: Scalar,
    F: Fn(&DVector<T>) -> T,
{
    fn value(&self, x: &DVector<T>) -> Result<T> {
        Ok((self.f)(x))
    }
}

/// Turns an [`Objective`] into an [`EvaluationLogic`] using central
/// differences.
///
/// Component `i` is perturbed by `h_i = sqrt(eps) * max(1, |x_i|)`, so each
/// evaluation costs `2n + 1` objective calls.
#[derive(Debug, Clone)]
pub struct FiniteDifference<O> {
    objective: O,
}

impl<O> FiniteDifference<O> {
    /// Wraps an objective.
    pub fn new(objective: O) -> Self {
        Self { objective }
    }

    /// Returns the wrapped objective.
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Unwraps the objective.
    pub fn into_inner(self) -> O {
        self.objective
    }
}

impl<O> FiniteDifference<O> {
    /// Central-difference gradient of the wrapped objective at `x`.
    pub fn gradient<T: Scalar>(&self, x: &DVector<T>) -> Result<DVector<T>>
    where
        O: Objective<T>,
    {
        let sqrt_eps = <T as Float>::sqrt(T::EPSILON);
        let two = <T as Scalar>::from_f64(2.0);
        let mut gradient = DVector::zeros(x.len());
        let mut probe = x.clone();

        for i in 0..x.len() {
            let h = sqrt_eps * <T as Float>::max(T::one(), <T as Float>::abs(x[i]));

            probe[i] = x[i] + h;
            let f_plus = self.objective.value(&probe)?;
            probe[i] = x[i] - h;
            let f_minus = self.objective.value(&probe)?;
            probe[i] = x[i];

            gradient[i] = (f_plus - f_minus) / (two * h);
        }

        Ok(gradient)
    }
}

impl<T: Scalar, O: Objective<T>> EvaluationLogic<T> for FiniteDifference<O> {
    fn evaluate(&mut self, x: &DVector<T>, _step: T) -> Result<(T, DVector<T>)> {
        let f = self.objective.value(x)?;
        let g = self.gradient(x)?;
        Ok((f, g))
    }

    fn value(&mut self, x: &DVector<T>) -> Result<T> {
        self.objective.value(x)
    }
}

/// Wrapper that counts calls into the inner logic.
#[derive(Debug, Clone)]
pub struct CountingEvaluation<E> {
    inner: E,
    evaluations: usize,
    value_calls: usize,
    progress_calls: usize,
}

impl<E> CountingEvaluation<E> {
    /// Wraps a logic with all counters at zero.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            evaluations: 0,
            value_calls: 0,
            progress_calls: 0,
        }
    }

    /// Number of `evaluate` calls.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Number of `value` calls.
    pub fn value_calls(&self) -> usize {
        self.value_calls
    }

    /// Number of `progress` calls.
    pub fn progress_calls(&self) -> usize {
        self.progress_calls
    }

    /// Resets all counters.
    pub fn reset(&mut self) {
        self.evaluations = 0;
        self.value_calls = 0;
        self.progress_calls = 0;
    }

    /// Returns the wrapped logic.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<T: Scalar, E: EvaluationLogic<T>> EvaluationLogic<T> for CountingEvaluation<E> {
    fn evaluate(&mut self, x: &DVector<T>, step: T) -> Result<(T, DVector<T>)> {
        self.evaluations += 1;
        self.inner.evaluate(x, step)
    }

    fn value(&mut self, x: &DVector<T>) -> Result<T> {
        self.value_calls += 1;
        self.inner.value(x)
    }

    fn progress(&mut self, report: &ProgressReport<'_, T>) -> ReturnCode {
        self.progress_calls += 1;
        self.inner.progress(report)
    }
}

/// Attaches a progress closure to any logic.
pub struct WithProgress<E, P> {
    inner: E,
    progress: P,
}

impl<E, P> WithProgress<E, P> {
    /// Combines a logic with a progress closure.
    pub fn new<T>(inner: E, progress: P) -> Self
    where
        T: Scalar,
        P: FnMut(&ProgressReport<'_, T>) -> ReturnCode,
    {
        Self { inner, progress }
    }

    /// Unwraps the logic.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Debug, P> Debug for WithProgress<E, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithProgress")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<T, E, P> EvaluationLogic<T> for WithProgress<E, P>
where
    T: Scalar,
    E: EvaluationLogic<T>,
    P: FnMut(&ProgressReport<'_, T>) -> ReturnCode,
{
    fn evaluate(&mut self, x: &DVector<T>, step: T) -> Result<(T, DVector<T>)> {
        self.inner.evaluate(x, step)
    }

    fn value(&mut self, x: &DVector<T>) -> Result<T> {
        self.inner.value(x)
    }

    fn progress(&mut self, report: &ProgressReport<'_, T>) -> ReturnCode {
        (self.progress)(report)
    }
}

/// Problem dimension and logic, passed to every line-search call.
///
/// Owned by one optimization run. Every evaluation routed through it is
/// checked against the dimension, so a logic returning a gradient of the
/// wrong length surfaces as [`ReturnCode::LogicError`].
#[derive(Debug)]
pub struct CallbackData<'a, E: ?Sized> {
    n: usize,
    logic: &'a mut E,
}

impl<'a, E: ?Sized> CallbackData<'a, E> {
    /// Bundles the dimension with the logic.
    pub fn new(n: usize, logic: &'a mut E) -> Self {
        Self { n, logic }
    }

    /// Problem dimension.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Evaluates value and gradient, validating the gradient length.
    pub fn evaluate<T: Scalar>(&mut self, x: &DVector<T>, step: T) -> Result<(T, DVector<T>)>
    where
        E: EvaluationLogic<T>,
    {
        let (f, g) = self.logic.evaluate(x, step)?;
        if g.len() != self.n {
            return Err(OptimizerError::dimension_mismatch(self.n, g.len()));
        }
        Ok((f, g))
    }

    /// Evaluates the objective only.
    pub fn value<T: Scalar>(&mut self, x: &DVector<T>) -> Result<T>
    where
        E: EvaluationLogic<T>,
    {
        self.logic.value(x)
    }

    /// Forwards a progress report.
    pub fn progress<T: Scalar>(&mut self, report: &ProgressReport<'_, T>) -> ReturnCode
    where
        E: EvaluationLogic<T>,
    {
        self.logic.progress(report)
    }
}
