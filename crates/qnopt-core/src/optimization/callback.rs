//! Progress printing for demos and interactive runs.

use crate::{
    core::evaluation::{EvaluationLogic, ProgressReport},
    error::{Result, ReturnCode},
    types::{DVector, Scalar},
};

/// Wraps a logic and prints the iteration trace to stdout.
///
/// Prints every `print_every` iterations; the wrapped logic still receives
/// every report and decides whether the run continues.
#[derive(Debug, Clone)]
pub struct PrintProgress<E> {
    inner: E,
    print_every: usize,
}

impl<E> PrintProgress<E> {
    /// Create a new progress printer.
    pub fn new(inner: E, print_every: usize) -> Self {
        Self {
            inner,
            print_every: print_every.max(1),
        }
    }

    /// Unwraps the logic.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<T: Scalar, E: EvaluationLogic<T>> EvaluationLogic<T> for PrintProgress<E> {
    fn evaluate(&mut self, x: &DVector<T>, step: T) -> Result<(T, DVector<T>)> {
        self.inner.evaluate(x, step)
    }

    fn value(&mut self, x: &DVector<T>) -> Result<T> {
        self.inner.value(x)
    }

    fn progress(&mut self, report: &ProgressReport<'_, T>) -> ReturnCode {
        if report.k % self.print_every == 0 {
            println!(
                "Iteration {}: fx = {}, xnorm = {}, gnorm = {}, step = {}, ls = {}",
                report.k, report.fx, report.xnorm, report.gnorm, report.step, report.ls
            );
        }
        self.inner.progress(report)
    }
}
