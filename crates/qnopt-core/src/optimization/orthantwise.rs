//! Orthant-wise helpers for L1-regularized objectives (OWL-QN).
//!
//! The objective minimized is `f(x) + c * Σ_{i in [start, end)} |x_i|`.
//! The L1 term is not differentiable at zero, so the engines work with the
//! pseudo-gradient instead of the gradient, keep every trial point inside
//! the orthant of the current iterate, and zero the direction components
//! that would move against the pseudo-gradient.

use crate::{
    error::ReturnCode,
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the L1 penalty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrthantWiseParams<T: Scalar> {
    /// Coefficient of the L1 term.
    pub c: T,
    /// First index covered by the penalty.
    pub start: usize,
    /// One past the last index covered, `None` for the full vector.
    pub end: Option<usize>,
}

impl<T: Scalar> OrthantWiseParams<T> {
    /// Penalty with coefficient `c` over every variable.
    pub fn new(c: T) -> Self {
        Self {
            c,
            start: 0,
            end: None,
        }
    }

    /// Sets the first penalized index.
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Sets one past the last penalized index.
    pub fn with_end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    /// Index range covered for a problem of dimension `n`.
    pub fn range(&self, n: usize) -> Range<usize> {
        let end = self.end.unwrap_or(n).min(n);
        self.start.min(end)..end
    }

    /// Checks the coefficient and the index range.
    pub fn validate(&self, n: usize) -> Result<(), ReturnCode> {
        if !(self.c >= T::zero()) {
            return Err(ReturnCode::InvalidOrthantwise);
        }
        if self.start > n {
            return Err(ReturnCode::InvalidOrthantwiseStart);
        }
        if let Some(end) = self.end {
            if end > n || end < self.start {
                return Err(ReturnCode::InvalidOrthantwiseEnd);
            }
        }
        Ok(())
    }

    /// L1 norm of `x` over the penalized range (without the coefficient).
    pub fn x1_norm(&self, x: &DVector<T>) -> T {
        self.range(x.len())
            .fold(T::zero(), |acc, i| acc + <T as Float>::abs(x[i]))
    }

    /// The full penalty `c * ‖x‖₁`.
    pub fn penalty(&self, x: &DVector<T>) -> T {
        self.c * self.x1_norm(x)
    }

    /// Pseudo-gradient of the regularized objective at `x`.
    ///
    /// Outside the penalized range the gradient passes through. At a zero
    /// component the one-sided derivative with the smaller magnitude is
    /// taken, or zero when neither side descends.
    pub fn pseudo_gradient(&self, x: &DVector<T>, g: &DVector<T>) -> DVector<T> {
        let mut pg = g.clone();
        let c = self.c;

        for i in self.range(x.len()) {
            pg[i] = if x[i] < T::zero() {
                g[i] - c
            } else if x[i] > T::zero() {
                g[i] + c
            } else if g[i] < -c {
                g[i] + c
            } else if c < g[i] {
                g[i] - c
            } else {
                T::zero()
            };
        }

        pg
    }

    /// Orthant the next iterate is confined to.
    ///
    /// Components are the sign carriers: `x_i` itself, or `-g_i` where
    /// `x_i` is zero.
    pub fn orthant(&self, x: &DVector<T>, g: &DVector<T>) -> DVector<T> {
        x.zip_map(g, |xi, gi| if xi == T::zero() { -gi } else { xi })
    }

    /// Projects `x` onto `orthant`: components leaving it become zero.
    pub fn project(&self, x: &DVector<T>, orthant: &DVector<T>) -> DVector<T> {
        let mut projected = x.clone();
        for i in self.range(x.len()) {
            if x[i] * orthant[i] <= T::zero() {
                projected[i] = T::zero();
            }
        }
        projected
    }

    /// Zeroes every component of `d` that does not oppose the pseudo-gradient.
    pub fn constrain_direction(&self, d: &mut DVector<T>, pg: &DVector<T>) {
        for i in self.range(d.len()) {
            if d[i] * pg[i] >= T::zero() {
                d[i] = T::zero();
            }
        }
    }
}
