//! Quadratic penalty for inequality and equality constraints.
//!
//! A constrained problem
//!
//! ```text
//! minimize f(x)  subject to  c_i(x) <= 0,  h_j(x) = 0
//! ```
//!
//! is turned into the unconstrained objective
//!
//! ```text
//! f(x) + w (Σ max(0, c_i(x))² + Σ h_j(x)²)
//! ```
//!
//! which any engine can minimize through
//! [`FiniteDifference`](qnopt_core::evaluation::FiniteDifference).

use qnopt_core::{
    evaluation::Objective,
    types::{DVector, Scalar},
    Result,
};
use std::fmt::Debug;

/// Default penalty weight.
pub const DEFAULT_PENALTY_WEIGHT: f64 = 1e6;

/// Constraint values at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints<T: Scalar> {
    /// Values that must be `<= 0`
    pub inequality: DVector<T>,
    /// Values that must be `== 0`
    pub equality: DVector<T>,
}

impl<T: Scalar> Constraints<T> {
    /// Creates the constraint values.
    pub fn new(inequality: DVector<T>, equality: DVector<T>) -> Self {
        Self {
            inequality,
            equality,
        }
    }

    /// Only inequality constraints.
    pub fn inequality(values: DVector<T>) -> Self {
        Self::new(values, DVector::zeros(0))
    }

    /// Only equality constraints.
    pub fn equality(values: DVector<T>) -> Self {
        Self::new(DVector::zeros(0), values)
    }

    /// `Σ max(0, c_i)² + Σ h_j²`
    pub fn violation(&self) -> T {
        let inequality = self
            .inequality
            .iter()
            .map(|&c| {
                let c = if c > T::zero() { c } else { T::zero() };
                c * c
            })
            .fold(T::zero(), |acc, v| acc + v);
        inequality + self.equality.dot(&self.equality)
    }

    /// Returns `true` when every constraint holds within `tolerance`.
    pub fn is_feasible(&self, tolerance: T) -> bool {
        self.inequality.iter().all(|&c| c <= tolerance)
            && self
                .equality
                .iter()
                .all(|&h| <T as num_traits::Float>::abs(h) <= tolerance)
    }
}

/// Objective plus a weighted quadratic constraint penalty.
pub struct PenaltyObjective<T: Scalar, O, C> {
    objective: O,
    constraints: C,
    weight: T,
}

impl<T, O, C> PenaltyObjective<T, O, C>
where
    T: Scalar,
    O: Objective<T>,
    C: Fn(&DVector<T>) -> Result<Constraints<T>>,
{
    /// Combines an objective with a constraint function, weight `1e6`.
    pub fn new(objective: O, constraints: C) -> Self {
        Self {
            objective,
            constraints,
            weight: <T as Scalar>::from_f64(DEFAULT_PENALTY_WEIGHT),
        }
    }

    /// Sets the penalty weight.
    pub fn with_weight(mut self, weight: T) -> Self {
        self.weight = weight;
        self
    }

    /// Penalty weight.
    pub fn weight(&self) -> T {
        self.weight
    }

    /// Constraint values at `x`.
    pub fn constraints(&self, x: &DVector<T>) -> Result<Constraints<T>> {
        (self.constraints)(x)
    }

    /// The unpenalized objective.
    pub fn objective(&self) -> &O {
        &self.objective
    }
}

impl<T: Scalar, O: Debug, C> Debug for PenaltyObjective<T, O, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PenaltyObjective")
            .field("objective", &self.objective)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

impl<T, O, C> Objective<T> for PenaltyObjective<T, O, C>
where
    T: Scalar,
    O: Objective<T>,
    C: Fn(&DVector<T>) -> Result<Constraints<T>>,
{
    fn value(&self, x: &DVector<T>) -> Result<T> {
        let f = self.objective.value(x)?;
        let violation = (self.constraints)(x)?.violation();
        Ok(f + self.weight * violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfgs::{BFGSConfig, BFGS};
    use approx::assert_relative_eq;
    use qnopt_core::{evaluation::FnObjective, OptimizerError};

    #[test]
    fn test_violation_ignores_satisfied_inequalities() {
        let c = Constraints::new(
            DVector::from_vec(vec![-1.0, 2.0]),
            DVector::from_vec(vec![0.5]),
        );
        assert_relative_eq!(c.violation(), 4.25);
        assert!(!c.is_feasible(1e-9));
        assert!(Constraints::inequality(DVector::from_vec(vec![-3.0, 0.0])).is_feasible(0.0));
        assert_relative_eq!(
            Constraints::equality(DVector::from_vec(vec![3.0, -4.0])).violation(),
            25.0
        );
    }

    #[test]
    fn test_penalized_value() {
        let objective = FnObjective::new(|x: &DVector<f64>| x[0] * x[0]);
        let penalty = PenaltyObjective::new(objective, |x: &DVector<f64>| {
            Ok(Constraints::inequality(DVector::from_vec(vec![1.0 - x[0]])))
        })
        .with_weight(10.0);

        let inside = DVector::from_vec(vec![2.0]);
        let outside = DVector::from_vec(vec![0.0]);
        assert_relative_eq!(penalty.value(&inside).unwrap(), 4.0);
        assert_relative_eq!(penalty.value(&outside).unwrap(), 10.0);
        assert_eq!(penalty.weight(), 10.0);
    }

    #[test]
    fn test_constraint_errors_propagate() {
        let objective = FnObjective::new(|x: &DVector<f64>| x[0]);
        let penalty = PenaltyObjective::new(objective, |_: &DVector<f64>| {
            Err(OptimizerError::evaluation_failed("constraint model unavailable"))
        });
        assert!(penalty.value(&DVector::from_vec(vec![1.0])).is_err());
    }

    #[test]
    fn test_bfgs_on_penalized_problem() {
        // minimize x² + y² subject to x + y = 2; solution (1, 1).
        let objective = FnObjective::new(|x: &DVector<f64>| x.dot(x));
        let penalty = PenaltyObjective::new(objective, |x: &DVector<f64>| {
            Ok(Constraints::equality(DVector::from_vec(vec![x[0] + x[1] - 2.0])))
        })
        .with_weight(1e4);

        let mut optimizer = BFGS::new(BFGSConfig::new().with_tolerance(1e-8));
        let result = optimizer.minimize_numerically(2, &DVector::zeros(2), penalty);

        assert!(result.is_success(), "{}", result.return_code);
        assert_relative_eq!(result.optimized_variables[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimized_variables[1], 1.0, epsilon = 1e-3);
    }
}
