//! Standard objectives for tests, benchmarks and demos.
//!
//! Every function implements both [`EvaluationLogic`] (analytic gradient)
//! and [`Objective`] (value only, for finite differences).

use crate::{
    core::evaluation::{EvaluationLogic, Objective},
    error::{OptimizerError, Result},
    types::{DMatrix, DVector, Scalar},
};

fn check_len<T: Scalar>(x: &DVector<T>, expected: usize) -> Result<()> {
    if x.len() == expected {
        Ok(())
    } else {
        Err(OptimizerError::dimension_mismatch(expected, x.len()))
    }
}

/// Booth function `(x0 + 2 x1 - 7)² + (2 x0 + x1 - 5)²`, minimum 0 at `(1, 3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Booth;

impl Booth {
    /// Value and gradient at `x`.
    pub fn value_and_gradient<T: Scalar>(x: &DVector<T>) -> Result<(T, DVector<T>)> {
        check_len(x, 2)?;
        let two = <T as Scalar>::from_f64(2.0);
        let four = <T as Scalar>::from_f64(4.0);
        let a = x[0] + two * x[1] - <T as Scalar>::from_f64(7.0);
        let b = two * x[0] + x[1] - <T as Scalar>::from_f64(5.0);
        let g = DVector::from_vec(vec![two * a + four * b, four * a + two * b]);
        Ok((a * a + b * b, g))
    }
}

impl<T: Scalar> EvaluationLogic<T> for Booth {
    fn evaluate(&mut self, x: &DVector<T>, _step: T) -> Result<(T, DVector<T>)> {
        Self::value_and_gradient(x)
    }
}

impl<T: Scalar> Objective<T> for Booth {
    fn value(&self, x: &DVector<T>) -> Result<T> {
        Self::value_and_gradient(x).map(|(f, _)| f)
    }
}

/// Extended Rosenbrock function `Σ 100 (x_{i+1} - x_i²)² + (1 - x_i)²`.
///
/// Minimum 0 at the all-ones vector.
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock {
    n: usize,
}

impl Rosenbrock {
    /// Rosenbrock function in `n >= 2` variables.
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Problem dimension.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Value and gradient at `x`.
    pub fn value_and_gradient<T: Scalar>(&self, x: &DVector<T>) -> Result<(T, DVector<T>)> {
        check_len(x, self.n)?;
        let hundred = <T as Scalar>::from_f64(100.0);
        let two = <T as Scalar>::from_f64(2.0);
        let mut f = T::zero();
        let mut g = DVector::zeros(self.n);

        for i in 0..self.n.saturating_sub(1) {
            let t1 = x[i + 1] - x[i] * x[i];
            let t2 = T::one() - x[i];
            f += hundred * t1 * t1 + t2 * t2;
            g[i] -= two * (two * hundred * x[i] * t1 + t2);
            g[i + 1] += two * hundred * t1;
        }

        Ok((f, g))
    }
}

impl<T: Scalar> EvaluationLogic<T> for Rosenbrock {
    fn evaluate(&mut self, x: &DVector<T>, _step: T) -> Result<(T, DVector<T>)> {
        self.value_and_gradient(x)
    }
}

impl<T: Scalar> Objective<T> for Rosenbrock {
    fn value(&self, x: &DVector<T>) -> Result<T> {
        self.value_and_gradient(x).map(|(f, _)| f)
    }
}

/// Separable quadratic `Σ w_i (x_i - c_i)²`, minimum 0 at `c`.
#[derive(Debug, Clone)]
pub struct ShiftedQuadratic<T: Scalar> {
    center: DVector<T>,
    weights: DVector<T>,
}

impl<T: Scalar> ShiftedQuadratic<T> {
    /// Unit-weight quadratic centered at `center`.
    pub fn new(center: DVector<T>) -> Self {
        let weights = DVector::from_element(center.len(), T::one());
        Self { center, weights }
    }

    /// Sets positive per-coordinate weights, which control the conditioning.
    pub fn with_weights(mut self, weights: DVector<T>) -> Self {
        self.weights = weights;
        self
    }

    /// The minimizer.
    pub fn center(&self) -> &DVector<T> {
        &self.center
    }

    /// Value and gradient at `x`.
    pub fn value_and_gradient(&self, x: &DVector<T>) -> Result<(T, DVector<T>)> {
        check_len(x, self.center.len())?;
        let two = <T as Scalar>::from_f64(2.0);
        let diff = x - &self.center;
        let weighted = diff.component_mul(&self.weights);
        Ok((weighted.dot(&diff), weighted * two))
    }
}

impl<T: Scalar> EvaluationLogic<T> for ShiftedQuadratic<T> {
    fn evaluate(&mut self, x: &DVector<T>, _step: T) -> Result<(T, DVector<T>)> {
        self.value_and_gradient(x)
    }
}

impl<T: Scalar> Objective<T> for ShiftedQuadratic<T> {
    fn value(&self, x: &DVector<T>) -> Result<T> {
        self.value_and_gradient(x).map(|(f, _)| f)
    }
}

/// Least-squares loss `½ ‖A x - b‖²`, the smooth part of a lasso problem.
#[derive(Debug, Clone)]
pub struct LeastSquares<T: Scalar> {
    a: DMatrix<T>,
    b: DVector<T>,
}

impl<T: Scalar> LeastSquares<T> {
    /// Creates the loss for design matrix `a` and targets `b`.
    pub fn new(a: DMatrix<T>, b: DVector<T>) -> Self {
        Self { a, b }
    }

    /// Number of unknowns.
    pub fn dimension(&self) -> usize {
        self.a.ncols()
    }

    /// Value and gradient at `x`.
    pub fn value_and_gradient(&self, x: &DVector<T>) -> Result<(T, DVector<T>)> {
        check_len(x, self.a.ncols())?;
        let residual = &self.a * x - &self.b;
        let f = <T as Scalar>::from_f64(0.5) * residual.dot(&residual);
        Ok((f, self.a.tr_mul(&residual)))
    }
}

impl<T: Scalar> EvaluationLogic<T> for LeastSquares<T> {
    fn evaluate(&mut self, x: &DVector<T>, _step: T) -> Result<(T, DVector<T>)> {
        self.value_and_gradient(x)
    }
}

impl<T: Scalar> Objective<T> for LeastSquares<T> {
    fn value(&self, x: &DVector<T>) -> Result<T> {
        self.value_and_gradient(x).map(|(f, _)| f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluation::FiniteDifference;
    use approx::assert_relative_eq;

    fn assert_gradient_matches<O>(objective: O, x: &DVector<f64>)
    where
        O: EvaluationLogic<f64> + Objective<f64> + Clone,
    {
        let (_, analytic) = objective.clone().evaluate(x, 0.0).unwrap();
        let numeric = FiniteDifference::new(objective).gradient(x).unwrap();
        for i in 0..x.len() {
            assert_relative_eq!(analytic[i], numeric[i], epsilon = 1e-5, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_booth_minimum_and_gradient() {
        let (f, g) = Booth::value_and_gradient(&DVector::from_vec(vec![1.0, 3.0])).unwrap();
        assert_relative_eq!(f, 0.0);
        assert_relative_eq!(g.norm(), 0.0);
        assert_gradient_matches(Booth, &DVector::from_vec(vec![-0.5, 2.0]));
    }

    #[test]
    fn test_rosenbrock_minimum_and_gradient() {
        let rosen = Rosenbrock::new(4);
        let (f, g) = rosen
            .value_and_gradient(&DVector::from_element(4, 1.0))
            .unwrap();
        assert_relative_eq!(f, 0.0);
        assert_relative_eq!(g.norm(), 0.0);
        assert_gradient_matches(rosen, &DVector::from_vec(vec![-1.2, 1.0, 0.3, -0.7]));
    }

    #[test]
    fn test_shifted_quadratic_and_least_squares_gradients() {
        let quad = ShiftedQuadratic::new(DVector::from_vec(vec![1.0, -2.0, 3.0]))
            .with_weights(DVector::from_vec(vec![1.0, 10.0, 0.1]));
        assert_gradient_matches(quad, &DVector::from_vec(vec![0.0, 0.5, -1.0]));

        let ls = LeastSquares::new(
            DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 0.5, -1.0, 3.0, 0.0]),
            DVector::from_vec(vec![1.0, 0.0, 2.0]),
        );
        assert_eq!(ls.dimension(), 2);
        assert_gradient_matches(ls, &DVector::from_vec(vec![0.3, -0.4]));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Rosenbrock::new(3)
            .value_and_gradient(&DVector::from_vec(vec![1.0, 1.0]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Dimension mismatch: expected 3, got 2");
    }
}
