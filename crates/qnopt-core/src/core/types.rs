//! Scalar abstraction and dense linear-algebra aliases.
//!
//! Every algorithm in the workspace is generic over [`Scalar`], which is
//! implemented for `f32` and `f64`. The associated constants provide the
//! precision-dependent defaults of [`Parameters`](crate::params::Parameters)
//! and [`LineSearchParams`](crate::params::LineSearchParams).

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Floating-point type the optimizers run on.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon.
    const EPSILON: Self;

    /// Default `epsilon` of the gradient-norm test.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Default `delta` of the relative-decrease test.
    const DEFAULT_DELTA: Self;

    /// Default lower bound on a line-search step.
    const MIN_STEP_SIZE: Self;

    /// Default upper bound on a line-search step.
    const MAX_STEP_SIZE: Self;

    /// Converts an `f64` constant, rounding to the nearest representable value.
    fn from_f64(v: f64) -> Self;

    /// Converts a count.
    fn from_usize(v: usize) -> Self;
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DEFAULT_DELTA: Self = 1e-5;
    const MIN_STEP_SIZE: Self = 1e-20;
    const MAX_STEP_SIZE: Self = 1e20;

    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_usize(v: usize) -> Self {
        v as f32
    }
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DEFAULT_DELTA: Self = 1e-5;
    const MIN_STEP_SIZE: Self = 1e-20;
    const MAX_STEP_SIZE: Self = 1e20;

    fn from_f64(v: f64) -> Self {
        v
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_usize(v: usize) -> Self {
        v as f64
    }
}

/// Dense matrix with runtime dimensions.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Dense column vector with runtime length.
pub type DVector<T> = OVector<T, Dyn>;

/// Constants shared by the one-dimensional searches.
pub mod constants {
    use super::Scalar;

    /// φ = (1 + √5) / 2
    pub fn golden_ratio<T: Scalar>() -> T {
        <T as Scalar>::from_f64(1.618_033_988_749_895)
    }

    /// 1 / φ, the fraction kept by each golden-section reduction.
    pub fn inverse_golden_ratio<T: Scalar>() -> T {
        <T as Scalar>::from_f64(0.618_033_988_749_895)
    }
}

/// Euclidean norm.
pub fn norm<T: Scalar>(v: &DVector<T>) -> T {
    <T as Float>::sqrt(v.dot(v))
}

/// `true` when no entry is NaN or infinite.
pub fn all_finite<T: Scalar>(v: &DVector<T>) -> bool {
    v.iter().all(|x| <T as Float>::is_finite(*x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_ordered() {
        assert!(f32::MIN_STEP_SIZE > 0.0 && f32::MIN_STEP_SIZE < f32::MAX_STEP_SIZE);
        assert!(f64::MIN_STEP_SIZE > 0.0 && f64::MIN_STEP_SIZE < f64::MAX_STEP_SIZE);
        assert!(f32::MAX_STEP_SIZE.is_finite());
        assert_eq!(<f64 as Scalar>::EPSILON, f64::EPSILON);
    }

    #[test]
    fn test_conversions() {
        assert_relative_eq!(<f32 as Scalar>::from_f64(0.1), 0.1f32);
        assert_eq!(<f64 as Scalar>::from_usize(7), 7.0);
        assert_eq!(<f32 as Scalar>::from_usize(1 << 20), 1_048_576.0);
    }

    #[test]
    fn test_golden_ratio() {
        let phi = constants::golden_ratio::<f64>();
        assert_relative_eq!(phi * constants::inverse_golden_ratio::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(phi * phi, phi + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_and_finite() {
        let v = DVector::from_vec(vec![3.0, 4.0]);
        assert_relative_eq!(norm(&v), 5.0);
        assert!(all_finite(&v));
        assert!(!all_finite(&DVector::from_vec(vec![1.0, f64::NAN])));
        assert!(!all_finite(&DVector::from_vec(vec![f64::NEG_INFINITY])));
    }
}
