//! Backtracking line searches.
//!
//! The Armijo, Wolfe and strong Wolfe variants share one loop and differ
//! only in which conditions they test after sufficient decrease holds. The
//! orthant-wise variant has its own loop because it projects every trial
//! point and measures decrease with the actual displacement.

use crate::{
    core::evaluation::{CallbackData, EvaluationLogic},
    error::ReturnCode,
    optimization::{
        line_search::{LineSearch, LineSearchFailure, LineSearchOutcome, LineSearchStep},
        orthantwise::OrthantWiseParams,
        params::LineSearchParams,
    },
    types::{DVector, Scalar},
};
use log::trace;

/// Step multiplier after a failed sufficient-decrease or strong curvature test.
const DECREASE: f64 = 0.5;
/// Step multiplier after a failed Wolfe curvature test.
const INCREASE: f64 = 2.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Armijo,
    Wolfe,
    StrongWolfe,
}

#[allow(clippy::too_many_arguments)]
fn backtrack<T, E>(
    condition: Condition,
    x: &DVector<T>,
    finit: T,
    g: &DVector<T>,
    s: &DVector<T>,
    mut step: T,
    data: &mut CallbackData<'_, E>,
    params: &LineSearchParams<T>,
) -> LineSearchOutcome<T>
where
    T: Scalar,
    E: EvaluationLogic<T> + ?Sized,
{
    if !(step > T::zero()) {
        return Err(LineSearchFailure::new(ReturnCode::InvalidParameters, 0, step));
    }

    let dginit = g.dot(s);
    if !(dginit < T::zero()) {
        return Err(LineSearchFailure::new(ReturnCode::IncreaseGradient, 0, step));
    }

    let dec = <T as Scalar>::from_f64(DECREASE);
    let inc = <T as Scalar>::from_f64(INCREASE);
    let dgtest = params.ftol * dginit;
    let mut count = 0;

    loop {
        let trial = x + s * step;
        count += 1;
        let (f, g_new) = data
            .evaluate(&trial, step)
            .map_err(|e| LineSearchFailure::from_error(&e, count, step))?;
        trace!("backtracking trial {}: step = {}, f = {}", count, step, f);

        let accept = |point: DVector<T>, gradient: DVector<T>| LineSearchStep {
            x: point,
            g: gradient,
            f,
            step,
            evaluations: count,
        };

        // A NaN objective fails this test and shrinks the step.
        let width = if !(f <= finit + step * dgtest) {
            dec
        } else if condition == Condition::Armijo {
            return Ok(accept(trial, g_new));
        } else {
            let dg = g_new.dot(s);
            if dg < params.wolfe * dginit {
                inc
            } else if condition == Condition::Wolfe {
                return Ok(accept(trial, g_new));
            } else if dg > -params.wolfe * dginit {
                dec
            } else {
                return Ok(accept(trial, g_new));
            }
        };

        if step < params.min_step {
            return Err(LineSearchFailure::new(ReturnCode::MinimumStep, count, step));
        }
        if step > params.max_step {
            return Err(LineSearchFailure::new(ReturnCode::MaximumStep, count, step));
        }
        if params.max_line_search <= count {
            return Err(LineSearchFailure::new(
                ReturnCode::MaximumLineSearch,
                count,
                step,
            ));
        }

        step *= width;
    }
}

macro_rules! backtracking_variant {
    ($(#[$doc:meta])* $name:ident, $condition:expr, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $name {
            /// Creates the line search.
            pub fn new() -> Self {
                Self
            }
        }

        impl<T: Scalar> LineSearch<T> for $name {
            fn search<E>(
                &mut self,
                x: &DVector<T>,
                f: T,
                g: &DVector<T>,
                s: &DVector<T>,
                step: T,
                data: &mut CallbackData<'_, E>,
                params: &LineSearchParams<T>,
                _orthant_wise: Option<&OrthantWiseParams<T>>,
            ) -> LineSearchOutcome<T>
            where
                E: EvaluationLogic<T> + ?Sized,
            {
                backtrack($condition, x, f, g, s, step, data, params)
            }

            fn name(&self) -> &str {
                $label
            }
        }
    };
}

backtracking_variant!(
    /// Backtracking until the Armijo condition holds.
    BacktrackingArmijo,
    Condition::Armijo,
    "Backtracking-Armijo"
);

backtracking_variant!(
    /// Backtracking until the Armijo and Wolfe curvature conditions hold.
    ///
    /// The step grows by 2.1 while the slope is still too negative.
    BacktrackingWolfe,
    Condition::Wolfe,
    "Backtracking-Wolfe"
);

backtracking_variant!(
    /// Backtracking until the Armijo and strong Wolfe conditions hold.
    BacktrackingStrongWolfe,
    Condition::StrongWolfe,
    "Backtracking-StrongWolfe"
);

/// Backtracking line search for L1-regularized objectives.
///
/// `g` must be the pseudo-gradient. Trial points are projected onto the
/// orthant of the current iterate, the objective includes `c · ‖x‖₁`, and
/// sufficient decrease is measured with `Σ (x_new_i - x_i) · g_i`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingOrthantWise;

impl BacktrackingOrthantWise {
    /// Creates the line search.
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> LineSearch<T> for BacktrackingOrthantWise {
    fn search<E>(
        &mut self,
        x: &DVector<T>,
        finit: T,
        pg: &DVector<T>,
        s: &DVector<T>,
        mut step: T,
        data: &mut CallbackData<'_, E>,
        params: &LineSearchParams<T>,
        orthant_wise: Option<&OrthantWiseParams<T>>,
    ) -> LineSearchOutcome<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        let Some(ow) = orthant_wise else {
            return Err(LineSearchFailure::new(ReturnCode::InvalidOrthantwise, 0, step));
        };
        if !(step > T::zero()) {
            return Err(LineSearchFailure::new(ReturnCode::InvalidParameters, 0, step));
        }
        if !(pg.dot(s) < T::zero()) {
            return Err(LineSearchFailure::new(ReturnCode::IncreaseGradient, 0, step));
        }

        let dec = <T as Scalar>::from_f64(DECREASE);
        let orthant = ow.orthant(x, pg);
        let mut count = 0;

        loop {
            let trial = ow.project(&(x + s * step), &orthant);
            count += 1;
            let (f, g_new) = data
                .evaluate(&trial, step)
                .map_err(|e| LineSearchFailure::from_error(&e, count, step))?;
            let f = f + ow.penalty(&trial);
            trace!("orthant-wise trial {}: step = {}, f = {}", count, step, f);

            let dgtest = (&trial - x).dot(pg);
            if f <= finit + params.ftol * dgtest {
                return Ok(LineSearchStep {
                    x: trial,
                    g: g_new,
                    f,
                    step,
                    evaluations: count,
                });
            }

            if step < params.min_step {
                return Err(LineSearchFailure::new(ReturnCode::MinimumStep, count, step));
            }
            if step > params.max_step {
                return Err(LineSearchFailure::new(ReturnCode::MaximumStep, count, step));
            }
            if params.max_line_search <= count {
                return Err(LineSearchFailure::new(
                    ReturnCode::MaximumLineSearch,
                    count,
                    step,
                ));
            }

            step *= dec;
        }
    }

    fn name(&self) -> &str {
        "Backtracking-OrthantWise"
    }
}
