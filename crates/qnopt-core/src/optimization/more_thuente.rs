//! More-Thuente line search.
//!
//! Finds a step satisfying the strong Wolfe conditions
//!
//! f(x + α s) ≤ f(x) + ftol · α · ⟨g, s⟩ and |⟨g(x + α s), s⟩| ≤ gtol · |⟨g, s⟩|
//!
//! by maintaining an interval of uncertainty `[stx, sty]` and choosing each
//! trial step with safeguarded cubic or quadratic interpolation. Until a
//! step with sufficient decrease and non-negative modified slope is found,
//! the search works on the modified function `ψ(α) = f(α) - f(0) - ftol·α·f'(0)`.
//!
//! Reference: J. J. Moré and D. J. Thuente, "Line search algorithms with
//! guaranteed sufficient decrease", ACM TOMS 20(3), 1994.

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
use num_traits::Float;

/// Step, value and slope at one end of the interval of uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Endpoint<T> {
    pub(crate) stp: T,
    pub(crate) f: T,
    pub(crate) dg: T,
}

/// More-Thuente interpolation line search.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoreThuente;

impl MoreThuente {
    /// Creates the line search.
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> LineSearch<T> for MoreThuente {
    fn search<E>(
        &mut self,
        x: &DVector<T>,
        finit: T,
        g: &DVector<T>,
        s: &DVector<T>,
        mut stp: T,
        data: &mut CallbackData<'_, E>,
        params: &LineSearchParams<T>,
        _orthant_wise: Option<&OrthantWiseParams<T>>,
    ) -> LineSearchOutcome<T>
    where
        E: EvaluationLogic<T> + ?Sized,
    {
        if !(stp > T::zero()) {
            return Err(LineSearchFailure::new(ReturnCode::InvalidParameters, 0, stp));
        }

        let dginit = g.dot(s);
        if !(dginit < T::zero()) {
            return Err(LineSearchFailure::new(ReturnCode::IncreaseGradient, 0, stp));
        }

        let half = <T as Scalar>::from_f64(0.5);
        let four = <T as Scalar>::from_f64(4.0);
        let shrink = <T as Scalar>::from_f64(0.66);

        let mut brackt = false;
        let mut stage1 = true;
        let dgtest = params.ftol * dginit;
        let mut width = params.max_step - params.min_step;
        let mut prev_width = width + width;

        let mut bx = Endpoint {
            stp: T::zero(),
            f: finit,
            dg: dginit,
        };
        let mut by = bx;
        let mut count = 0;

        loop {
            let (stmin, stmax) = if brackt {
                (
                    <T as Float>::min(bx.stp, by.stp),
                    <T as Float>::max(bx.stp, by.stp),
                )
            } else {
                (bx.stp, stp + four * (stp - bx.stp))
            };

            stp = <T as Float>::max(stp, params.min_step);
            stp = <T as Float>::min(stp, params.max_step);

            // Fall back to the best step when no further progress is possible.
            if brackt && (stp <= stmin || stmax <= stp || params.max_line_search <= count + 1) {
                stp = bx.stp;
            }

            let trial = x + s * stp;
            count += 1;
            let (f, g_new) = data
                .evaluate(&trial, stp)
                .map_err(|e| LineSearchFailure::from_error(&e, count, stp))?;
            let dg = g_new.dot(s);
            let ftest1 = finit + stp * dgtest;
            trace!(
                "More-Thuente trial {}: stp = {}, f = {}, dg = {}, brackt = {}",
                count,
                stp,
                f,
                dg,
                brackt
            );

            if !<T as Float>::is_finite(f) || !<T as Float>::is_finite(dg) {
                if params.max_line_search <= count {
                    return Err(LineSearchFailure::new(
                        ReturnCode::MaximumLineSearch,
                        count,
                        stp,
                    ));
                }
                if stp <= params.min_step {
                    return Err(LineSearchFailure::new(ReturnCode::MinimumStep, count, stp));
                }
                stp = bx.stp + half * (stp - bx.stp);
                continue;
            }

            if brackt && (stp <= stmin || stmax <= stp) {
                return Err(LineSearchFailure::new(ReturnCode::RoundingError, count, stp));
            }
            if stp == params.max_step && f <= ftest1 && dg <= dgtest {
                return Err(LineSearchFailure::new(ReturnCode::MaximumStep, count, stp));
            }
            if stp == params.min_step && (ftest1 < f || dgtest <= dg) {
                return Err(LineSearchFailure::new(ReturnCode::MinimumStep, count, stp));
            }
            if brackt && (stmax - stmin) <= params.xtol * stmax {
                return Err(LineSearchFailure::new(ReturnCode::WidthTooSmall, count, stp));
            }
            if f <= ftest1 && <T as Float>::abs(dg) <= params.gtol * (-dginit) {
                return Ok(LineSearchStep {
                    x: trial,
                    g: g_new,
                    f,
                    step: stp,
                    evaluations: count,
                });
            }
            if params.max_line_search <= count {
                return Err(LineSearchFailure::new(
                    ReturnCode::MaximumLineSearch,
                    count,
                    stp,
                ));
            }

            if stage1 && f <= ftest1 && <T as Float>::min(params.ftol, params.gtol) * dginit <= dg
            {
                stage1 = false;
            }

            let current = Endpoint { stp, f, dg };
            let update = if stage1 && ftest1 < f && f <= bx.f {
                // Work on the modified function while the lower end has the best value.
                let modify = |e: Endpoint<T>| Endpoint {
                    stp: e.stp,
                    f: e.f - e.stp * dgtest,
                    dg: e.dg - dgtest,
                };
                let mut mx = modify(bx);
                let mut my = modify(by);
                let result = update_trial_interval(
                    &mut mx,
                    &mut my,
                    &mut stp,
                    modify(current),
                    stmin,
                    stmax,
                    &mut brackt,
                );
                let restore = |e: Endpoint<T>| Endpoint {
                    stp: e.stp,
                    f: e.f + e.stp * dgtest,
                    dg: e.dg + dgtest,
                };
                bx = restore(mx);
                by = restore(my);
                result
            } else {
                update_trial_interval(
                    &mut bx,
                    &mut by,
                    &mut stp,
                    current,
                    stmin,
                    stmax,
                    &mut brackt,
                )
            };

            if let Err(code) = update {
                return Err(LineSearchFailure::new(code, count, stp));
            }

            // Force a bisection when the interval does not shrink fast enough.
            if brackt {
                if shrink * prev_width <= <T as Float>::abs(by.stp - bx.stp) {
                    stp = bx.stp + half * (by.stp - bx.stp);
                }
                prev_width = width;
                width = <T as Float>::abs(by.stp - bx.stp);
            }
        }
    }

    fn name(&self) -> &str {
        "More-Thuente"
    }
}

/// Minimizer of the cubic interpolating values and slopes at `u` and `v`.
fn cubic_minimizer<T: Scalar>(u: Endpoint<T>, v: Endpoint<T>) -> T {
    let three = <T as Scalar>::from_f64(3.0);
    let d = v.stp - u.stp;
    let theta = (u.f - v.f) * three / d + u.dg + v.dg;
    let s = <T as Float>::max(
        <T as Float>::abs(theta),
        <T as Float>::max(<T as Float>::abs(u.dg), <T as Float>::abs(v.dg)),
    );
    let a = theta / s;
    let mut gamma = s * <T as Float>::sqrt(a * a - (u.dg / s) * (v.dg / s));
    if v.stp < u.stp {
        gamma = -gamma;
    }
    let p = gamma - u.dg + theta;
    let q = gamma - u.dg + gamma + v.dg;
    u.stp + (p / q) * d
}

/// Cubic minimizer safeguarded to `[xmin, xmax]` when the cubic has no
/// minimizer beyond `v`.
fn cubic_minimizer2<T: Scalar>(u: Endpoint<T>, v: Endpoint<T>, xmin: T, xmax: T) -> T {
    let three = <T as Scalar>::from_f64(3.0);
    let d = v.stp - u.stp;
    let theta = (u.f - v.f) * three / d + u.dg + v.dg;
    let s = <T as Float>::max(
        <T as Float>::abs(theta),
        <T as Float>::max(<T as Float>::abs(u.dg), <T as Float>::abs(v.dg)),
    );
    let a = theta / s;
    let mut gamma = s * <T as Float>::sqrt(<T as Float>::max(
        T::zero(),
        a * a - (u.dg / s) * (v.dg / s),
    ));
    if u.stp < v.stp {
        gamma = -gamma;
    }
    let p = gamma - v.dg + theta;
    let q = gamma - v.dg + gamma + u.dg;
    let r = p / q;
    if r < T::zero() && gamma != T::zero() {
        v.stp - r * d
    } else if d > T::zero() {
        xmax
    } else {
        xmin
    }
}

/// Minimizer of the quadratic interpolating `f(u)`, `f'(u)` and `f(v)`.
fn quadratic_minimizer<T: Scalar>(u: Endpoint<T>, v: Endpoint<T>) -> T {
    let two = <T as Scalar>::from_f64(2.0);
    let a = v.stp - u.stp;
    u.stp + u.dg / ((u.f - v.f) / a + u.dg) / two * a
}

/// Minimizer of the quadratic interpolating `f'(u)` and `f'(v)`.
fn quadratic_minimizer2<T: Scalar>(u: Endpoint<T>, v: Endpoint<T>) -> T {
    let a = u.stp - v.stp;
    v.stp + v.dg / (v.dg - u.dg) * a
}

/// Updates the interval of uncertainty with the trial `t` and picks the
/// next trial step.
///
/// `x` is the endpoint with the lowest value so far, `y` the other end.
/// The four cases follow the relative position of `f(t)` and the sign and
/// magnitude of `f'(t)` against `x`.
pub(crate) fn update_trial_interval<T: Scalar>(
    x: &mut Endpoint<T>,
    y: &mut Endpoint<T>,
    stp: &mut T,
    t: Endpoint<T>,
    tmin: T,
    tmax: T,
    brackt: &mut bool,
) -> Result<(), ReturnCode> {
    let half = <T as Scalar>::from_f64(0.5);
    let dsign = t.dg * (x.dg / <T as Float>::abs(x.dg)) < T::zero();

    if *brackt {
        if t.stp <= <T as Float>::min(x.stp, y.stp) || <T as Float>::max(x.stp, y.stp) <= t.stp {
            return Err(ReturnCode::OutOfInterval);
        }
        if T::zero() <= x.dg * (t.stp - x.stp) {
            return Err(ReturnCode::IncreaseGradient);
        }
        if tmax < tmin {
            return Err(ReturnCode::IncorrectTMinMax);
        }
    }

    let bound;
    let mut newt;

    if x.f < t.f {
        // Higher value: the minimum is bracketed.
        *brackt = true;
        bound = true;
        let mc = cubic_minimizer(*x, t);
        let mq = quadratic_minimizer(*x, t);
        newt = if <T as Float>::abs(mc - x.stp) < <T as Float>::abs(mq - x.stp) {
            mc
        } else {
            mc + half * (mq - mc)
        };
    } else if dsign {
        // Slopes of opposite sign: the minimum is bracketed.
        *brackt = true;
        bound = false;
        let mc = cubic_minimizer(*x, t);
        let mq = quadratic_minimizer2(*x, t);
        newt = if <T as Float>::abs(mc - t.stp) > <T as Float>::abs(mq - t.stp) {
            mc
        } else {
            mq
        };
    } else if <T as Float>::abs(t.dg) < <T as Float>::abs(x.dg) {
        // Lower value, same slope sign, decreasing slope magnitude.
        bound = true;
        let mc = cubic_minimizer2(*x, t, tmin, tmax);
        let mq = quadratic_minimizer2(*x, t);
        let to_mc = <T as Float>::abs(t.stp - mc);
        let to_mq = <T as Float>::abs(t.stp - mq);
        newt = if *brackt {
            if to_mc < to_mq {
                mc
            } else {
                mq
            }
        } else if to_mc > to_mq {
            mc
        } else {
            mq
        };
    } else {
        // Lower value, same slope sign, slope magnitude not decreasing.
        bound = false;
        newt = if *brackt {
            cubic_minimizer(t, *y)
        } else if x.stp < t.stp {
            tmax
        } else {
            tmin
        };
    }

    if x.f < t.f {
        *y = t;
    } else {
        if dsign {
            *y = *x;
        }
        *x = t;
    }

    if tmax < newt {
        newt = tmax;
    }
    if newt < tmin {
        newt = tmin;
    }

    if *brackt && bound {
        let mq = x.stp + <T as Scalar>::from_f64(0.66) * (y.stp - x.stp);
        if x.stp < y.stp {
            if mq < newt {
                newt = mq;
            }
        } else if newt < mq {
            newt = mq;
        }
    }

    *stp = newt;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluation::FnEvaluation;
    use approx::assert_relative_eq;

    fn endpoint(stp: f64, f: f64, dg: f64) -> Endpoint<f64> {
        Endpoint { stp, f, dg }
    }

    #[test]
    fn test_cubic_minimizer_exact_on_cubic() {
        // φ(α) = α³ - 3α, minimum at α = 1
        let phi = |a: f64| endpoint(a, a.powi(3) - 3.0 * a, 3.0 * a * a - 3.0);
        let m = cubic_minimizer(phi(0.0), phi(2.0));
        assert_relative_eq!(m, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_minimizers_exact_on_parabola() {
        // φ(α) = (α - 0.3)²
        let phi = |a: f64| endpoint(a, (a - 0.3).powi(2), 2.0 * (a - 0.3));
        assert_relative_eq!(quadratic_minimizer(phi(0.0), phi(1.0)), 0.3, epsilon = 1e-12);
        assert_relative_eq!(quadratic_minimizer2(phi(0.0), phi(1.0)), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_update_brackets_on_higher_value() {
        let mut x = endpoint(0.0, 1.0, -1.0);
        let mut y = x;
        let mut stp = 4.0;
        let mut brackt = false;
        update_trial_interval(
            &mut x,
            &mut y,
            &mut stp,
            endpoint(4.0, 10.0, 5.0),
            0.0,
            20.0,
            &mut brackt,
        )
        .unwrap();

        assert!(brackt);
        assert_eq!(y.stp, 4.0);
        assert!(stp > 0.0 && stp < 4.0);
    }

    #[test]
    fn test_update_rejects_step_outside_bracket() {
        let mut x = endpoint(0.0, 1.0, -1.0);
        let mut y = endpoint(2.0, 3.0, 1.0);
        let mut stp = 3.0;
        let mut brackt = true;
        let result = update_trial_interval(
            &mut x,
            &mut y,
            &mut stp,
            endpoint(3.0, 2.0, 1.0),
            0.0,
            2.0,
            &mut brackt,
        );
        assert_eq!(result, Err(ReturnCode::OutOfInterval));
    }

    #[test]
    fn test_search_satisfies_strong_wolfe() {
        // Ill-scaled quadratic along the direction.
        let mut logic = FnEvaluation::new(|x: &DVector<f64>| {
            let f = 50.0 * x[0] * x[0] + 0.5 * x[1] * x[1];
            Ok((f, DVector::from_vec(vec![100.0 * x[0], x[1]])))
        });
        let x = DVector::from_vec(vec![1.0, 1.0]);
        let (f, g) = logic.evaluate(&x, 0.0).unwrap();
        let s = -&g;
        let params = LineSearchParams::default();

        let mut data = CallbackData::new(2, &mut logic);
        let step = MoreThuente::new()
            .search(&x, f, &g, &s, 1.0 / s.norm(), &mut data, &params, None)
            .unwrap();

        let dginit = g.dot(&s);
        assert!(step.f <= f + step.step * params.ftol * dginit);
        assert!(step.g.dot(&s).abs() <= params.gtol * dginit.abs());
        assert!(step.evaluations <= params.max_line_search);
    }

    #[test]
    fn test_search_extrapolates_short_step() {
        let mut logic = FnEvaluation::new(|x: &DVector<f64>| Ok(((x[0] - 10.0).powi(2), x.map(|v| 2.0 * (v - 10.0)))));
        let x = DVector::from_vec(vec![0.0]);
        let g = DVector::from_vec(vec![-20.0]);
        let s = DVector::from_vec(vec![1.0]);
        let params = LineSearchParams::default().with_gtol(0.1);

        let mut data = CallbackData::new(1, &mut logic);
        let step = MoreThuente::new()
            .search(&x, 100.0, &g, &s, 0.1, &mut data, &params, None)
            .unwrap();

        assert!(step.step > 1.0);
        assert!(step.g[0].abs() <= 0.1 * 20.0);
    }

    #[test]
    fn test_search_rejects_ascent_direction() {
        let mut logic = FnEvaluation::new(|x: &DVector<f64>| Ok((x.dot(x), x * 2.0)));
        let x = DVector::from_vec(vec![1.0]);
        let g = DVector::from_vec(vec![2.0]);
        let mut data = CallbackData::new(1, &mut logic);

        let failure = MoreThuente::new()
            .search(&x, 1.0, &g, &g.clone(), 1.0, &mut data, &LineSearchParams::default(), None)
            .unwrap_err();
        assert_eq!(failure.code, ReturnCode::IncreaseGradient);
        assert_eq!(failure.evaluations, 0);
    }

    #[test]
    fn test_search_reports_max_step() {
        // Unbounded linear objective: every step is acceptable and the slope never flattens.
        let mut logic = FnEvaluation::new(|x: &DVector<f64>| Ok((-x[0], DVector::from_vec(vec![-1.0]))));
        let x = DVector::from_vec(vec![0.0]);
        let g = DVector::from_vec(vec![-1.0]);
        let s = DVector::from_vec(vec![1.0]);
        let params = LineSearchParams::default().with_step_bounds(1e-20, 100.0);

        let mut data = CallbackData::new(1, &mut logic);
        let failure = MoreThuente::new()
            .search(&x, 0.0, &g, &s, 1.0, &mut data, &params, None)
            .unwrap_err();
        assert_eq!(failure.code, ReturnCode::MaximumStep);
    }
}
