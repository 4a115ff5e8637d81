//! Example: line-search strategies on the extended Rosenbrock function
//!
//! Runs L-BFGS with every smooth line search, then dmL-BFGS with a few
//! momentum coefficients, from the classic starting point (-1.2, 1, ...).

use qnopt::prelude::*;

const N: usize = 100;

fn rosenbrock(x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
    let mut fx = 0.0;
    let mut g = DVector::zeros(x.len());
    for i in (0..x.len()).step_by(2) {
        let t1 = 1.0 - x[i];
        let t2 = 10.0 * (x[i + 1] - x[i] * x[i]);
        g[i + 1] = 20.0 * t2;
        g[i] = -2.0 * (x[i] * g[i + 1] + t1);
        fx += t1 * t1 + t2 * t2;
    }
    Ok((fx, g))
}

fn starting_point() -> DVector<f64> {
    DVector::from_fn(N, |i, _| if i % 2 == 0 { -1.2 } else { 1.0 })
}

fn main() -> Result<()> {
    println!("Extended Rosenbrock, n = {N}");
    println!("==========================\n");

    let x0 = starting_point();

    println!("{:<26} {:>8} {:>6} {:>12}", "line search", "code", "iters", "f(x)");
    for algorithm in LineSearchAlgorithm::ALL
        .into_iter()
        .filter(|a| !a.is_orthant_wise())
    {
        let mut logic = CountingEvaluation::new(FnEvaluation::new(rosenbrock));
        let params = Parameters::default().with_line_search(algorithm);
        let result = LBFGS::new(params).minimize(N, &x0, &mut logic);

        println!(
            "{:<26} {:>8} {:>6} {:>12.3e}   ({} evaluations)",
            format!("{algorithm:?}"),
            result.return_code.code(),
            result.iterations,
            result.final_function_value.unwrap_or(f64::NAN),
            logic.evaluations()
        );
    }

    println!("\n{:<26} {:>8} {:>6} {:>12}", "momentum", "code", "iters", "f(x)");
    for momentum in [0.0, 0.1, 0.3, 0.5] {
        let mut logic = FnEvaluation::new(rosenbrock);
        let mut optimizer = DmLBFGS::new(Parameters::default(), momentum);
        let result = optimizer.minimize(N, &x0, &mut logic);

        println!(
            "{:<26} {:>8} {:>6} {:>12.3e}",
            momentum,
            result.return_code.code(),
            result.iterations,
            result.final_function_value.unwrap_or(f64::NAN)
        );
    }

    Ok(())
}
