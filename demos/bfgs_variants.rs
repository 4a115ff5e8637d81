//! Example: full-memory BFGS variants
//!
//! Compares the exact, backtracking and pluggable line searches of BFGS,
//! the steepest-descent mode, a finite-difference gradient and a
//! penalty-constrained problem.

use qnopt::prelude::*;

fn himmelblau_value(x: &DVector<f64>) -> f64 {
    let a = x[0] * x[0] + x[1] - 11.0;
    let b = x[0] + x[1] * x[1] - 7.0;
    a * a + b * b
}

fn himmelblau(x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
    let a = x[0] * x[0] + x[1] - 11.0;
    let b = x[0] + x[1] * x[1] - 7.0;
    let g = DVector::from_vec(vec![4.0 * a * x[0] + 2.0 * b, 2.0 * a + 4.0 * b * x[1]]);
    Ok((himmelblau_value(x), g))
}

fn report(label: &str, result: &OptimizationResult<f64>) {
    println!(
        "{:<24} {:>18} {:>6} {:>6}  x = [{:.5}, {:.5}]",
        label,
        result.return_code.description(),
        result.iterations,
        result.evaluations,
        result.optimized_variables[0],
        result.optimized_variables[1]
    );
}

fn main() -> Result<()> {
    println!("BFGS on Himmelblau's function");
    println!("=============================\n");

    let x0 = DVector::from_vec(vec![0.0, 0.0]);
    println!(
        "{:<24} {:>18} {:>6} {:>6}",
        "variant", "outcome", "iters", "evals"
    );

    let variants = [
        ("exact", BFGSConfig::new()),
        (
            "backtracking",
            BFGSConfig::new().with_line_search(BFGSLineSearch::Backtracking),
        ),
        (
            "more-thuente",
            BFGSConfig::new()
                .with_line_search(BFGSLineSearch::Strategy(LineSearchAlgorithm::MoreThuente)),
        ),
        (
            "strong wolfe, damped",
            BFGSConfig::new()
                .with_line_search(BFGSLineSearch::Strategy(
                    LineSearchAlgorithm::BacktrackingStrongWolfe,
                ))
                .with_damping(0.5),
        ),
        (
            "steepest descent",
            BFGSConfig::new()
                .with_steepest_descent(true)
                .with_max_iterations(5000),
        ),
    ];

    for (label, config) in variants {
        let mut optimizer = BFGS::new(config);
        let result = optimizer.minimize(2, &x0, &mut FnEvaluation::new(himmelblau));
        report(label, &result);
    }

    // Same function, gradient by central differences.
    let objective = FnObjective::new(himmelblau_value);
    let mut optimizer = BFGS::new(BFGSConfig::new().with_tolerance(1e-10));
    let result = optimizer.minimize_numerically(2, &x0, objective);
    report("finite differences", &result);

    // Himmelblau restricted to the disc x² + y² <= 4.
    let objective = FnObjective::new(himmelblau_value);
    let constrained = PenaltyObjective::new(objective, |x: &DVector<f64>| {
        Ok(Constraints::inequality(DVector::from_vec(vec![x.dot(x) - 4.0])))
    })
    .with_weight(1e3);
    let mut optimizer = BFGS::new(BFGSConfig::new().with_tolerance(1e-8));
    let result = optimizer.minimize_numerically(2, &x0, constrained);
    report("penalty, disc r = 2", &result);

    if let Some(h) = optimizer.inverse_hessian() {
        println!("\nFinal inverse Hessian estimate:\n{h:.4}");
    }

    Ok(())
}
