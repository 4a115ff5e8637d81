//! Example: L-BFGS on the Booth function
//!
//! Minimizes f(x, y) = (x + 2y - 7)² + (2x + y - 5)², whose minimum is 0 at
//! (1, 3), and prints the iteration trace.

use qnopt::prelude::*;

/// Booth function with an evaluation counter.
#[derive(Debug, Default)]
struct BoothProblem {
    evaluations: usize,
}

impl EvaluationLogic<f64> for BoothProblem {
    fn evaluate(&mut self, x: &DVector<f64>, _step: f64) -> Result<(f64, DVector<f64>)> {
        self.evaluations += 1;
        let a = x[0] + 2.0 * x[1] - 7.0;
        let b = 2.0 * x[0] + x[1] - 5.0;
        let g = DVector::from_vec(vec![2.0 * a + 4.0 * b, 4.0 * a + 2.0 * b]);
        Ok((a * a + b * b, g))
    }
}

fn main() -> Result<()> {
    println!("L-BFGS on the Booth function");
    println!("============================\n");

    let x0 = DVector::from_vec(vec![-5.0, 8.0]);
    println!("Initial point: [{:.3}, {:.3}]\n", x0[0], x0[1]);

    let params = Parameters::default().with_memory(4).with_epsilon(1e-8);
    let mut optimizer = LBFGS::new(params);
    let mut logic = PrintProgress::new(BoothProblem::default(), 1);

    let result = optimizer.minimize(2, &x0, &mut logic).into_result()?;
    let problem = logic.into_inner();

    println!("\nOptimizer: {}", optimizer.name());
    println!("Return code: {}", result.return_code);
    println!(
        "Solution: [{:.6}, {:.6}]",
        result.optimized_variables[0], result.optimized_variables[1]
    );
    if let Some(fx) = result.final_function_value {
        println!("Final value: {fx:.3e}");
    }
    println!("Iterations: {}", result.iterations);
    println!("Evaluations: {}", problem.evaluations);
    println!("Path length: {}", optimizer.path().len());

    Ok(())
}
