//! Example: sparse regression with OWL-QN
//!
//! Fits `min ½‖Ax - b‖² + c‖x‖₁` on synthetic data where only a few of the
//! true coefficients are non-zero, for a range of L1 weights `c`.

use qnopt::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const SAMPLES: usize = 80;
const FEATURES: usize = 20;

/// Least-squares loss on a fixed design matrix.
#[derive(Debug)]
struct Regression {
    a: DMatrix<f64>,
    b: DVector<f64>,
}

impl EvaluationLogic<f64> for Regression {
    fn evaluate(&mut self, x: &DVector<f64>, _step: f64) -> Result<(f64, DVector<f64>)> {
        let r = &self.a * x - &self.b;
        Ok((0.5 * r.dot(&r), self.a.tr_mul(&r)))
    }
}

fn main() -> Result<()> {
    println!("OWL-QN lasso, {SAMPLES} samples x {FEATURES} features");
    println!("==========================================\n");

    let mut rng = SmallRng::seed_from_u64(2024);
    let truth = DVector::from_fn(FEATURES, |i, _| match i {
        0 => 3.0,
        4 => -2.0,
        9 => 1.5,
        _ => 0.0,
    });
    let a = DMatrix::from_fn(SAMPLES, FEATURES, |_, _| rng.gen_range(-1.0..1.0));
    let noise = DVector::from_fn(SAMPLES, |_, _| rng.gen_range(-0.05..0.05));
    let b = &a * &truth + noise;

    let mut problem = Regression { a, b };
    let x0 = DVector::zeros(FEATURES);

    println!("{:>8} {:>8} {:>10} {:>12}", "c", "nnz", "iters", "objective");
    for c in [0.01, 0.1, 1.0, 5.0, 20.0] {
        let params = Parameters::orthant_wise(OrthantWiseParams::new(c));
        let mut optimizer = LBFGS::new(params);
        let result = optimizer.minimize(FEATURES, &x0, &mut problem);

        if !result.is_success() {
            println!("{c:>8} stopped early: {}", result.return_code);
            continue;
        }
        let nnz = result
            .optimized_variables
            .iter()
            .filter(|v| **v != 0.0)
            .count();
        println!(
            "{:>8} {:>8} {:>10} {:>12.5}",
            c,
            nnz,
            result.iterations,
            result.final_function_value.unwrap_or(f64::NAN)
        );
    }

    // The L1 term can also be restricted to a range of variables.
    let ow = OrthantWiseParams::new(1.0).with_start(1);
    let mut optimizer = LBFGS::new(Parameters::orthant_wise(ow));
    let result = optimizer.minimize(FEATURES, &x0, &mut problem).into_result()?;
    println!(
        "\nUnpenalized first coefficient: {:.4} (true value {:.1})",
        result.optimized_variables[0], truth[0]
    );

    Ok(())
}
