//! Newton-Raphson root-finding algorithm.

use rust_decimal::Decimal;

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult, MIN_DERIVATIVE};

/// Newton-Raphson root-finding algorithm.
///
/// Uses the iteration:
/// `x_{n+1} = x_n - f(x_n) / f'(x_n)`
///
/// This method has quadratic convergence near the root but requires
/// the derivative of the function.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `df` - The derivative of the function
/// * `initial_guess` - Starting point for the iteration
/// * `config` - Solver configuration
///
/// # Example
///
/// ```rust
/// use meridian_math::solvers::{newton_raphson, SolverConfig};
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
///
/// // Cube root of 27
/// let f = |x: Decimal| Ok(x * x * x - dec!(27));
/// let df = |x: Decimal| Ok(dec!(3) * x * x);
///
/// let result = newton_raphson(f, df, dec!(2), &SolverConfig::default()).unwrap();
/// assert!((result.root - dec!(3)).abs() < dec!(0.0000000001));
/// ```
pub fn newton_raphson<F, DF>(
    f: F,
    df: DF,
    initial_guess: Decimal,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(Decimal) -> MathResult<Decimal>,
    DF: Fn(Decimal) -> MathResult<Decimal>,
{
    let mut x = initial_guess;

    for iteration in 0..config.max_iterations {
        let fx = f(x)?;

        if fx.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        let dfx = df(x)?;

        if dfx.abs() < MIN_DERIVATIVE {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx
            .checked_div(dfx)
            .ok_or_else(|| MathError::overflow("Newton step"))?;
        x = x
            .checked_sub(step)
            .ok_or_else(|| MathError::overflow("Newton step"))?;

        if step.abs() < config.tolerance {
            let final_fx = f(x)?;
            if final_fx.abs() < config.tolerance {
                return Ok(SolverResult {
                    root: x,
                    iterations: iteration + 1,
                    residual: final_fx,
                });
            }
        }
    }

    let residual = f(x)?.abs();
    log::debug!(
        "Newton-Raphson exhausted {} iterations at x = {} (residual {})",
        config.max_iterations,
        x,
        residual
    );
    Err(MathError::convergence_failed(config.max_iterations, residual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;
    use rust_decimal::prelude::ToPrimitive;

    #[test]
    fn test_sqrt_2() {
        let f = |x: Decimal| Ok(x * x - dec!(2));
        let df = |x: Decimal| Ok(dec!(2) * x);

        let result = newton_raphson(f, df, dec!(1.5), &SolverConfig::default()).unwrap();

        assert_relative_eq!(
            result.root.to_f64().unwrap(),
            std::f64::consts::SQRT_2,
            epsilon = 1e-10
        );
        assert!(result.iterations < 10);
    }

    #[test]
    fn test_zero_derivative_error() {
        let f = |x: Decimal| Ok(x * x * x - Decimal::ONE);
        let df = |x: Decimal| Ok(dec!(3) * x * x);

        let result = newton_raphson(f, df, Decimal::ZERO, &SolverConfig::default());

        assert!(matches!(result, Err(MathError::DivisionByZero { .. })));
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        // Newton cycles between 0 and 1 on x^3 - 2x + 2
        let f = |x: Decimal| Ok(x * x * x - dec!(2) * x + dec!(2));
        let df = |x: Decimal| Ok(dec!(3) * x * x - dec!(2));

        let config = SolverConfig::default().with_max_iterations(20);
        let result = newton_raphson(f, df, Decimal::ZERO, &config);

        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { iterations: 20, .. })
        ));
    }

    #[test]
    fn test_tiny_step_is_not_convergence() {
        // An overstated derivative makes every step tiny while |f| stays near 0.2
        let f = |x: Decimal| Ok(x - dec!(0.3));
        let df = |_x: Decimal| Ok(dec!(1000000000000));

        let result = newton_raphson(f, df, dec!(0.5), &SolverConfig::default());

        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { iterations: 100, .. })
        ));
    }

    #[test]
    fn test_objective_error_propagates() {
        let f = |_x: Decimal| Err(MathError::overflow("objective"));
        let df = |_x: Decimal| Ok(Decimal::ONE);

        let result = newton_raphson(f, df, Decimal::ONE, &SolverConfig::default());

        assert!(matches!(result, Err(MathError::Overflow { .. })));
    }
}
