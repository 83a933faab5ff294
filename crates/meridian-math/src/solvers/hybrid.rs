//! Hybrid root-finding algorithm.
//!
//! Combines Newton-Raphson with bisection for robust convergence.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{MathError, MathResult};
use crate::solvers::{bisection, SolverConfig, SolverResult, MIN_DERIVATIVE};

/// Consecutive divergent Newton steps tolerated before falling back.
const MAX_DIVERGENCE: u32 = 3;

/// Newton iterations attempted before falling back to bisection.
const NEWTON_MAX_ITERATIONS: u32 = 20;

/// Hybrid root-finding algorithm.
///
/// Starts with Newton-Raphson for fast quadratic convergence, but falls back
/// to bisection if Newton diverges or encounters problems.
///
/// # Strategy
///
/// 1. Try Newton-Raphson with a limited number of iterations
/// 2. If Newton diverges (residual grows), switch to bisection
/// 3. If Newton hits a zero derivative or an evaluation error, switch to bisection
/// 4. If Newton succeeds, return the result
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `df` - The derivative of the function
/// * `initial_guess` - Starting point for Newton iteration
/// * `bounds` - Optional bracketing interval for the bisection fallback (a, b)
/// * `config` - Solver configuration
pub fn hybrid<F, DF>(
    f: F,
    df: DF,
    initial_guess: Decimal,
    bounds: Option<(Decimal, Decimal)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(Decimal) -> MathResult<Decimal>,
    DF: Fn(Decimal) -> MathResult<Decimal>,
{
    match newton_with_monitoring(&f, &df, initial_guess, config) {
        Ok(result) => Ok(result),
        Err(newton_err) => {
            log::debug!("Newton-Raphson abandoned ({newton_err}); falling back to bisection");
            let (a, b) = match bounds {
                Some(bracket) => bracket,
                None => find_bracket(&f, initial_guess).ok_or_else(|| {
                    MathError::invalid_input(
                        "Newton-Raphson failed and could not find bracketing interval for bisection",
                    )
                })?,
            };
            bisection(&f, a, b, config)
        }
    }
}

/// Newton-Raphson with divergence detection.
///
/// Monitors the iteration and fails fast if divergence is detected.
fn newton_with_monitoring<F, DF>(
    f: &F,
    df: &DF,
    initial_guess: Decimal,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(Decimal) -> MathResult<Decimal>,
    DF: Fn(Decimal) -> MathResult<Decimal>,
{
    let mut x = initial_guess;
    let mut prev_residual = Decimal::MAX;
    let mut divergence_count = 0;

    let newton_max_iter = config.max_iterations.min(NEWTON_MAX_ITERATIONS);

    for iteration in 0..newton_max_iter {
        let fx = f(x)?;
        let residual = fx.abs();

        if residual < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if residual > prev_residual.saturating_mul(Decimal::TWO) {
            divergence_count += 1;
            if divergence_count >= MAX_DIVERGENCE {
                return Err(MathError::invalid_input("Newton-Raphson diverging"));
            }
        } else {
            divergence_count = 0;
        }
        prev_residual = residual;

        let dfx = df(x)?;

        if dfx.abs() < MIN_DERIVATIVE {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx
            .checked_div(dfx)
            .ok_or_else(|| MathError::overflow("Newton step"))?;

        if step.abs() > dec!(10000000000) {
            return Err(MathError::invalid_input("Newton step too large"));
        }

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

    Err(MathError::convergence_failed(newton_max_iter, f(x)?.abs()))
}

/// Attempts to find a bracketing interval for the root.
///
/// Uses exponential expansion from the initial guess. Points where the
/// objective cannot be evaluated are skipped.
fn find_bracket<F>(f: &F, initial_guess: Decimal) -> Option<(Decimal, Decimal)>
where
    F: Fn(Decimal) -> MathResult<Decimal>,
{
    let mut left = initial_guess;
    let mut right = initial_guess;
    let mut delta = dec!(0.1);

    let f_init = f(initial_guess).ok()?;
    let opposite = |a: Decimal, b: Decimal| a.is_sign_negative() != b.is_sign_negative();

    for _ in 0..50 {
        left -= delta;
        right += delta;

        let f_left = f(left).ok();
        let f_right = f(right).ok();

        if let Some(fl) = f_left {
            if opposite(fl, f_init) {
                return Some((left, initial_guess));
            }
        }
        if let Some(fr) = f_right {
            if opposite(fr, f_init) {
                return Some((initial_guess, right));
            }
        }

        delta *= Decimal::TWO;

        if delta > dec!(1000000) {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::DEFAULT_TOLERANCE;

    #[test]
    fn test_sqrt_2() {
        let f = |x: Decimal| Ok(x * x - dec!(2));
        let df = |x: Decimal| Ok(dec!(2) * x);

        let result =
            hybrid(f, df, dec!(1.5), Some((dec!(1), dec!(2))), &SolverConfig::default()).unwrap();

        assert!((result.root - dec!(1.41421356237)).abs() < dec!(0.00000000001));
    }

    #[test]
    fn test_falls_back_on_zero_derivative() {
        // Newton stalls at x = 0 where f'(0) = 0
        let f = |x: Decimal| Ok(x * x * x - Decimal::ONE);
        let df = |x: Decimal| Ok(dec!(3) * x * x);

        let result = hybrid(
            f,
            df,
            Decimal::ZERO,
            Some((dec!(0), dec!(2))),
            &SolverConfig::default(),
        )
        .unwrap();

        assert!((result.root - Decimal::ONE).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_falls_back_on_cycle() {
        let f = |x: Decimal| Ok(x * x * x - dec!(2) * x + dec!(2));
        let df = |x: Decimal| Ok(dec!(3) * x * x - dec!(2));

        let result = hybrid(
            f,
            df,
            Decimal::ZERO,
            Some((dec!(-3), dec!(0))),
            &SolverConfig::default(),
        )
        .unwrap();

        // Real root near -1.7693
        assert!((result.root - dec!(-1.76929235)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_tiny_newton_steps_fall_back_to_bisection() {
        // Overstated derivative: Newton never meets the residual tolerance
        let f = |x: Decimal| Ok(x - dec!(0.3));
        let df = |_x: Decimal| Ok(dec!(1000000000000));

        let result = hybrid(
            f,
            df,
            dec!(0.5),
            Some((dec!(0), dec!(1))),
            &SolverConfig::default(),
        )
        .unwrap();

        assert!(result.residual.abs() < DEFAULT_TOLERANCE);
        assert!((result.root - dec!(0.3)).abs() < DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_finds_bracket_without_bounds() {
        let f = |x: Decimal| Ok(x * x * x - Decimal::ONE);
        let df = |x: Decimal| Ok(dec!(3) * x * x);

        let result = hybrid(f, df, Decimal::ZERO, None, &SolverConfig::default()).unwrap();

        assert!((result.root - Decimal::ONE).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_no_root_reports_error() {
        let f = |x: Decimal| Ok(x * x + Decimal::ONE);
        let df = |x: Decimal| Ok(dec!(2) * x);

        let result = hybrid(f, df, Decimal::ZERO, None, &SolverConfig::default());

        assert!(result.is_err());
    }
}
