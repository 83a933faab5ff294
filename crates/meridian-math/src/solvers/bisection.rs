//! Bisection root-finding algorithm.

use rust_decimal::Decimal;

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Bisection root-finding algorithm.
///
/// A simple and reliable bracketing method that works by repeatedly
/// halving the interval and selecting the subinterval containing the root.
///
/// Requires: `f(a) * f(b) < 0` (opposite signs at endpoints)
///
/// Converges when `|f(mid)| < tolerance`. A bracket that narrows without
/// meeting the residual tolerance runs out the iteration budget and fails.
///
/// # Example
///
/// ```rust
/// use meridian_math::solvers::{bisection, SolverConfig};
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
///
/// let f = |x: Decimal| Ok(x * x - dec!(2));
///
/// let result = bisection(f, dec!(1), dec!(2), &SolverConfig::default()).unwrap();
/// assert!((result.root - dec!(1.41421356237)).abs() < dec!(0.000000001));
/// ```
pub fn bisection<F>(f: F, a: Decimal, b: Decimal, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(Decimal) -> MathResult<Decimal>,
{
    let two = Decimal::TWO;
    let mut lo = a.min(b);
    let mut hi = a.max(b);

    let mut f_lo = f(lo)?;
    let f_hi = f(hi)?;

    if f_lo.abs() < config.tolerance {
        return Ok(SolverResult {
            root: lo,
            iterations: 0,
            residual: f_lo,
        });
    }
    if f_hi.abs() < config.tolerance {
        return Ok(SolverResult {
            root: hi,
            iterations: 0,
            residual: f_hi,
        });
    }

    if f_lo.is_sign_negative() == f_hi.is_sign_negative() {
        return Err(MathError::InvalidBracket {
            a: lo,
            b: hi,
            fa: f_lo,
            fb: f_hi,
        });
    }

    for iteration in 0..config.max_iterations {
        let mid = (lo + hi) / two;
        let f_mid = f(mid)?;

        if f_mid.abs() < config.tolerance {
            return Ok(SolverResult {
                root: mid,
                iterations: iteration + 1,
                residual: f_mid,
            });
        }

        if f_mid.is_sign_negative() == f_lo.is_sign_negative() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    let mid = (lo + hi) / two;
    Err(MathError::convergence_failed(
        config.max_iterations,
        f(mid)?.abs(),
    ))
}
