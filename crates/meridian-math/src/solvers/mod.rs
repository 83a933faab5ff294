//! Root-finding algorithms over `Decimal`.
//!
//! This module provides numerical solvers for finding roots of equations:
//!
//! - [`newton_raphson`]: Fast quadratic convergence when derivative is available
//! - [`bisection`]: Simple and reliable bracketing method
//! - [`hybrid`]: Newton-Raphson with bisection fallback for robust convergence
//!
//! Objectives are fallible (`Fn(Decimal) -> MathResult<Decimal>`) because
//! decimal arithmetic overflows instead of saturating to infinity.
//!
//! Every solver accepts a root only when `|f(root)| < tolerance`. A small
//! Newton step or a collapsed bracket alone is not convergence.
//!
//! # Choosing a Solver
//!
//! | Solver | Speed | Reliability | Requires |
//! |--------|-------|-------------|----------|
//! | Newton-Raphson | Fastest (quadratic) | May diverge | Derivative |
//! | Bisection | Slow (linear) | Guaranteed | Bracket |
//! | Hybrid | Fast | Guaranteed* | Initial guess |
//!
//! *When bounds are provided or can be found automatically.
//!
//! # Example: Annualized Return
//!
//! ```rust
//! use meridian_math::solvers::{hybrid, SolverConfig};
//! use rust_decimal::{Decimal, MathematicalOps};
//! use rust_decimal_macros::dec;
//!
//! // 100 invested, 161.051 returned after 5 years: (1 + r)^5 = 1.61051
//! let f = |r: Decimal| Ok((Decimal::ONE + r).powu(5) - dec!(1.61051));
//! let df = |r: Decimal| Ok(dec!(5) * (Decimal::ONE + r).powu(4));
//!
//! let result = hybrid(f, df, dec!(0.05), Some((dec!(-0.99), dec!(10))), &SolverConfig::default()).unwrap();
//! assert!((result.root - dec!(0.10)).abs() < dec!(0.000000001));
//! ```

mod bisection;
mod hybrid;
mod newton;

pub use bisection::bisection;
pub use hybrid::hybrid;
pub use newton::newton_raphson;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.0000000001);

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Derivatives smaller than this are treated as zero.
pub(crate) const MIN_DERIVATIVE: Decimal = dec!(0.000000000000001);

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: Decimal,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: Decimal, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverResult {
    /// The root found.
    pub root: Decimal,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::MathematicalOps;

    #[test]
    fn test_solver_config() {
        let config = SolverConfig::default()
            .with_tolerance(dec!(0.00000001))
            .with_max_iterations(50);

        assert_eq!(config.tolerance, dec!(0.00000001));
        assert_eq!(config.max_iterations, 50);
    }

    /// NPV of an entry at t=0 and a single exit at t=years, scaled by entry.
    fn single_exit_npv(rate: Decimal, moic: Decimal, years: u64) -> Decimal {
        moic / (Decimal::ONE + rate).powu(years) - Decimal::ONE
    }

    #[test]
    fn test_all_solvers_agree_on_annualized_return() {
        let moic = dec!(2.5);
        let f = |r: Decimal| Ok(single_exit_npv(r, moic, 4));
        let df = |r: Decimal| Ok(dec!(-4) * moic / (Decimal::ONE + r).powu(5));
        let config = SolverConfig::default();

        let newton_result = newton_raphson(f, df, dec!(0.2), &config).unwrap();
        let bisection_result = bisection(f, dec!(0), dec!(1), &config).unwrap();
        let hybrid_result = hybrid(f, df, dec!(0.2), Some((dec!(0), dec!(1))), &config).unwrap();

        assert!((newton_result.root - bisection_result.root).abs() < dec!(0.000000001));
        assert!((newton_result.root - hybrid_result.root).abs() < dec!(0.000000001));
        // 2.5^(1/4) - 1
        assert!((newton_result.root - dec!(0.25743342968)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_solver_convergence_speed() {
        let f = |x: Decimal| Ok(x * x - dec!(2));
        let df = |x: Decimal| Ok(dec!(2) * x);
        let config = SolverConfig::default();

        let newton_result = newton_raphson(f, df, dec!(1.5), &config).unwrap();
        let bisection_result = bisection(f, dec!(1), dec!(2), &config).unwrap();

        assert!(newton_result.iterations <= bisection_result.iterations);
    }
}
