//! Investor returns: MOIC and IRR.
//!
//! The single-entry, single-exit case has a closed form. Irregular cash
//! flows are solved numerically with Newton-Raphson seeded at the closed-form
//! estimate, falling back to bisection over a bounded bracket.

use meridian_core::prelude::*;
use meridian_math::solvers::{hybrid, SolverConfig};
use meridian_math::{MathError, MathResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arith;
use crate::config::SolverSettings;

/// Result of solving the IRR of a cash flow series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowReturn {
    /// Internal rate of return (annualized).
    pub irr: Decimal,
    /// Total distributions over total contributions.
    pub moic: Decimal,
    /// Solver iterations used.
    pub iterations: u32,
    /// NPV at `irr`, per unit of contributed capital.
    pub residual: Decimal,
}

/// MOIC and IRR calculator.
///
/// # Example
///
/// ```rust
/// use meridian_valuation::ReturnSolver;
/// use rust_decimal_macros::dec;
///
/// let solver = ReturnSolver::new();
/// let moic = solver.moic(dec!(161.051), dec!(100)).unwrap();
/// let irr = solver.closed_form_irr(moic, dec!(5)).unwrap();
///
/// assert!((irr - dec!(0.10)).abs() < dec!(0.0000001));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReturnSolver {
    config: SolverConfig,
    bracket: (Decimal, Decimal),
    initial_guess: Decimal,
}

impl Default for ReturnSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ReturnSolver {
    /// Creates a solver with the default settings.
    ///
    /// Default tolerance: 1e-10
    /// Default max iterations: 100
    /// Default bracket: [-0.99, 10]
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&SolverSettings::default())
    }

    /// Creates a solver from engine settings.
    #[must_use]
    pub fn from_settings(settings: &SolverSettings) -> Self {
        Self {
            config: settings.solver_config(),
            bracket: settings.bracket(),
            initial_guess: settings.initial_guess,
        }
    }

    /// Sets the solver tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.config = self.config.with_tolerance(tolerance);
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.config = self.config.with_max_iterations(max_iterations);
        self
    }

    /// Sets the bisection fallback bracket.
    #[must_use]
    pub fn with_bracket(mut self, low: Decimal, high: Decimal) -> Self {
        self.bracket = (low, high);
        self
    }

    /// Returns `exit / entry`.
    pub fn moic(&self, exit: Decimal, entry: Decimal) -> EngineResult<Decimal> {
        if entry <= Decimal::ZERO {
            return Err(EngineError::computation(format!(
                "MOIC is undefined for a non-positive entry amount ({entry})"
            )));
        }
        arith::div(exit, entry, "MOIC")
    }

    /// Closed-form annualized return `moic^(1/years) - 1`.
    ///
    /// A one-year hold returns `moic - 1` exactly and a total loss returns
    /// `-1`.
    pub fn closed_form_irr(&self, moic: Decimal, years: Decimal) -> EngineResult<Decimal> {
        if years <= Decimal::ZERO {
            return Err(EngineError::computation(format!(
                "IRR is undefined over a non-positive holding period ({years} years)"
            )));
        }
        if moic.is_sign_negative() && !moic.is_zero() {
            return Err(EngineError::computation(format!(
                "IRR has no real solution for a negative MOIC ({moic})"
            )));
        }
        if moic.is_zero() {
            return Ok(Decimal::NEGATIVE_ONE);
        }
        if years == Decimal::ONE {
            return arith::sub(moic, Decimal::ONE, "IRR");
        }
        let exponent = arith::div(Decimal::ONE, years, "IRR")?;
        let growth = moic
            .checked_powd(exponent)
            .ok_or_else(|| EngineError::overflow("IRR"))?;
        arith::sub(growth, Decimal::ONE, "IRR")
    }

    /// Returns `(moic, irr)` for a single entry and a single exit.
    pub fn annualized_return(
        &self,
        entry: Decimal,
        exit: Decimal,
        years: u32,
    ) -> EngineResult<(Decimal, Decimal)> {
        let moic = self.moic(exit, entry)?;
        let irr = self.closed_form_irr(moic, Decimal::from(years))?;
        Ok((moic, irr))
    }

    /// Total distributions divided by total contributions.
    pub fn moic_from_cash_flows(&self, flows: &[CashFlowPoint]) -> EngineResult<Decimal> {
        let (contributed, distributed) = totals(flows)?;
        self.moic(distributed, contributed)
    }

    /// Solves the rate `r` at which the flows' NPV is zero.
    ///
    /// Flows need at least one contribution (negative) and one distribution
    /// (positive). The NPV is normalized by total contributions so the
    /// tolerance does not depend on the size of the investment. Fails with a
    /// non-convergence error when the tolerance is not met.
    pub fn irr_from_cash_flows(&self, flows: &[CashFlowPoint]) -> EngineResult<CashFlowReturn> {
        let (contributed, distributed) = totals(flows)?;
        let moic = self.moic(distributed, contributed)?;
        let seed = self.seed(flows, moic);

        let npv = |r: Decimal| normalized_npv(flows, contributed, r);
        let dnpv = |r: Decimal| normalized_npv_derivative(flows, contributed, r);

        let result = hybrid(npv, dnpv, seed, Some(self.bracket), &self.config)
            .map_err(arith::from_math)?;

        debug!(
            irr = %result.root,
            iterations = result.iterations,
            residual = %result.residual,
            "solved cash flow IRR"
        );

        Ok(CashFlowReturn {
            irr: result.root,
            moic,
            iterations: result.iterations,
            residual: result.residual,
        })
    }

    /// Closed-form estimate over the span from first contribution to last
    /// distribution. Estimates outside the bracket use the configured guess.
    fn seed(&self, flows: &[CashFlowPoint], moic: Decimal) -> Decimal {
        let start = flows
            .iter()
            .filter(|f| f.is_contribution())
            .map(|f| f.years)
            .min();
        let end = flows
            .iter()
            .filter(|f| f.amount > Decimal::ZERO)
            .map(|f| f.years)
            .max();

        let estimate = match (start, end) {
            (Some(start), Some(end)) if end > start => {
                self.closed_form_irr(moic, end - start).ok()
            }
            _ => None,
        };

        let (low, high) = self.bracket;
        match estimate {
            Some(r) if r > low && r < high => r,
            _ => self.initial_guess,
        }
    }
}

fn totals(flows: &[CashFlowPoint]) -> EngineResult<(Decimal, Decimal)> {
    let mut contributed = Decimal::ZERO;
    let mut distributed = Decimal::ZERO;
    for flow in flows {
        if flow.is_contribution() {
            contributed = arith::sub(contributed, flow.amount, "cash flow totals")?;
        } else {
            distributed = arith::add(distributed, flow.amount, "cash flow totals")?;
        }
    }
    if contributed.is_zero() {
        return Err(EngineError::validation(
            "cash_flows",
            "at least one contribution (negative amount) is required",
        ));
    }
    if distributed.is_zero() {
        return Err(EngineError::validation(
            "cash_flows",
            "at least one distribution (positive amount) is required",
        ));
    }
    Ok((contributed, distributed))
}

/// `(1 + r)^t` for a possibly fractional `t`.
///
/// `None` means the factor is beyond decimal range.
fn growth_factor(base: Decimal, years: Decimal) -> Option<Decimal> {
    if years.fract().is_zero() {
        years.to_u64().and_then(|n| base.checked_powu(n))
    } else {
        base.checked_powd(years)
    }
}

fn one_plus(r: Decimal) -> MathResult<Decimal> {
    let base = r
        .checked_add(Decimal::ONE)
        .ok_or_else(|| MathError::overflow("1 + r"))?;
    if base <= Decimal::ZERO {
        return Err(MathError::invalid_input(format!(
            "rate {r} is at or below -100%"
        )));
    }
    Ok(base)
}

/// Present value of one flow at rate `r`.
///
/// A discount factor beyond decimal range leaves a present value below
/// representable precision and contributes zero.
fn discounted(amount: Decimal, base: Decimal, years: Decimal) -> MathResult<Decimal> {
    match growth_factor(base, years) {
        Some(factor) if !factor.is_zero() => amount
            .checked_div(factor)
            .ok_or_else(|| MathError::overflow("discounting")),
        Some(_) => Err(MathError::overflow("discounting")),
        None if base > Decimal::ONE => Ok(Decimal::ZERO),
        None => Err(MathError::overflow("discounting")),
    }
}

fn normalized_npv(flows: &[CashFlowPoint], scale: Decimal, r: Decimal) -> MathResult<Decimal> {
    let base = one_plus(r)?;
    let mut npv = Decimal::ZERO;
    for flow in flows {
        let pv = discounted(flow.amount, base, flow.years)?;
        npv = npv
            .checked_add(pv)
            .ok_or_else(|| MathError::overflow("NPV"))?;
    }
    npv.checked_div(scale)
        .ok_or_else(|| MathError::overflow("NPV"))
}

/// d/dr of [`normalized_npv`]: `sum(-t * a / (1 + r)^(t + 1)) / scale`.
fn normalized_npv_derivative(
    flows: &[CashFlowPoint],
    scale: Decimal,
    r: Decimal,
) -> MathResult<Decimal> {
    let base = one_plus(r)?;
    let mut slope = Decimal::ZERO;
    for flow in flows {
        if flow.years.is_zero() {
            continue;
        }
        let weighted = flow
            .amount
            .checked_mul(-flow.years)
            .ok_or_else(|| MathError::overflow("NPV derivative"))?;
        let pv = discounted(weighted, base, flow.years + Decimal::ONE)?;
        slope = slope
            .checked_add(pv)
            .ok_or_else(|| MathError::overflow("NPV derivative"))?;
    }
    slope
        .checked_div(scale)
        .ok_or_else(|| MathError::overflow("NPV derivative"))
}
