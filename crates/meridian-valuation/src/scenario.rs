//! Single-exit scenario modeling.

use meridian_core::prelude::*;
use tracing::{debug, instrument};

use crate::arith;
use crate::projection::ProjectionEngine;
use crate::returns::ReturnSolver;

/// Runs what-if scenarios: grow revenue at a constant rate, exit at a
/// multiple of final-year EBITDA, and report the investor's return.
///
/// ```text
/// exit_revenue          = base_revenue * (1 + revenue_growth)^years
/// exit_ebitda           = exit_revenue * ebitda_margin
/// exit_enterprise_value = exit_ebitda * exit_multiple
/// equity_proceeds       = exit_enterprise_value * ownership_pct
/// moic                  = equity_proceeds / initial_investment
/// irr                   = moic^(1/years) - 1
/// ```
///
/// # Example
///
/// ```rust
/// use meridian_valuation::ScenarioEngine;
/// use meridian_core::types::ScenarioAssumptions;
/// use rust_decimal_macros::dec;
///
/// let result = ScenarioEngine::new()
///     .run(&ScenarioAssumptions {
///         base_revenue: dec!(50),
///         revenue_growth: dec!(0.15),
///         ebitda_margin: dec!(0.25),
///         exit_multiple: dec!(12),
///         projection_years: 5,
///         initial_investment: dec!(20),
///         ownership_pct: dec!(1.0),
///     })
///     .unwrap();
///
/// assert_eq!(result.exit_enterprise_value, dec!(301.703578125));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEngine {
    returns: ReturnSolver,
    max_projection_years: u32,
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::with_return_solver(ReturnSolver::default())
    }
}

impl ScenarioEngine {
    /// Creates a scenario engine with the default return solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scenario engine around `returns`.
    pub fn with_return_solver(returns: ReturnSolver) -> Self {
        Self {
            returns,
            max_projection_years: DEFAULT_MAX_PROJECTION_YEARS,
        }
    }

    /// Sets the longest accepted holding period.
    #[must_use]
    pub fn with_max_projection_years(mut self, years: u32) -> Self {
        self.max_projection_years = years;
        self
    }

    /// Runs one scenario.
    #[instrument(level = "debug", skip_all, fields(years = assumptions.projection_years))]
    pub fn run(&self, assumptions: &ScenarioAssumptions) -> EngineResult<ScenarioResult> {
        check_horizon(assumptions.projection_years, self.max_projection_years)?;
        assumptions.validate()?;

        let projections = ProjectionEngine::constant_growth(
            assumptions.base_revenue,
            assumptions.revenue_growth,
            assumptions.ebitda_margin,
            assumptions.projection_years,
        )?;
        let exit_ebitda = projections
            .last()
            .map(|year| year.ebitda)
            .ok_or_else(|| EngineError::computation("scenario has no projection years"))?;

        let exit_enterprise_value =
            arith::mul(exit_ebitda, assumptions.exit_multiple, "exit enterprise value")?;
        let equity_proceeds =
            arith::mul(exit_enterprise_value, assumptions.ownership_pct, "equity proceeds")?;
        let (moic, irr) = self.returns.annualized_return(
            assumptions.initial_investment,
            equity_proceeds,
            assumptions.projection_years,
        )?;

        debug!(%exit_enterprise_value, %moic, %irr, "scenario complete");

        Ok(ScenarioResult {
            moic,
            irr,
            exit_enterprise_value,
            exit_ebitda,
            equity_proceeds,
            projections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn scenario_b() -> ScenarioAssumptions {
        ScenarioAssumptions {
            base_revenue: dec!(50),
            revenue_growth: dec!(0.15),
            ebitda_margin: dec!(0.25),
            exit_multiple: dec!(12),
            projection_years: 5,
            initial_investment: dec!(20),
            ownership_pct: dec!(1.0),
        }
    }

    #[test]
    fn test_scenario_b() {
        let result = ScenarioEngine::new().run(&scenario_b()).unwrap();

        assert_eq!(result.projections.len(), 5);
        assert_eq!(result.projections[4].revenue, dec!(100.567859375));
        assert_eq!(result.exit_ebitda, dec!(25.14196484375));
        assert_eq!(result.exit_enterprise_value, dec!(301.703578125));
        assert_eq!(result.equity_proceeds, dec!(301.703578125));
        assert_eq!(result.moic, dec!(15.08517890625));
        assert!((result.irr - dec!(0.72072)).abs() < dec!(0.00001));
    }

    #[test]
    fn test_single_year_irr() {
        let mut a = scenario_b();
        a.projection_years = 1;
        let result = ScenarioEngine::new().run(&a).unwrap();
        assert_eq!(result.irr, result.moic - Decimal::ONE);
    }

    #[test]
    fn test_partial_ownership() {
        let mut a = scenario_b();
        a.ownership_pct = dec!(0.4);
        let result = ScenarioEngine::new().run(&a).unwrap();
        assert_eq!(result.equity_proceeds, result.exit_enterprise_value * dec!(0.4));
    }

    #[test]
    fn test_zero_ownership_is_total_loss() {
        let mut a = scenario_b();
        a.ownership_pct = Decimal::ZERO;
        let result = ScenarioEngine::new().run(&a).unwrap();
        assert_eq!(result.moic, Decimal::ZERO);
        assert_eq!(result.irr, Decimal::NEGATIVE_ONE);
    }

    #[test]
    fn test_invalid_assumptions() {
        let mut a = scenario_b();
        a.initial_investment = dec!(-5);
        let err = ScenarioEngine::new().run(&a).unwrap_err();
        assert_eq!(err.field(), Some("initial_investment"));
    }

    #[test]
    fn test_horizon_capped() {
        let mut a = scenario_b();
        a.projection_years = 4_000_000_000;
        let err = ScenarioEngine::new().run(&a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("projection_years"));

        a.projection_years = 6;
        let engine = ScenarioEngine::new().with_max_projection_years(5);
        assert_eq!(engine.run(&a).unwrap_err().field(), Some("projection_years"));
    }

    #[test]
    fn test_negative_margin_has_no_real_irr() {
        let mut a = scenario_b();
        a.ebitda_margin = dec!(-0.1);
        let err = ScenarioEngine::new().run(&a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
    }
}
