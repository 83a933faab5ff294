//! Scenario (what-if) modeling types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::check_rate;
use crate::error::{EngineError, EngineResult};

/// Assumptions for a single-exit scenario.
///
/// Unlike the DCF inputs, revenue growth is one constant annual rate and no
/// net-debt adjustment is applied at exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    /// Revenue of the base year.
    pub base_revenue: Decimal,
    /// Constant annual revenue growth.
    pub revenue_growth: Decimal,
    /// EBITDA margin applied at exit.
    pub ebitda_margin: Decimal,
    /// EV / EBITDA multiple at exit.
    pub exit_multiple: Decimal,
    /// Holding period in years.
    pub projection_years: u32,
    /// Amount invested at entry.
    pub initial_investment: Decimal,
    /// Fraction of equity held by the modeled investor.
    pub ownership_pct: Decimal,
}

impl ScenarioAssumptions {
    /// Checks the scenario input constraints.
    pub fn validate(&self) -> EngineResult<()> {
        if self.projection_years < 1 {
            return Err(EngineError::validation(
                "projection_years",
                "must be at least 1",
            ));
        }
        if self.initial_investment <= Decimal::ZERO {
            return Err(EngineError::validation(
                "initial_investment",
                "must be greater than zero",
            ));
        }
        if self.base_revenue < Decimal::ZERO {
            return Err(EngineError::validation(
                "base_revenue",
                "must not be negative",
            ));
        }
        check_rate("revenue_growth", self.revenue_growth)?;
        check_rate("ebitda_margin", self.ebitda_margin)?;
        if self.exit_multiple < Decimal::ZERO {
            return Err(EngineError::validation(
                "exit_multiple",
                "must not be negative",
            ));
        }
        if self.ownership_pct < Decimal::ZERO || self.ownership_pct > Decimal::ONE {
            return Err(EngineError::validation(
                "ownership_pct",
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// One projected scenario year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioYear {
    /// Year offset, starting at 1.
    pub year: u32,
    /// Projected revenue.
    pub revenue: Decimal,
    /// Projected EBITDA.
    pub ebitda: Decimal,
}

/// The result of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Multiple on invested capital.
    pub moic: Decimal,
    /// Annualized return.
    pub irr: Decimal,
    /// Enterprise value at exit.
    pub exit_enterprise_value: Decimal,
    /// EBITDA in the exit year.
    pub exit_ebitda: Decimal,
    /// Exit proceeds attributable to the modeled investor.
    pub equity_proceeds: Decimal,
    /// Year-by-year projection up to exit.
    pub projections: Vec<ScenarioYear>,
}
