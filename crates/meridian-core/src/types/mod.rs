//! Domain types for valuation and scenario runs.
//!
//! This module provides the value objects exchanged with the engine:
//!
//! - [`ValuationMethod`]: The method tag a caller selects
//! - [`MethodInputs`]: One typed input variant per method
//! - [`ProjectionYear`] and [`ValuationResult`]: DCF outputs
//! - [`ScenarioAssumptions`] and [`ScenarioResult`]: what-if modeling
//! - [`CashFlowPoint`]: investor cash flows for generalized return solving

mod cashflow;
mod inputs;
mod method;
mod projection;
mod result;
mod scenario;

pub use cashflow::CashFlowPoint;
pub use inputs::{
    Comparable, CompsInputs, CustomInputs, DcfInputs, FcfConversion, MethodInputs,
};
pub use method::ValuationMethod;
pub use projection::{ProjectedYear, ProjectionYear};
pub use result::{ComparableMultiple, ComparablesSummary, ValuationOutputs, ValuationResult};
pub use scenario::{ScenarioAssumptions, ScenarioResult, ScenarioYear};

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Longest projection horizon accepted unless an engine is configured otherwise.
pub const DEFAULT_MAX_PROJECTION_YEARS: u32 = 50;

/// Checks that `years` lies in `1..=max`.
pub fn check_horizon(years: u32, max: u32) -> EngineResult<()> {
    if years < 1 {
        return Err(EngineError::validation(
            "projection_years",
            "must be at least 1",
        ));
    }
    if years > max {
        return Err(EngineError::validation(
            "projection_years",
            format!("{years} exceeds the maximum horizon of {max} years"),
        ));
    }
    Ok(())
}

/// Checks that a rate expressed as a fraction lies in `[-1, ∞)`.
pub(crate) fn check_rate(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::NEGATIVE_ONE {
        return Err(EngineError::validation(
            field,
            format!("rate {value} is below -1 (a loss of more than 100%)"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_bounds() {
        assert!(check_horizon(1, 10).is_ok());
        assert!(check_horizon(10, 10).is_ok());
        assert_eq!(check_horizon(0, 10).unwrap_err().field(), Some("projection_years"));
        assert_eq!(
            check_horizon(4_000_000_000, DEFAULT_MAX_PROJECTION_YEARS)
                .unwrap_err()
                .field(),
            Some("projection_years")
        );
    }
}
