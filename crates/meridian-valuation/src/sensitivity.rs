//! Discount rate x terminal growth sensitivity of a DCF.

use meridian_core::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::discounting::DiscountingEngine;
use crate::projection::ProjectionEngine;

/// Enterprise values over a grid of discount and terminal growth rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Row labels.
    pub discount_rates: Vec<Decimal>,
    /// Column labels.
    pub terminal_growth_rates: Vec<Decimal>,
    /// `enterprise_values[i][j]` is the value at `discount_rates[i]` and
    /// `terminal_growth_rates[j]`; `None` where the rate does not exceed the
    /// growth rate.
    pub enterprise_values: Vec<Vec<Option<Decimal>>>,
    /// Enterprise value at the input's own rates.
    pub base_enterprise_value: Decimal,
}

/// Re-values a DCF across a grid of rates.
///
/// The projection does not depend on either rate, so it is computed once
/// and only the discounting is repeated per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityAnalysis {
    discount_rates: Vec<Decimal>,
    terminal_growth_rates: Vec<Decimal>,
}

impl Default for SensitivityAnalysis {
    fn default() -> Self {
        Self {
            discount_rates: vec![dec!(0.08), dec!(0.09), dec!(0.10), dec!(0.11), dec!(0.12)],
            terminal_growth_rates: vec![
                dec!(0.015),
                dec!(0.02),
                dec!(0.025),
                dec!(0.03),
                dec!(0.035),
            ],
        }
    }
}

impl SensitivityAnalysis {
    /// Creates an analysis over the default ranges: 8% to 12% discount
    /// rates and 1.5% to 3.5% terminal growth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the discount rate range.
    #[must_use]
    pub fn with_discount_rates(mut self, rates: Vec<Decimal>) -> Self {
        self.discount_rates = rates;
        self
    }

    /// Replaces the terminal growth range.
    #[must_use]
    pub fn with_terminal_growth_rates(mut self, rates: Vec<Decimal>) -> Self {
        self.terminal_growth_rates = rates;
        self
    }

    /// Runs the grid for validated DCF inputs.
    pub fn run(
        &self,
        inputs: &DcfInputs,
        projection: &ProjectionEngine,
        discounting: &DiscountingEngine,
    ) -> EngineResult<SensitivityGrid> {
        if self.discount_rates.is_empty() {
            return Err(EngineError::validation("discount_rates", "must not be empty"));
        }
        if self.terminal_growth_rates.is_empty() {
            return Err(EngineError::validation(
                "terminal_growth_rates",
                "must not be empty",
            ));
        }
        inputs.validate()?;

        let projected = projection.project(inputs)?;
        let base_enterprise_value = discounting.discount(&projected, inputs)?.enterprise_value;

        let row = |rate: &Decimal| -> EngineResult<Vec<Option<Decimal>>> {
            self.terminal_growth_rates
                .iter()
                .map(|growth| {
                    if *rate <= *growth {
                        return Ok(None);
                    }
                    let mut cell = inputs.clone();
                    cell.discount_rate = *rate;
                    cell.terminal_growth_rate = *growth;
                    discounting
                        .discount(&projected, &cell)
                        .map(|flows| Some(flows.enterprise_value))
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let enterprise_values = {
            use rayon::prelude::*;
            self.discount_rates
                .par_iter()
                .map(row)
                .collect::<EngineResult<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let enterprise_values = self
            .discount_rates
            .iter()
            .map(row)
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(SensitivityGrid {
            discount_rates: self.discount_rates.clone(),
            terminal_growth_rates: self.terminal_growth_rates.clone(),
            enterprise_values,
            base_enterprise_value,
        })
    }
}
