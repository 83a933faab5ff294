//! Discounting and value assembly.

use meridian_core::prelude::*;
use rust_decimal::Decimal;

use crate::arith;

/// Discounted projection and the values assembled from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountedCashFlows {
    /// Projection years with `pv_fcf` attached.
    pub projections: Vec<ProjectionYear>,
    /// Gordon growth terminal value at the end of the horizon.
    pub terminal_value: Decimal,
    /// Present value of the terminal value.
    pub pv_terminal_value: Decimal,
    /// Sum of discounted cash flows plus discounted terminal value.
    pub enterprise_value: Decimal,
    /// `enterprise_value - net_debt`.
    pub equity_value: Decimal,
    /// `enterprise_value / base_ebitda`.
    pub implied_multiple: Decimal,
}

/// Discounts projected cash flows at a constant rate.
///
/// ```text
/// pv_fcf_t          = fcf_t / (1 + r)^t
/// terminal_value    = fcf_N * (1 + g) / (r - g)
/// pv_terminal_value = terminal_value / (1 + r)^N
/// enterprise_value  = sum(pv_fcf_t) + pv_terminal_value
/// ```
///
/// Present values are accumulated in chronological order so identical
/// inputs always produce identical totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountingEngine;

impl DiscountingEngine {
    /// Creates a discounting engine.
    pub fn new() -> Self {
        Self
    }

    /// Returns `amount / (1 + rate)^periods`.
    pub fn present_value(&self, amount: Decimal, rate: Decimal, periods: u32) -> EngineResult<Decimal> {
        let factor = arith::compound(rate, periods, "discount factor")?;
        arith::div(amount, factor, "present value")
    }

    /// Gordon growth terminal value of `final_fcf`.
    ///
    /// Fails when `discount_rate <= terminal_growth_rate`: the perpetuity
    /// does not converge.
    pub fn terminal_value(
        &self,
        final_fcf: Decimal,
        discount_rate: Decimal,
        terminal_growth_rate: Decimal,
    ) -> EngineResult<Decimal> {
        if discount_rate <= terminal_growth_rate {
            return Err(EngineError::computation(format!(
                "non-convergent terminal value: discount_rate ({discount_rate}) must exceed \
                 terminal_growth_rate ({terminal_growth_rate})"
            )));
        }
        let grown = arith::mul(
            final_fcf,
            arith::add(Decimal::ONE, terminal_growth_rate, "terminal value")?,
            "terminal value",
        )?;
        let spread = arith::sub(discount_rate, terminal_growth_rate, "terminal value")?;
        arith::div(grown, spread, "terminal value")
    }

    /// Returns `enterprise_value / base_ebitda`.
    pub fn implied_multiple(&self, enterprise_value: Decimal, base_ebitda: Decimal) -> EngineResult<Decimal> {
        if base_ebitda.is_zero() {
            return Err(EngineError::computation(
                "implied multiple is undefined: base_ebitda is zero",
            ));
        }
        arith::div(enterprise_value, base_ebitda, "implied multiple")
    }

    /// Discounts `projected` and assembles enterprise value, equity value
    /// and implied multiple.
    pub fn discount(
        &self,
        projected: &[ProjectedYear],
        inputs: &DcfInputs,
    ) -> EngineResult<DiscountedCashFlows> {
        let last = projected
            .last()
            .ok_or_else(|| EngineError::computation("no projection years to discount"))?;

        let rate = inputs.discount_rate;
        let mut projections = Vec::with_capacity(projected.len());
        let mut sum_pv_fcf = Decimal::ZERO;

        for year in projected {
            let pv_fcf = self.present_value(year.fcf, rate, year.year)?;
            sum_pv_fcf = arith::add(sum_pv_fcf, pv_fcf, "enterprise value")?;
            projections.push(ProjectionYear::discounted(*year, pv_fcf));
        }

        let terminal_value = self.terminal_value(last.fcf, rate, inputs.terminal_growth_rate)?;
        let pv_terminal_value = self.present_value(terminal_value, rate, last.year)?;
        let enterprise_value = arith::add(sum_pv_fcf, pv_terminal_value, "enterprise value")?;
        let equity_value = arith::sub(enterprise_value, inputs.net_debt, "equity value")?;
        let implied_multiple = self.implied_multiple(enterprise_value, inputs.base_ebitda)?;

        Ok(DiscountedCashFlows {
            projections,
            terminal_value,
            pv_terminal_value,
            enterprise_value,
            equity_value,
            implied_multiple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tolerance() -> Decimal {
        dec!(0.000000000000000001)
    }

    fn scenario_a() -> DcfInputs {
        DcfInputs {
            base_revenue: dec!(100),
            base_ebitda: dec!(25),
            discount_rate: dec!(0.10),
            terminal_growth_rate: dec!(0.025),
            projection_years: 2,
            revenue_growth_rates: vec![dec!(0.10), dec!(0.08)],
            ebitda_margins: vec![dec!(0.25), dec!(0.26)],
            net_debt: dec!(50),
            fcf_conversion: None,
        }
    }

    fn projected() -> Vec<ProjectedYear> {
        vec![
            ProjectedYear {
                year: 1,
                revenue: dec!(110),
                ebitda: dec!(27.5),
                fcf: dec!(27.5),
            },
            ProjectedYear {
                year: 2,
                revenue: dec!(118.8),
                ebitda: dec!(30.888),
                fcf: dec!(30.888),
            },
        ]
    }

    #[test]
    fn test_present_value() {
        let engine = DiscountingEngine::new();
        assert_eq!(engine.present_value(dec!(27.5), dec!(0.10), 1).unwrap(), dec!(25));
        assert_eq!(engine.present_value(dec!(121), dec!(0.10), 2).unwrap(), dec!(100));
    }

    #[test]
    fn test_terminal_value() {
        let tv = DiscountingEngine::new()
            .terminal_value(dec!(30.888), dec!(0.10), dec!(0.025))
            .unwrap();
        assert_eq!(tv, dec!(422.136));
    }

    #[test]
    fn test_terminal_value_requires_rate_above_growth() {
        let err = DiscountingEngine::new()
            .terminal_value(dec!(30), dec!(0.05), dec!(0.05))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert!(err.to_string().contains("non-convergent terminal value"));
    }

    #[test]
    fn test_scenario_a_assembly() {
        let result = DiscountingEngine::new()
            .discount(&projected(), &scenario_a())
            .unwrap();

        assert_eq!(result.projections[0].pv_fcf, dec!(25));
        assert_eq!(result.terminal_value, dec!(422.136));
        assert!((result.pv_terminal_value - dec!(348.87272727272727)).abs() < dec!(0.00000000001));
        assert!((result.enterprise_value - dec!(399.4)).abs() < tolerance());
        assert_eq!(result.equity_value, result.enterprise_value - dec!(50));
        assert_eq!(result.implied_multiple, result.enterprise_value / dec!(25));
    }

    #[test]
    fn test_zero_base_ebitda_fails() {
        let mut inputs = scenario_a();
        inputs.base_ebitda = Decimal::ZERO;
        let err = DiscountingEngine::new()
            .discount(&projected(), &inputs)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert!(err.to_string().contains("base_ebitda"));
    }

    #[test]
    fn test_negative_base_ebitda_gives_negative_multiple() {
        let mut inputs = scenario_a();
        inputs.base_ebitda = dec!(-10);
        let result = DiscountingEngine::new()
            .discount(&projected(), &inputs)
            .unwrap();
        assert!(result.implied_multiple.is_sign_negative());
    }

    #[test]
    fn test_empty_projection_fails() {
        let err = DiscountingEngine::new()
            .discount(&[], &scenario_a())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
    }
}
