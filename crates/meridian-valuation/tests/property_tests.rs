//! Property-based tests for valuation relationships.
//!
//! These tests verify identities that must hold for any valid input:
//! - Equity value = enterprise value - net debt
//! - Implied multiple = enterprise value / base EBITDA
//! - Returns rise with the exit multiple
//! - A one-year hold returns MOIC - 1
//! - A discount rate at or below terminal growth is rejected

use meridian_valuation::prelude::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// STRATEGIES
// =============================================================================

/// A decimal `n / 10^scale` for `n` in `range`.
fn decimal(range: std::ops::Range<i64>, scale: u32) -> impl Strategy<Value = Decimal> {
    range.prop_map(move |n| Decimal::new(n, scale))
}

prop_compose! {
    fn dcf_inputs()(
        years in 1u32..=8,
        base_revenue in decimal(1_000..500_000, 2),
        base_ebitda in decimal(-5_000..50_000, 2).prop_filter("non-zero", |v| !v.is_zero()),
        discount_rate in decimal(500..2_000, 4),
        terminal_growth_rate in decimal(0..400, 4),
        growth in decimal(-1_000..3_000, 4),
        margin in decimal(-500..4_000, 4),
        net_debt in decimal(-10_000..100_000, 2),
    ) -> DcfInputs {
        DcfInputs {
            base_revenue,
            base_ebitda,
            discount_rate,
            terminal_growth_rate,
            projection_years: years,
            revenue_growth_rates: vec![growth; years as usize],
            ebitda_margins: vec![margin; years as usize],
            net_debt,
            fcf_conversion: None,
        }
    }
}

prop_compose! {
    fn scenario()(
        years in 1u32..=10,
        base_revenue in decimal(1_000..500_000, 2),
        revenue_growth in decimal(-500..3_000, 4),
        ebitda_margin in decimal(100..5_000, 4),
        exit_multiple in decimal(10..200, 1),
        initial_investment in decimal(1_000..200_000, 2),
        ownership_pct in decimal(10..101, 2),
    ) -> ScenarioAssumptions {
        ScenarioAssumptions {
            base_revenue,
            revenue_growth,
            ebitda_margin,
            exit_multiple,
            projection_years: years,
            initial_investment,
            ownership_pct,
        }
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn property_equity_is_ev_less_net_debt(inputs in dcf_inputs()) {
        let result = ValuationOrchestrator::default().run_dcf(inputs.clone()).unwrap();
        let ev = result.enterprise_value.unwrap();
        prop_assert_eq!(result.equity_value, Some(ev - inputs.net_debt));
    }

    #[test]
    fn property_implied_multiple_is_ev_over_base_ebitda(inputs in dcf_inputs()) {
        let result = ValuationOrchestrator::default().run_dcf(inputs.clone()).unwrap();
        let ev = result.enterprise_value.unwrap();
        prop_assert_eq!(result.implied_multiple, Some(ev / inputs.base_ebitda));
    }

    #[test]
    fn property_projection_matches_horizon(inputs in dcf_inputs()) {
        let result = ValuationOrchestrator::default().run_dcf(inputs.clone()).unwrap();
        let years: Vec<u32> = result.outputs.projections.iter().map(|y| y.year).collect();
        let expected: Vec<u32> = (1..=inputs.projection_years).collect();
        prop_assert_eq!(years, expected);
    }

    #[test]
    fn property_rate_not_above_growth_rejected(
        inputs in dcf_inputs(),
        excess in decimal(0..300, 4),
    ) {
        let mut inputs = inputs;
        inputs.terminal_growth_rate = inputs.discount_rate + excess;
        let err = ValuationOrchestrator::default().run_dcf(inputs).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn property_returns_rise_with_exit_multiple(
        assumptions in scenario(),
        step in decimal(10..100, 1),
    ) {
        let engine = ScenarioEngine::new();
        let low = engine.run(&assumptions).unwrap();

        let mut richer = assumptions.clone();
        richer.exit_multiple += step;
        let high = engine.run(&richer).unwrap();

        prop_assert!(high.moic > low.moic);
        prop_assert!(high.irr >= low.irr);
    }

    #[test]
    fn property_one_year_irr_is_moic_less_one(assumptions in scenario()) {
        let mut assumptions = assumptions;
        assumptions.projection_years = 1;
        let result = ScenarioEngine::new().run(&assumptions).unwrap();
        prop_assert_eq!(result.irr, result.moic - Decimal::ONE);
    }
}
