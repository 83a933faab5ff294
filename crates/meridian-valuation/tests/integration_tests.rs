//! Integration tests for meridian-valuation.
//!
//! These tests drive the orchestrator end to end with raw JSON inputs, the
//! way the server does.

use std::sync::Arc;

use meridian_valuation::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

// =============================================================================
// TEST FIXTURES
// =============================================================================

/// Two-year DCF with the EBITDA proxy for free cash flow.
fn scenario_a() -> Value {
    json!({
        "base_revenue": 100,
        "base_ebitda": 25,
        "discount_rate": 0.10,
        "terminal_growth_rate": 0.025,
        "projection_years": 2,
        "revenue_growth_rates": [0.10, 0.08],
        "ebitda_margins": [0.25, 0.26],
        "net_debt": 0
    })
}

/// Five-year single-exit scenario at 12x EBITDA.
fn scenario_b() -> Value {
    json!({
        "base_revenue": 50,
        "revenue_growth": 0.15,
        "ebitda_margin": 0.25,
        "exit_multiple": 12,
        "projection_years": 5,
        "initial_investment": 20,
        "ownership_pct": 1.0
    })
}

fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} within {tolerance}, got {actual}"
    );
}

// =============================================================================
// DCF
// =============================================================================

#[test]
fn test_dcf_two_year_projection() {
    let result = ValuationOrchestrator::default()
        .run("dcf", &scenario_a())
        .unwrap();

    assert_eq!(result.method, ValuationMethod::Dcf);
    let years = &result.outputs.projections;
    assert_eq!(years.len(), 2);

    assert_eq!(years[0].year, 1);
    assert_eq!(years[0].revenue, dec!(110));
    assert_eq!(years[0].ebitda, dec!(27.5));
    assert_eq!(years[0].fcf, dec!(27.5));
    assert_close(years[0].pv_fcf, dec!(25), dec!(0.0000001));

    assert_eq!(years[1].year, 2);
    assert_eq!(years[1].revenue, dec!(118.8));
    assert_eq!(years[1].ebitda, dec!(30.888));
    assert_close(years[1].pv_fcf, dec!(25.5272727273), dec!(0.0000001));
}

#[test]
fn test_dcf_terminal_and_enterprise_value() {
    let result = ValuationOrchestrator::default()
        .run("dcf", &scenario_a())
        .unwrap();

    assert_eq!(result.outputs.terminal_value, Some(dec!(422.136)));
    assert_close(
        result.outputs.pv_terminal_value.unwrap(),
        dec!(348.8727272727),
        dec!(0.0000001),
    );

    let ev = result.enterprise_value.unwrap();
    assert_close(ev, dec!(399.4), dec!(0.0000001));
    // Zero net debt
    assert_eq!(result.equity_value, Some(ev));
    assert_eq!(result.implied_multiple, Some(ev / dec!(25)));
}

#[test]
fn test_dcf_accepts_string_numbers() {
    let mut raw = scenario_a();
    raw["base_revenue"] = json!("100");
    raw["discount_rate"] = json!(" 0.10 ");

    let from_strings = ValuationOrchestrator::default().run("dcf", &raw).unwrap();
    let from_numbers = ValuationOrchestrator::default()
        .run("dcf", &scenario_a())
        .unwrap();
    assert_eq!(from_strings.enterprise_value, from_numbers.enterprise_value);
}

#[test]
fn test_dcf_sequence_length_mismatch() {
    let mut raw = scenario_a();
    raw["projection_years"] = json!(3);

    let err = ValuationOrchestrator::default()
        .run("dcf", &raw)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field(), Some("revenue_growth_rates"));
}

#[test]
fn test_dcf_rate_equal_to_growth_rejected() {
    let mut raw = scenario_a();
    raw["terminal_growth_rate"] = json!(0.10);

    let err = ValuationOrchestrator::default()
        .run("dcf", &raw)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("non-convergent"));
}

#[test]
fn test_dcf_missing_field() {
    let mut raw = scenario_a();
    raw.as_object_mut().unwrap().remove("base_ebitda");

    let err = ValuationOrchestrator::default()
        .run("dcf", &raw)
        .unwrap_err();
    assert_eq!(err.field(), Some("base_ebitda"));
}

#[test]
fn test_dcf_explicit_conversion_from_flat_keys() {
    let mut raw = scenario_a();
    raw["tax_rate"] = json!(0.25);
    raw["capex_pct_revenue"] = json!(0.05);
    raw["nwc_pct_revenue"] = json!(0.10);

    let explicit = ValuationOrchestrator::default().run("dcf", &raw).unwrap();
    let proxy = ValuationOrchestrator::default()
        .run("dcf", &scenario_a())
        .unwrap();

    // Taxes, capex and working capital all reduce the cash flow
    assert!(explicit.outputs.projections[0].fcf < proxy.outputs.projections[0].fcf);
    assert!(explicit.enterprise_value.unwrap() < proxy.enterprise_value.unwrap());
}

#[test]
fn test_dcf_is_deterministic() {
    let orchestrator = ValuationOrchestrator::default();
    let first = orchestrator.run("dcf", &scenario_a()).unwrap();
    let second = orchestrator.run("dcf", &scenario_a()).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// COMPS AND CUSTOM
// =============================================================================

#[test]
fn test_comps_end_to_end() {
    let raw = json!({
        "metric": "EBITDA",
        "target_metric_value": 40,
        "net_debt": 100,
        "comparable_companies": [
            {"name": "Alpha", "enterprise_value": 900, "ebitda": 100},
            {"name": "Beta", "enterprise_value": 1100, "ebitda": 100},
            {"name": "Gamma", "enterprise_value": 1300, "ebitda": 100},
            {"name": "Private", "enterprise_value": 700}
        ]
    });

    let result = ValuationOrchestrator::default().run("comps", &raw).unwrap();
    let summary = result.outputs.comparables.as_ref().unwrap();

    assert_eq!(summary.metric, "ebitda");
    assert_eq!(summary.comparables.len(), 3);
    assert_eq!(summary.median_multiple, dec!(11));
    assert_eq!(result.enterprise_value, Some(dec!(440)));
    assert_eq!(result.equity_value, Some(dec!(340)));
}

struct RevenueMultiple;

impl CustomMethod for RevenueMultiple {
    fn name(&self) -> &str {
        "revenue_multiple"
    }

    fn run(&self, params: &Value) -> EngineResult<ValuationResult> {
        let revenue = params["revenue"]
            .as_i64()
            .ok_or_else(|| EngineError::missing_field("params.revenue"))?;
        let mut result = ValuationResult::empty(ValuationMethod::Custom);
        result.enterprise_value = Some(Decimal::from(revenue) * dec!(3));
        result.implied_multiple = Some(dec!(3));
        Ok(result)
    }
}

#[test]
fn test_custom_model_end_to_end() {
    let orchestrator =
        ValuationOrchestrator::default().with_custom_method(Arc::new(RevenueMultiple));

    let result = orchestrator
        .run(
            "custom",
            &json!({"model": "revenue_multiple", "params": {"revenue": 50}}),
        )
        .unwrap();
    assert_eq!(result.method, ValuationMethod::Custom);
    assert_eq!(result.enterprise_value, Some(dec!(150)));

    let err = orchestrator
        .run("custom", &json!({"model": "revenue_multiple", "params": {}}))
        .unwrap_err();
    assert_eq!(err.field(), Some("params.revenue"));
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_scenario_single_exit() {
    let result = ValuationOrchestrator::default()
        .run_scenario(&scenario_b())
        .unwrap();

    assert_eq!(result.projections.len(), 5);
    assert_eq!(result.projections[4].revenue, dec!(100.567859375));
    assert_eq!(result.exit_ebitda, dec!(25.14196484375));
    assert_eq!(result.exit_enterprise_value, dec!(301.703578125));
    assert_eq!(result.equity_proceeds, dec!(301.703578125));
    assert_eq!(result.moic, dec!(15.08517890625));
    assert_close(result.irr, dec!(0.72072), dec!(0.0005));
}

#[test]
fn test_scenario_ownership_scales_proceeds() {
    let mut raw = scenario_b();
    raw["ownership_pct"] = json!(0.4);

    let result = ValuationOrchestrator::default().run_scenario(&raw).unwrap();
    assert_eq!(result.exit_enterprise_value, dec!(301.703578125));
    assert_eq!(result.equity_proceeds, dec!(120.68143125));
    assert_eq!(result.moic, dec!(6.0340715625));
}

#[test]
fn test_scenario_defaults() {
    let result = ValuationOrchestrator::default()
        .run_scenario(&json!({"base_revenue": 100, "initial_investment": 250}))
        .unwrap();

    // 10% growth, 25% margin, 10x, five years, full ownership
    assert_eq!(result.projections.len(), 5);
    assert_eq!(result.exit_ebitda, dec!(40.2627500));
    assert_eq!(result.exit_enterprise_value, dec!(402.627500));
}

#[test]
fn test_scenario_requires_investment() {
    let err = ValuationOrchestrator::default()
        .run_scenario(&json!({"base_revenue": 100}))
        .unwrap_err();
    assert_eq!(err.field(), Some("initial_investment"));
}

// =============================================================================
// SENSITIVITY AND CASH FLOW RETURNS
// =============================================================================

#[test]
fn test_sensitivity_centre_matches_full_run() {
    let orchestrator = ValuationOrchestrator::default();
    let analysis = SensitivityAnalysis::new()
        .with_discount_rates(vec![dec!(0.09), dec!(0.10), dec!(0.11)])
        .with_terminal_growth_rates(vec![dec!(0.02), dec!(0.025), dec!(0.03)]);

    let grid = orchestrator.run_sensitivity(&scenario_a(), &analysis).unwrap();
    let full = orchestrator.run("dcf", &scenario_a()).unwrap();

    assert_eq!(grid.enterprise_values.len(), 3);
    assert_eq!(grid.enterprise_values[1][1], full.enterprise_value);
    assert_eq!(Some(grid.base_enterprise_value), full.enterprise_value);
}

#[test]
fn test_irr_from_cash_flow_series() {
    let orchestrator = ValuationOrchestrator::default();
    let flows = orchestrator
        .validator()
        .validate_cash_flows(&json!([
            {"years": 0, "amount": -100},
            {"years": 1, "amount": 10},
            {"years": 2, "amount": 110}
        ]))
        .unwrap();

    let result = orchestrator.returns().irr_from_cash_flows(&flows).unwrap();
    assert_close(result.irr, dec!(0.10), dec!(0.000001));
    assert_eq!(result.moic, dec!(1.2));
}

#[test]
fn test_irr_matches_closed_form_for_single_exit() {
    let solver = ReturnSolver::new();
    let flows = vec![
        CashFlowPoint::contribution(Decimal::ZERO, dec!(20)),
        CashFlowPoint::distribution(dec!(5), dec!(301.703578125)),
    ];

    let numeric = solver.irr_from_cash_flows(&flows).unwrap();
    let (moic, closed) = solver
        .annualized_return(dec!(20), dec!(301.703578125), 5)
        .unwrap();

    assert_eq!(numeric.moic, moic);
    assert_close(numeric.irr, closed, dec!(0.000001));
}

#[test]
fn test_cash_flows_without_distribution_rejected() {
    let flows = vec![CashFlowPoint::contribution(Decimal::ZERO, dec!(100))];
    let err = ReturnSolver::new().irr_from_cash_flows(&flows).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
