//! Input validation.
//!
//! Turns a method tag plus a raw JSON object into typed, validated inputs.
//! Every string-to-number conversion in the engine happens here: callers
//! historically submitted form strings, so `"0.10"` and `0.10` are both
//! accepted. Unknown keys are ignored.

use std::str::FromStr;

use meridian_core::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};

/// Default projection horizon for scenarios.
const DEFAULT_SCENARIO_YEARS: u32 = 5;

/// Metric used by `comps` when none is named.
const DEFAULT_COMPS_METRIC: &str = "ebitda";

/// Defaults for the flat tax / capex / working-capital keys of a `dcf` input.
const DEFAULT_TAX_RATE: Decimal = dec!(0.25);
const DEFAULT_CAPEX_PCT_REVENUE: Decimal = dec!(0.05);
const DEFAULT_NWC_PCT_REVENUE: Decimal = dec!(0.10);

/// Validates raw inputs before any computation.
///
/// # Example
///
/// ```rust
/// use meridian_valuation::InputValidator;
/// use meridian_core::MethodInputs;
/// use serde_json::json;
///
/// let raw = json!({
///     "base_revenue": "100",
///     "base_ebitda": 25,
///     "discount_rate": 0.10,
///     "terminal_growth_rate": 0.025,
///     "projection_years": 2,
///     "revenue_growth_rates": [0.10, 0.08],
///     "ebitda_margins": [0.25, 0.26],
///     "net_debt": 0,
///     "analyst": "ignored"
/// });
///
/// let inputs = InputValidator::default().validate("dcf", &raw).unwrap();
/// assert!(matches!(inputs, MethodInputs::Dcf(_)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InputValidator {
    max_projection_years: u32,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROJECTION_YEARS)
    }
}

impl InputValidator {
    /// Creates a validator accepting horizons of up to `max_projection_years`.
    pub fn new(max_projection_years: u32) -> Self {
        Self {
            max_projection_years,
        }
    }

    /// Returns the longest accepted projection horizon.
    pub fn max_projection_years(&self) -> u32 {
        self.max_projection_years
    }

    /// Validates `raw` against the rules of `method`.
    pub fn validate(&self, method: &str, raw: &Value) -> EngineResult<MethodInputs> {
        let method = ValuationMethod::from_str(method)?;
        self.validate_for(method, raw)
    }

    /// Validates `raw` against the rules of an already-parsed method tag.
    pub fn validate_for(&self, method: ValuationMethod, raw: &Value) -> EngineResult<MethodInputs> {
        let inputs = match method {
            ValuationMethod::Dcf => MethodInputs::Dcf(self.validate_dcf(raw)?),
            ValuationMethod::Comps => MethodInputs::Comps(self.validate_comps(raw)?),
            ValuationMethod::Custom => MethodInputs::Custom(self.validate_custom(raw)?),
        };
        Ok(inputs)
    }

    /// Validates discounted cash flow inputs.
    pub fn validate_dcf(&self, raw: &Value) -> EngineResult<DcfInputs> {
        let map = object(raw, "inputs")?;

        let inputs = DcfInputs {
            base_revenue: required_decimal(map, "base_revenue")?,
            base_ebitda: required_decimal(map, "base_ebitda")?,
            discount_rate: required_decimal(map, "discount_rate")?,
            terminal_growth_rate: required_decimal(map, "terminal_growth_rate")?,
            projection_years: required_count(map, "projection_years")?,
            revenue_growth_rates: required_sequence(map, "revenue_growth_rates")?,
            ebitda_margins: required_sequence(map, "ebitda_margins")?,
            net_debt: optional_decimal(map, "net_debt")?.unwrap_or(Decimal::ZERO),
            fcf_conversion: fcf_conversion(map)?,
        };

        check_horizon(inputs.projection_years, self.max_projection_years)?;
        inputs.validate()?;
        Ok(inputs)
    }

    /// Validates comparable companies inputs.
    pub fn validate_comps(&self, raw: &Value) -> EngineResult<CompsInputs> {
        let map = object(raw, "inputs")?;

        let metric = match present(map, "metric") {
            Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
            Some(other) => {
                return Err(EngineError::validation(
                    "metric",
                    format!("expected a string, got {}", describe(other)),
                ))
            }
            None => DEFAULT_COMPS_METRIC.to_string(),
        };

        let peers = match present(map, "comparable_companies") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(EngineError::validation(
                    "comparable_companies",
                    format!("expected a list, got {}", describe(other)),
                ))
            }
            None => return Err(EngineError::missing_field("comparable_companies")),
        };

        let comparable_companies = peers
            .iter()
            .enumerate()
            .map(|(i, peer)| comparable(i, peer, &metric))
            .collect::<EngineResult<Vec<_>>>()?;

        let inputs = CompsInputs {
            comparable_companies,
            metric,
            target_metric_value: required_decimal(map, "target_metric_value")?,
            selected_multiple: optional_decimal(map, "selected_multiple")?,
            net_debt: optional_decimal(map, "net_debt")?,
        };

        inputs.validate()?;
        Ok(inputs)
    }

    /// Validates custom model inputs.
    ///
    /// Only `model` is checked here; `params` is handed to the registered
    /// model as-is.
    pub fn validate_custom(&self, raw: &Value) -> EngineResult<CustomInputs> {
        let map = object(raw, "inputs")?;

        let model = match present(map, "model") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => {
                return Err(EngineError::validation(
                    "model",
                    format!("expected a string, got {}", describe(other)),
                ))
            }
            None => return Err(EngineError::missing_field("model")),
        };

        let inputs = CustomInputs {
            model,
            params: present(map, "params")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        };

        MethodInputs::Custom(inputs.clone()).validate()?;
        Ok(inputs)
    }

    /// Validates scenario assumptions.
    ///
    /// `base_revenue` and `initial_investment` are required. The remaining
    /// assumptions fall back to a five-year hold at 10% growth, a 25% margin,
    /// a 10x exit multiple and full ownership.
    pub fn validate_scenario(&self, raw: &Value) -> EngineResult<ScenarioAssumptions> {
        let map = object(raw, "assumptions")?;

        let assumptions = ScenarioAssumptions {
            base_revenue: required_decimal(map, "base_revenue")?,
            revenue_growth: optional_decimal(map, "revenue_growth")?.unwrap_or(dec!(0.10)),
            ebitda_margin: optional_decimal(map, "ebitda_margin")?.unwrap_or(dec!(0.25)),
            exit_multiple: optional_decimal(map, "exit_multiple")?.unwrap_or(dec!(10)),
            projection_years: optional_count(map, "projection_years")?
                .unwrap_or(DEFAULT_SCENARIO_YEARS),
            initial_investment: required_decimal(map, "initial_investment")?,
            ownership_pct: optional_decimal(map, "ownership_pct")?.unwrap_or(Decimal::ONE),
        };

        check_horizon(assumptions.projection_years, self.max_projection_years)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Validates a list of `{ years, amount }` investor cash flows.
    pub fn validate_cash_flows(&self, raw: &Value) -> EngineResult<Vec<CashFlowPoint>> {
        let items = match raw {
            Value::Array(items) => items,
            other => {
                return Err(EngineError::validation(
                    "cash_flows",
                    format!("expected a list, got {}", describe(other)),
                ))
            }
        };

        let mut flows = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let field = format!("cash_flows[{i}]");
            let map = object(item, &field)?;
            let years = match present(map, "years") {
                Some(v) => parse_decimal(&format!("{field}.years"), v)?,
                None => return Err(EngineError::missing_field(format!("{field}.years"))),
            };
            if years.is_sign_negative() && !years.is_zero() {
                return Err(EngineError::validation(
                    format!("{field}.years"),
                    "must not be negative",
                ));
            }
            let amount = match present(map, "amount") {
                Some(v) => parse_decimal(&format!("{field}.amount"), v)?,
                None => return Err(EngineError::missing_field(format!("{field}.amount"))),
            };
            flows.push(CashFlowPoint::new(years, amount));
        }
        Ok(flows)
    }
}

/// Returns the value for `key`, treating JSON `null` as absent.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn object<'a>(raw: &'a Value, field: &str) -> EngineResult<&'a Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        EngineError::validation(field, format!("expected an object, got {}", describe(raw)))
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Parses a JSON number or numeric string.
fn parse_decimal(field: &str, value: &Value) -> EngineResult<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(EngineError::validation(
                field,
                format!("expected a number, got {}", describe(other)),
            ))
        }
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| EngineError::validation(field, format!("'{text}' is not a valid number")))
}

fn required_decimal(map: &Map<String, Value>, field: &str) -> EngineResult<Decimal> {
    match present(map, field) {
        Some(v) => parse_decimal(field, v),
        None => Err(EngineError::missing_field(field)),
    }
}

fn optional_decimal(map: &Map<String, Value>, field: &str) -> EngineResult<Option<Decimal>> {
    present(map, field)
        .map(|v| parse_decimal(field, v))
        .transpose()
}

/// Parses a whole, non-negative count such as a number of years.
fn parse_count(field: &str, value: &Value) -> EngineResult<u32> {
    let n = parse_decimal(field, value)?;
    if !n.fract().is_zero() {
        return Err(EngineError::validation(field, format!("{n} is not a whole number")));
    }
    if n.is_sign_negative() && !n.is_zero() {
        return Err(EngineError::validation(field, "must be at least 1"));
    }
    n.to_u32()
        .ok_or_else(|| EngineError::validation(field, format!("{n} is out of range")))
}

fn required_count(map: &Map<String, Value>, field: &str) -> EngineResult<u32> {
    match present(map, field) {
        Some(v) => parse_count(field, v),
        None => Err(EngineError::missing_field(field)),
    }
}

fn optional_count(map: &Map<String, Value>, field: &str) -> EngineResult<Option<u32>> {
    present(map, field)
        .map(|v| parse_count(field, v))
        .transpose()
}

fn required_sequence(map: &Map<String, Value>, field: &str) -> EngineResult<Vec<Decimal>> {
    match present(map, field) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| parse_decimal(&format!("{field}[{i}]"), v))
            .collect(),
        Some(other) => Err(EngineError::validation(
            field,
            format!("expected a list, got {}", describe(other)),
        )),
        None => Err(EngineError::missing_field(field)),
    }
}

/// Reads the FCF conversion override of a `dcf` input.
///
/// A structured `fcf_conversion` object wins. Otherwise any of the flat
/// `tax_rate`, `capex_pct_revenue` or `nwc_pct_revenue` keys selects the
/// explicit conversion, with the missing ones at their defaults.
fn fcf_conversion(map: &Map<String, Value>) -> EngineResult<Option<FcfConversion>> {
    if let Some(value) = present(map, "fcf_conversion") {
        let conversion: FcfConversion = serde_json::from_value(value.clone())
            .map_err(|e| EngineError::validation("fcf_conversion", e.to_string()))?;
        return Ok(Some(conversion));
    }

    let tax_rate = optional_decimal(map, "tax_rate")?;
    let capex_pct_revenue = optional_decimal(map, "capex_pct_revenue")?;
    let nwc_pct_revenue = optional_decimal(map, "nwc_pct_revenue")?;

    if tax_rate.is_none() && capex_pct_revenue.is_none() && nwc_pct_revenue.is_none() {
        return Ok(None);
    }

    Ok(Some(FcfConversion::Explicit {
        tax_rate: tax_rate.unwrap_or(DEFAULT_TAX_RATE),
        capex_pct_revenue: capex_pct_revenue.unwrap_or(DEFAULT_CAPEX_PCT_REVENUE),
        nwc_pct_revenue: nwc_pct_revenue.unwrap_or(DEFAULT_NWC_PCT_REVENUE),
    }))
}

/// Parses one peer of a `comps` input.
///
/// The metric value is read from the key named by `metric` (e.g. `ebitda`),
/// falling back to `metric_value`.
fn comparable(index: usize, raw: &Value, metric: &str) -> EngineResult<Comparable> {
    let field = format!("comparable_companies[{index}]");
    let map = object(raw, &field)?;

    let name = match present(map, "name") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(EngineError::validation(
                format!("{field}.name"),
                format!("expected a string, got {}", describe(other)),
            ))
        }
        None => "Unknown".to_string(),
    };

    let enterprise_value = match present(map, "enterprise_value") {
        Some(v) => parse_decimal(&format!("{field}.enterprise_value"), v)?,
        None => Decimal::ZERO,
    };

    let metric_value = match present(map, metric) {
        Some(v) => Some(parse_decimal(&format!("{field}.{metric}"), v)?),
        None => match present(map, "metric_value") {
            Some(v) => Some(parse_decimal(&format!("{field}.metric_value"), v)?),
            None => None,
        },
    };

    Ok(Comparable {
        name,
        enterprise_value,
        metric_value,
    })
}
