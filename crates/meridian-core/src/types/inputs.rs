//! Typed, per-method valuation inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{check_rate, ValuationMethod};
use crate::error::{EngineError, EngineResult};

/// How projected EBITDA is converted into free cash flow.
///
/// The default treats EBITDA as an unlevered free cash flow proxy. Models
/// with explicit tax, capex, and working-capital assumptions use
/// [`FcfConversion::Explicit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FcfConversion {
    /// `fcf = ebitda`
    #[default]
    EbitdaProxy,
    /// `fcf = ebitda * factor`
    Factor {
        /// Cash conversion factor applied to EBITDA.
        factor: Decimal,
    },
    /// `fcf = ebitda - ebitda * tax - revenue * capex - revenue * nwc * growth`
    Explicit {
        /// Cash tax rate applied to EBITDA.
        tax_rate: Decimal,
        /// Capital expenditure as a fraction of revenue.
        capex_pct_revenue: Decimal,
        /// Net working capital as a fraction of revenue.
        nwc_pct_revenue: Decimal,
    },
}

impl FcfConversion {
    /// Computes free cash flow for one projected year.
    ///
    /// `growth` is the revenue growth rate applied in that year; only the
    /// working-capital term of [`FcfConversion::Explicit`] depends on it.
    pub fn free_cash_flow(
        &self,
        revenue: Decimal,
        ebitda: Decimal,
        growth: Decimal,
    ) -> EngineResult<Decimal> {
        match *self {
            FcfConversion::EbitdaProxy => Ok(ebitda),
            FcfConversion::Factor { factor } => ebitda
                .checked_mul(factor)
                .ok_or_else(|| EngineError::overflow("free cash flow conversion")),
            FcfConversion::Explicit {
                tax_rate,
                capex_pct_revenue,
                nwc_pct_revenue,
            } => {
                let overflow = || EngineError::overflow("free cash flow conversion");
                let tax = ebitda.checked_mul(tax_rate).ok_or_else(overflow)?;
                let capex = revenue.checked_mul(capex_pct_revenue).ok_or_else(overflow)?;
                let nwc_change = revenue
                    .checked_mul(nwc_pct_revenue)
                    .and_then(|v| v.checked_mul(growth))
                    .ok_or_else(overflow)?;
                ebitda
                    .checked_sub(tax)
                    .and_then(|v| v.checked_sub(capex))
                    .and_then(|v| v.checked_sub(nwc_change))
                    .ok_or_else(overflow)
            }
        }
    }

    /// Validates the conversion parameters.
    pub fn validate(&self) -> EngineResult<()> {
        match *self {
            FcfConversion::EbitdaProxy => Ok(()),
            FcfConversion::Factor { factor } => {
                if factor.is_sign_negative() {
                    return Err(EngineError::validation(
                        "fcf_conversion.factor",
                        "conversion factor must not be negative",
                    ));
                }
                Ok(())
            }
            FcfConversion::Explicit {
                tax_rate,
                capex_pct_revenue,
                nwc_pct_revenue,
            } => {
                for (field, value) in [
                    ("fcf_conversion.tax_rate", tax_rate),
                    ("fcf_conversion.capex_pct_revenue", capex_pct_revenue),
                    ("fcf_conversion.nwc_pct_revenue", nwc_pct_revenue),
                ] {
                    if value < Decimal::ZERO || value > Decimal::ONE {
                        return Err(EngineError::validation(field, "must lie in [0, 1]"));
                    }
                }
                Ok(())
            }
        }
    }
}

/// Inputs for a discounted cash flow valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcfInputs {
    /// Revenue of the base (most recent) year.
    pub base_revenue: Decimal,
    /// EBITDA of the base year. May be negative; must be non-zero for the implied multiple.
    pub base_ebitda: Decimal,
    /// Discount rate (WACC) as a fraction.
    pub discount_rate: Decimal,
    /// Perpetuity growth rate after the projection horizon.
    pub terminal_growth_rate: Decimal,
    /// Number of explicitly projected years.
    pub projection_years: u32,
    /// Revenue growth per projected year, chronological.
    pub revenue_growth_rates: Vec<Decimal>,
    /// EBITDA margin per projected year, chronological.
    pub ebitda_margins: Vec<Decimal>,
    /// Net debt deducted from enterprise value. Negative for net cash.
    pub net_debt: Decimal,
    /// Per-run override of the engine's EBITDA to FCF conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcf_conversion: Option<FcfConversion>,
}

impl DcfInputs {
    /// Checks the DCF input constraints.
    ///
    /// Sequence lengths are checked before the rate relationship so that a
    /// malformed projection is reported against the sequence field.
    pub fn validate(&self) -> EngineResult<()> {
        if self.projection_years < 1 {
            return Err(EngineError::validation(
                "projection_years",
                "must be at least 1",
            ));
        }
        let years = self.projection_years as usize;
        if self.revenue_growth_rates.len() != years {
            return Err(EngineError::validation(
                "revenue_growth_rates",
                format!(
                    "expected {years} entries (one per projection year), got {}",
                    self.revenue_growth_rates.len()
                ),
            ));
        }
        if self.ebitda_margins.len() != years {
            return Err(EngineError::validation(
                "ebitda_margins",
                format!(
                    "expected {years} entries (one per projection year), got {}",
                    self.ebitda_margins.len()
                ),
            ));
        }
        if self.base_revenue.is_sign_negative() && !self.base_revenue.is_zero() {
            return Err(EngineError::validation(
                "base_revenue",
                "must not be negative",
            ));
        }
        check_rate("discount_rate", self.discount_rate)?;
        check_rate("terminal_growth_rate", self.terminal_growth_rate)?;
        for (i, rate) in self.revenue_growth_rates.iter().enumerate() {
            check_rate(&format!("revenue_growth_rates[{i}]"), *rate)?;
        }
        for (i, margin) in self.ebitda_margins.iter().enumerate() {
            check_rate(&format!("ebitda_margins[{i}]"), *margin)?;
        }
        if self.discount_rate <= self.terminal_growth_rate {
            return Err(EngineError::validation(
                "terminal_growth_rate",
                format!(
                    "non-convergent terminal value: discount_rate ({}) must exceed terminal_growth_rate ({})",
                    self.discount_rate, self.terminal_growth_rate
                ),
            ));
        }
        if let Some(conversion) = &self.fcf_conversion {
            conversion.validate()?;
        }
        Ok(())
    }
}

/// A comparable company used by the `comps` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparable {
    /// Company name.
    pub name: String,
    /// Observed enterprise value.
    pub enterprise_value: Decimal,
    /// Value of the chosen metric (e.g. EBITDA), if reported.
    pub metric_value: Option<Decimal>,
}

/// Inputs for a comparable companies valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompsInputs {
    /// Peer set.
    pub comparable_companies: Vec<Comparable>,
    /// Metric the multiples are taken over, e.g. `ebitda` or `revenue`.
    pub metric: String,
    /// The target company's value of the same metric.
    pub target_metric_value: Decimal,
    /// Explicit multiple; defaults to the peer median.
    pub selected_multiple: Option<Decimal>,
    /// Net debt, when an equity value is wanted.
    pub net_debt: Option<Decimal>,
}

impl CompsInputs {
    /// Checks the comps input constraints.
    pub fn validate(&self) -> EngineResult<()> {
        if self.comparable_companies.is_empty() {
            return Err(EngineError::validation(
                "comparable_companies",
                "no comparable companies provided",
            ));
        }
        if self.metric.trim().is_empty() {
            return Err(EngineError::validation("metric", "must not be empty"));
        }
        if let Some(multiple) = self.selected_multiple {
            if multiple.is_sign_negative() && !multiple.is_zero() {
                return Err(EngineError::validation(
                    "selected_multiple",
                    "must not be negative",
                ));
            }
        }
        Ok(())
    }
}

/// Inputs for a registered custom model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomInputs {
    /// Name of the registered model.
    pub model: String,
    /// Model-specific parameters, passed through untouched.
    pub params: serde_json::Value,
}

/// The closed set of method-tagged inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "inputs", rename_all = "snake_case")]
pub enum MethodInputs {
    /// Discounted cash flow.
    Dcf(DcfInputs),
    /// Comparable companies.
    Comps(CompsInputs),
    /// Registered custom model.
    Custom(CustomInputs),
}

impl MethodInputs {
    /// Returns the method tag of this input.
    pub fn method(&self) -> ValuationMethod {
        match self {
            MethodInputs::Dcf(_) => ValuationMethod::Dcf,
            MethodInputs::Comps(_) => ValuationMethod::Comps,
            MethodInputs::Custom(_) => ValuationMethod::Custom,
        }
    }

    /// Validates the wrapped input.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            MethodInputs::Dcf(inputs) => inputs.validate(),
            MethodInputs::Comps(inputs) => inputs.validate(),
            MethodInputs::Custom(inputs) => {
                if inputs.model.trim().is_empty() {
                    return Err(EngineError::validation("model", "must not be empty"));
                }
                Ok(())
            }
        }
    }
}
