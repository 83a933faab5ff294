//! Valuation result contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProjectionYear, ValuationMethod};

/// One peer multiple used by a comps valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparableMultiple {
    /// Peer name.
    pub name: String,
    /// Peer enterprise value.
    pub enterprise_value: Decimal,
    /// Peer metric value.
    pub metric_value: Decimal,
    /// `enterprise_value / metric_value`.
    pub multiple: Decimal,
}

/// Peer multiple statistics reported by a comps valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparablesSummary {
    /// Usable peer multiples, in input order.
    pub comparables: Vec<ComparableMultiple>,
    /// Metric the multiples were taken over.
    pub metric: String,
    /// Arithmetic mean multiple.
    pub mean_multiple: Decimal,
    /// Median multiple.
    pub median_multiple: Decimal,
    /// Lowest multiple.
    pub min_multiple: Decimal,
    /// Highest multiple.
    pub max_multiple: Decimal,
    /// Multiple applied to the target.
    pub selected_multiple: Decimal,
    /// Target metric value the multiple was applied to.
    pub target_metric_value: Decimal,
}

/// Method-specific detail of a valuation result.
///
/// Fields a method does not compute are left unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValuationOutputs {
    /// Discounted projection years (DCF).
    #[serde(default)]
    pub projections: Vec<ProjectionYear>,
    /// Undiscounted terminal value (DCF).
    pub terminal_value: Option<Decimal>,
    /// Present value of the terminal value (DCF).
    pub pv_terminal_value: Option<Decimal>,
    /// Peer statistics (comps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparables: Option<ComparablesSummary>,
    /// Free-form detail returned by a custom model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

/// The result of one valuation run.
///
/// Produced once per run and never mutated; re-running with edited inputs
/// produces a new result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Method that produced this result.
    pub method: ValuationMethod,
    /// Enterprise value.
    pub enterprise_value: Option<Decimal>,
    /// Equity value (`enterprise_value - net_debt`).
    pub equity_value: Option<Decimal>,
    /// Implied multiple (for DCF, `enterprise_value / base_ebitda`).
    pub implied_multiple: Option<Decimal>,
    /// Method-specific detail.
    pub outputs: ValuationOutputs,
}

impl ValuationResult {
    /// Creates an empty result for `method`; every value is unset.
    #[must_use]
    pub fn empty(method: ValuationMethod) -> Self {
        Self {
            method,
            enterprise_value: None,
            equity_value: None,
            implied_multiple: None,
            outputs: ValuationOutputs::default(),
        }
    }
}
