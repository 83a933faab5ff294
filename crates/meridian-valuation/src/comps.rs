//! Comparable companies valuation.

use meridian_core::prelude::*;
use rust_decimal::Decimal;

use crate::arith;

/// Values a company at a multiple of its peers.
///
/// Every peer with a positive metric contributes `enterprise_value / metric`.
/// The selected multiple (default: the median) is applied to the target's
/// metric value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompsEngine;

impl CompsEngine {
    /// Creates a comps engine.
    pub fn new() -> Self {
        Self
    }

    /// Computes peer multiples and their statistics.
    pub fn summarize(&self, inputs: &CompsInputs) -> EngineResult<ComparablesSummary> {
        let mut comparables = Vec::with_capacity(inputs.comparable_companies.len());
        for peer in &inputs.comparable_companies {
            let Some(metric_value) = peer.metric_value.filter(|v| *v > Decimal::ZERO) else {
                continue;
            };
            let multiple = arith::div(peer.enterprise_value, metric_value, "peer multiple")?;
            comparables.push(ComparableMultiple {
                name: peer.name.clone(),
                enterprise_value: peer.enterprise_value,
                metric_value,
                multiple,
            });
        }

        if comparables.is_empty() {
            return Err(EngineError::computation(format!(
                "could not compute multiples: no comparable has a positive {}",
                inputs.metric
            )));
        }

        let mut sorted: Vec<Decimal> = comparables.iter().map(|c| c.multiple).collect();
        sorted.sort();

        let mut total = Decimal::ZERO;
        for multiple in &sorted {
            total = arith::add(total, *multiple, "mean multiple")?;
        }
        let mean_multiple = arith::div(total, Decimal::from(sorted.len()), "mean multiple")?;
        // Upper-middle element for an even count
        let median_multiple = sorted[sorted.len() / 2];
        let min_multiple = sorted[0];
        let max_multiple = sorted[sorted.len() - 1];

        Ok(ComparablesSummary {
            comparables,
            metric: inputs.metric.clone(),
            mean_multiple,
            median_multiple,
            min_multiple,
            max_multiple,
            selected_multiple: inputs.selected_multiple.unwrap_or(median_multiple),
            target_metric_value: inputs.target_metric_value,
        })
    }

    /// Runs a comps valuation.
    pub fn value(&self, inputs: &CompsInputs) -> EngineResult<ValuationResult> {
        let summary = self.summarize(inputs)?;
        let enterprise_value = arith::mul(
            summary.selected_multiple,
            summary.target_metric_value,
            "implied enterprise value",
        )?;
        let equity_value = inputs
            .net_debt
            .map(|net_debt| arith::sub(enterprise_value, net_debt, "equity value"))
            .transpose()?;

        let mut result = ValuationResult::empty(ValuationMethod::Comps);
        result.enterprise_value = Some(enterprise_value);
        result.equity_value = equity_value;
        result.implied_multiple = Some(summary.selected_multiple);
        result.outputs.comparables = Some(summary);
        Ok(result)
    }
}
