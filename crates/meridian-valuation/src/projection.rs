//! Multi-year financial projection.

use meridian_core::prelude::*;
use rust_decimal::Decimal;

use crate::arith;

/// Projects revenue, EBITDA and free cash flow from a base year.
///
/// For each year `t = 1..N`:
///
/// ```text
/// revenue_t = revenue_{t-1} * (1 + growth_t)      revenue_0 = base_revenue
/// ebitda_t  = revenue_t * margin_t
/// fcf_t     = conversion(revenue_t, ebitda_t, growth_t)
/// ```
///
/// # Example
///
/// ```rust
/// use meridian_valuation::ProjectionEngine;
/// use meridian_core::types::FcfConversion;
/// use rust_decimal_macros::dec;
///
/// let engine = ProjectionEngine::new(FcfConversion::EbitdaProxy);
/// let years = engine
///     .project_years(dec!(100), &[dec!(0.10), dec!(0.08)], &[dec!(0.25), dec!(0.26)], None)
///     .unwrap();
///
/// assert_eq!(years[1].revenue, dec!(118.8));
/// assert_eq!(years[1].ebitda, dec!(30.888));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine {
    conversion: FcfConversion,
}

impl ProjectionEngine {
    /// Creates a projection engine with a default FCF conversion.
    pub fn new(conversion: FcfConversion) -> Self {
        Self { conversion }
    }

    /// Returns the default FCF conversion.
    pub fn conversion(&self) -> FcfConversion {
        self.conversion
    }

    /// Projects a validated DCF input.
    ///
    /// The input's own `fcf_conversion` wins over the engine default.
    pub fn project(&self, inputs: &DcfInputs) -> EngineResult<Vec<ProjectedYear>> {
        self.project_years(
            inputs.base_revenue,
            &inputs.revenue_growth_rates,
            &inputs.ebitda_margins,
            inputs.fcf_conversion,
        )
    }

    /// Projects one year per entry of `growth_rates`.
    pub fn project_years(
        &self,
        base_revenue: Decimal,
        growth_rates: &[Decimal],
        margins: &[Decimal],
        conversion: Option<FcfConversion>,
    ) -> EngineResult<Vec<ProjectedYear>> {
        if growth_rates.len() != margins.len() {
            return Err(EngineError::computation(format!(
                "projection needs one margin per growth rate ({} growth rates, {} margins)",
                growth_rates.len(),
                margins.len()
            )));
        }

        let conversion = conversion.unwrap_or(self.conversion);
        let mut revenue = base_revenue;
        let mut years = Vec::with_capacity(growth_rates.len());

        for (year, (growth, margin)) in (1u32..).zip(growth_rates.iter().zip(margins)) {
            let factor = arith::add(Decimal::ONE, *growth, "revenue projection")?;
            revenue = arith::mul(revenue, factor, "revenue projection")?;
            let ebitda = arith::mul(revenue, *margin, "EBITDA projection")?;
            let fcf = conversion.free_cash_flow(revenue, ebitda, *growth)?;
            years.push(ProjectedYear {
                year,
                revenue,
                ebitda,
                fcf,
            });
        }

        Ok(years)
    }

    /// Projects revenue and EBITDA at one constant growth rate and margin.
    ///
    /// Year `t` revenue is `base_revenue * (1 + growth)^t`, so the last year
    /// matches the closed-form exit revenue exactly.
    pub fn constant_growth(
        base_revenue: Decimal,
        growth: Decimal,
        margin: Decimal,
        years: u32,
    ) -> EngineResult<Vec<ScenarioYear>> {
        (1..=years)
            .map(|year| {
                let factor = arith::compound(growth, year, "scenario revenue projection")?;
                let revenue = arith::mul(base_revenue, factor, "scenario revenue projection")?;
                let ebitda = arith::mul(revenue, margin, "scenario EBITDA projection")?;
                Ok(ScenarioYear {
                    year,
                    revenue,
                    ebitda,
                })
            })
            .collect()
    }
}
