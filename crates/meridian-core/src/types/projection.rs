//! Projection year records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A projected year before discounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedYear {
    /// Year offset from the base year, starting at 1.
    pub year: u32,
    /// Projected revenue.
    pub revenue: Decimal,
    /// Projected EBITDA.
    pub ebitda: Decimal,
    /// Free cash flow derived from EBITDA.
    pub fcf: Decimal,
}

/// A fully discounted projection year, as reported in valuation outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionYear {
    /// Year offset from the base year, starting at 1.
    pub year: u32,
    /// Projected revenue.
    pub revenue: Decimal,
    /// Projected EBITDA.
    pub ebitda: Decimal,
    /// Free cash flow.
    pub fcf: Decimal,
    /// Present value of the free cash flow.
    pub pv_fcf: Decimal,
}

impl ProjectionYear {
    /// Attaches a present value to a projected year.
    #[must_use]
    pub fn discounted(projected: ProjectedYear, pv_fcf: Decimal) -> Self {
        Self {
            year: projected.year,
            revenue: projected.revenue,
            ebitda: projected.ebitda,
            fcf: projected.fcf,
            pv_fcf,
        }
    }
}
