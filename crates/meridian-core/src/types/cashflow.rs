//! Investor cash flows for return calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cash flow at a year offset from the investment date.
///
/// Contributions (money in) are negative; distributions and exit proceeds
/// are positive.
///
/// # Example
///
/// ```rust
/// use meridian_core::types::CashFlowPoint;
/// use rust_decimal_macros::dec;
///
/// let entry = CashFlowPoint::contribution(dec!(0), dec!(20));
/// assert_eq!(entry.amount, dec!(-20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    /// Years elapsed since the investment date (may be fractional).
    pub years: Decimal,
    /// Signed amount.
    pub amount: Decimal,
}

impl CashFlowPoint {
    /// Creates a cash flow.
    #[must_use]
    pub fn new(years: Decimal, amount: Decimal) -> Self {
        Self { years, amount }
    }

    /// Creates a contribution of `amount` (stored as a negative flow).
    #[must_use]
    pub fn contribution(years: Decimal, amount: Decimal) -> Self {
        Self::new(years, -amount.abs())
    }

    /// Creates a distribution of `amount` (stored as a positive flow).
    #[must_use]
    pub fn distribution(years: Decimal, amount: Decimal) -> Self {
        Self::new(years, amount.abs())
    }

    /// Returns true if this flow is money in.
    pub fn is_contribution(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}
