//! Read-only company lookup.
//!
//! The engine never fetches its own inputs. A caller that only has a company
//! id uses a [`CompanyLookup`] to find the latest reported financials and
//! fills any base-year figures the request omits.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use crate::ids::CompanyId;

/// Most recent reported financials of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMetrics {
    /// Reporting date of the figures.
    pub as_of: NaiveDate,
    /// Last twelve months revenue.
    pub revenue: Option<Decimal>,
    /// Last twelve months EBITDA.
    pub ebitda: Option<Decimal>,
    /// Net debt, negative for net cash.
    pub net_debt: Option<Decimal>,
}

/// A company as seen by the valuation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    /// Company identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Reporting currency (ISO 4217).
    pub currency: String,
    /// Latest metrics, if any have been reported.
    pub metrics: Option<CompanyMetrics>,
}

impl CompanySnapshot {
    /// Creates a snapshot without metrics.
    pub fn new(id: impl Into<CompanyId>, name: impl Into<String>, currency: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            currency: currency.to_uppercase(),
            metrics: None,
        }
    }

    /// Attaches the latest metrics.
    #[must_use]
    pub fn with_metrics(mut self, metrics: CompanyMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Latest reported revenue.
    pub fn revenue(&self) -> Option<Decimal> {
        self.metrics.as_ref().and_then(|m| m.revenue)
    }

    /// Latest reported EBITDA.
    pub fn ebitda(&self) -> Option<Decimal> {
        self.metrics.as_ref().and_then(|m| m.ebitda)
    }

    /// Latest reported net debt.
    pub fn net_debt(&self) -> Option<Decimal> {
        self.metrics.as_ref().and_then(|m| m.net_debt)
    }
}

/// Trait for company lookups.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    /// Get a company by ID.
    async fn get_company(&self, id: &CompanyId) -> Result<Option<CompanySnapshot>, TraitError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metric_accessors() {
        let company = CompanySnapshot::new("acme", "Acme Holdings", "usd");
        assert_eq!(company.currency, "USD");
        assert_eq!(company.revenue(), None);

        let company = company.with_metrics(CompanyMetrics {
            as_of: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            revenue: Some(dec!(120)),
            ebitda: Some(dec!(30)),
            net_debt: None,
        });
        assert_eq!(company.revenue(), Some(dec!(120)));
        assert_eq!(company.ebitda(), Some(dec!(30)));
    }
}
