//! Persistence of completed results.
//!
//! A [`ResultSink`] receives every completed run. Writes are fire-and-forget
//! from the caller's point of view: a response is never held back or
//! changed by the outcome of a write.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use meridian_core::types::{ScenarioAssumptions, ScenarioResult, ValuationMethod, ValuationResult};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use crate::ids::{CompanyId, RecordId};

/// A completed valuation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Valued company.
    pub company_id: CompanyId,
    /// Valuation date named by the request.
    pub valuation_date: Option<NaiveDate>,
    /// Method that produced the result.
    pub method: ValuationMethod,
    /// The result.
    pub result: ValuationResult,
    /// When the run completed.
    pub created_at: DateTime<Utc>,
}

impl ValuationRecord {
    /// Wraps a result completed now.
    pub fn new(
        company_id: CompanyId,
        valuation_date: Option<NaiveDate>,
        result: ValuationResult,
    ) -> Self {
        Self {
            id: RecordId::new(),
            company_id,
            valuation_date,
            method: result.method,
            result,
            created_at: Utc::now(),
        }
    }
}

/// A completed scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Modeled company.
    pub company_id: CompanyId,
    /// Scenario name.
    pub name: String,
    /// Assumptions the scenario ran with.
    pub assumptions: ScenarioAssumptions,
    /// The result.
    pub result: ScenarioResult,
    /// When the run completed.
    pub created_at: DateTime<Utc>,
}

impl ScenarioRecord {
    /// Wraps a scenario completed now.
    pub fn new(
        company_id: CompanyId,
        name: impl Into<String>,
        assumptions: ScenarioAssumptions,
        result: ScenarioResult,
    ) -> Self {
        Self {
            id: RecordId::new(),
            company_id,
            name: name.into(),
            assumptions,
            result,
            created_at: Utc::now(),
        }
    }
}

/// Kind of an analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Discount rate x terminal growth grid.
    Sensitivity,
    /// IRR over a cash flow series.
    CashFlowReturn,
}

/// A completed analysis with no dedicated record shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Company the analysis belongs to, if any.
    pub company_id: Option<CompanyId>,
    /// What was computed.
    pub kind: AnalysisKind,
    /// The serialized result.
    pub payload: serde_json::Value,
    /// When the analysis completed.
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Serializes `result` into a record completed now.
    pub fn new<T: Serialize>(
        company_id: Option<CompanyId>,
        kind: AnalysisKind,
        result: &T,
    ) -> Result<Self, TraitError> {
        Ok(Self {
            id: RecordId::new(),
            company_id,
            kind,
            payload: serde_json::to_value(result)?,
            created_at: Utc::now(),
        })
    }
}

/// Trait for result persistence.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Store a valuation run.
    async fn save_valuation(&self, record: ValuationRecord) -> Result<(), TraitError>;

    /// Store a scenario run.
    async fn save_scenario(&self, record: ScenarioRecord) -> Result<(), TraitError>;

    /// Store an analysis result.
    async fn save_analysis(&self, record: AnalysisRecord) -> Result<(), TraitError>;
}
