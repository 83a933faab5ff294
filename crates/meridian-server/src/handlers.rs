//! Request handlers.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use meridian_core::prelude::*;
use meridian_traits::{
    AnalysisKind, AnalysisRecord, CompanyId, CompanyLookup, CompanySnapshot, ResultSink,
    ScenarioRecord, TraitError, ValuationRecord,
};
use meridian_valuation::prelude::{CashFlowReturn, SensitivityAnalysis, SensitivityGrid};
use meridian_valuation::ValuationOrchestrator;

/// Application state.
pub struct AppState {
    /// The valuation engine
    pub orchestrator: ValuationOrchestrator,
    /// Company lookup used to resolve `company_id`
    pub companies: Arc<dyn CompanyLookup>,
    /// Sink receiving completed results
    pub sink: Arc<dyn ResultSink>,
}

impl AppState {
    /// Create application state.
    pub fn new(
        orchestrator: ValuationOrchestrator,
        companies: Arc<dyn CompanyLookup>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            orchestrator,
            companies,
            sink,
        }
    }

    async fn company(&self, id: &CompanyId) -> Result<CompanySnapshot, ApiError> {
        self.companies
            .get_company(id)
            .await
            .map_err(ApiError::collaborator)?
            .ok_or_else(|| ApiError::company_not_found(id))
    }
}

/// Hands a sink write to a background task; failures are only logged.
fn spawn_write<F>(write: F)
where
    F: Future<Output = Result<(), TraitError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = write.await {
            warn!(error = %e, "failed to store result");
        }
    });
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

/// A failed request: an HTTP status and its JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                kind: kind.to_string(),
                field: None,
            },
        }
    }

    fn company_not_found(id: &CompanyId) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Company not found: {id}"),
        )
    }

    fn collaborator(e: TraitError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "collaborator_error",
            format!("Company lookup failed: {e}"),
        )
    }

    fn internal(e: TraitError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            e.to_string(),
        )
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match e.kind() {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Computation | ErrorKind::NonConvergence => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            body: ErrorResponse {
                error: e.to_string(),
                kind: e.kind().to_string(),
                field: e.field().map(str::to_string),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// =============================================================================
// HEALTH
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// VALUATION
// =============================================================================

/// Request to value a company.
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    /// Company being valued
    pub company_id: CompanyId,
    /// Valuation date (YYYY-MM-DD)
    pub valuation_date: Option<NaiveDate>,
    /// `dcf`, `comps` or `custom`
    pub method: String,
    /// Method-specific inputs
    #[serde(default)]
    pub inputs: Value,
}

/// Run a valuation.
///
/// DCF inputs that omit `base_revenue`, `base_ebitda` or `net_debt` take them
/// from the company's latest metrics.
pub async fn run_valuation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ValuationRequest>,
) -> Result<Json<ValuationResult>, ApiError> {
    let company = state.company(&request.company_id).await?;

    let mut inputs = request.inputs;
    if matches!(request.method.parse::<ValuationMethod>(), Ok(ValuationMethod::Dcf)) {
        fill_base_financials(&mut inputs, &company);
    }

    let result = state.orchestrator.run(&request.method, &inputs)?;
    debug!(company = %company.id, method = %result.method, "valuation complete");

    let record = ValuationRecord::new(request.company_id, request.valuation_date, result.clone());
    let sink = state.sink.clone();
    spawn_write(async move { sink.save_valuation(record).await });

    Ok(Json(result))
}

/// Request for a discount rate x terminal growth grid.
#[derive(Debug, Deserialize)]
pub struct SensitivityRequest {
    /// Company being valued
    pub company_id: CompanyId,
    /// DCF inputs
    #[serde(default)]
    pub inputs: Value,
    /// Discount rates (rows); defaults to 8% to 12%
    pub discount_rates: Option<Vec<Decimal>>,
    /// Terminal growth rates (columns); defaults to 1.5% to 3.5%
    pub terminal_growth_rates: Option<Vec<Decimal>>,
}

/// Run a DCF sensitivity grid.
pub async fn run_sensitivity(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SensitivityRequest>,
) -> Result<Json<SensitivityGrid>, ApiError> {
    let company = state.company(&request.company_id).await?;

    let mut inputs = request.inputs;
    fill_base_financials(&mut inputs, &company);

    let mut analysis = SensitivityAnalysis::new();
    if let Some(rates) = request.discount_rates {
        analysis = analysis.with_discount_rates(rates);
    }
    if let Some(rates) = request.terminal_growth_rates {
        analysis = analysis.with_terminal_growth_rates(rates);
    }

    let grid = state.orchestrator.run_sensitivity(&inputs, &analysis)?;

    let record = AnalysisRecord::new(Some(request.company_id), AnalysisKind::Sensitivity, &grid)
        .map_err(ApiError::internal)?;
    let sink = state.sink.clone();
    spawn_write(async move { sink.save_analysis(record).await });

    Ok(Json(grid))
}

// =============================================================================
// SCENARIOS
// =============================================================================

/// Request to run a what-if scenario.
#[derive(Debug, Deserialize)]
pub struct ScenarioRequest {
    /// Company being modeled
    pub company_id: CompanyId,
    /// Scenario name
    pub name: String,
    /// Scenario assumptions
    #[serde(default)]
    pub assumptions: Value,
}

/// Scenario response.
#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    /// Scenario name
    pub name: String,
    /// Scenario result
    #[serde(flatten)]
    pub result: ScenarioResult,
}

/// Run a scenario.
///
/// Assumptions that omit `base_revenue` take it from the company's latest
/// metrics.
pub async fn run_scenario(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScenarioRequest>,
) -> Result<Json<ScenarioResponse>, ApiError> {
    let company = state.company(&request.company_id).await?;

    let mut raw = request.assumptions;
    if let (Value::Object(map), Some(revenue)) = (&mut raw, company.revenue()) {
        fill_missing(map, "base_revenue", revenue);
    }

    let assumptions = state.orchestrator.validator().validate_scenario(&raw)?;
    let result = state.orchestrator.scenario_engine().run(&assumptions)?;
    debug!(company = %company.id, scenario = %request.name, "scenario complete");

    let record = ScenarioRecord::new(
        request.company_id,
        request.name.clone(),
        assumptions,
        result.clone(),
    );
    let sink = state.sink.clone();
    spawn_write(async move { sink.save_scenario(record).await });

    Ok(Json(ScenarioResponse {
        name: request.name,
        result,
    }))
}

// =============================================================================
// RETURNS
// =============================================================================

/// Request for the IRR of a cash flow series.
#[derive(Debug, Deserialize)]
pub struct IrrRequest {
    /// Company the flows belong to, if any
    pub company_id: Option<CompanyId>,
    /// `[{ years, amount }]`, contributions negative
    #[serde(default)]
    pub cash_flows: Value,
}

/// Solve the IRR and MOIC of a cash flow series.
pub async fn calculate_irr(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IrrRequest>,
) -> Result<Json<CashFlowReturn>, ApiError> {
    let flows = state
        .orchestrator
        .validator()
        .validate_cash_flows(&request.cash_flows)?;
    let result = state.orchestrator.returns().irr_from_cash_flows(&flows)?;

    let record = AnalysisRecord::new(request.company_id, AnalysisKind::CashFlowReturn, &result)
        .map_err(ApiError::internal)?;
    let sink = state.sink.clone();
    spawn_write(async move { sink.save_analysis(record).await });

    Ok(Json(result))
}

// =============================================================================
// HELPERS
// =============================================================================

/// Fills `base_revenue`, `base_ebitda` and `net_debt` from the company when absent.
fn fill_base_financials(inputs: &mut Value, company: &CompanySnapshot) {
    let Value::Object(map) = inputs else {
        return;
    };
    if let Some(revenue) = company.revenue() {
        fill_missing(map, "base_revenue", revenue);
    }
    if let Some(ebitda) = company.ebitda() {
        fill_missing(map, "base_ebitda", ebitda);
    }
    if let Some(net_debt) = company.net_debt() {
        fill_missing(map, "net_debt", net_debt);
    }
}

fn fill_missing(map: &mut serde_json::Map<String, Value>, key: &str, value: Decimal) {
    if map.get(key).map_or(true, Value::is_null) {
        // Strings keep full decimal precision through validation
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_traits::CompanyMetrics;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn company() -> CompanySnapshot {
        CompanySnapshot::new("acme", "Acme", "USD").with_metrics(CompanyMetrics {
            as_of: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            revenue: Some(dec!(100)),
            ebitda: Some(dec!(25)),
            net_debt: Some(dec!(-15)),
        })
    }

    #[test]
    fn test_fill_only_missing_fields() {
        let mut inputs = json!({"base_revenue": 90, "base_ebitda": null});
        fill_base_financials(&mut inputs, &company());
        assert_eq!(inputs["base_revenue"], json!(90));
        assert_eq!(inputs["base_ebitda"], json!("25"));
    }

    #[test]
    fn test_fill_net_debt_when_absent() {
        let mut inputs = json!({});
        fill_base_financials(&mut inputs, &company());
        assert_eq!(inputs["net_debt"], json!("-15"));

        let mut inputs = json!({"net_debt": 0});
        fill_base_financials(&mut inputs, &company());
        assert_eq!(inputs["net_debt"], json!(0));
    }

    #[test]
    fn test_fill_ignores_non_objects() {
        let mut inputs = json!([1, 2]);
        fill_base_financials(&mut inputs, &company());
        assert_eq!(inputs, json!([1, 2]));
    }

    #[test]
    fn test_error_status_mapping() {
        let validation = ApiError::from(EngineError::missing_field("base_revenue"));
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(validation.body.field.as_deref(), Some("base_revenue"));
        assert_eq!(validation.body.kind, "validation_error");

        let computation = ApiError::from(EngineError::computation("division by zero"));
        assert_eq!(computation.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let stalled = ApiError::from(EngineError::non_convergence(100, dec!(0.5)));
        assert_eq!(stalled.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stalled.body.kind, "non_convergence_error");
    }
}
