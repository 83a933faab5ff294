//! Route definitions.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use meridian_traits::{CompanyLookup, ResultSink};
use meridian_valuation::ValuationOrchestrator;

use crate::handlers::{self, AppState};
use crate::store::{InMemoryCompanyStore, InMemoryResultStore};

/// Create the API router with empty in-memory collaborators.
///
/// # Arguments
/// * `orchestrator` - The valuation engine
pub fn create_router(orchestrator: ValuationOrchestrator) -> Router {
    create_router_with_stores(
        orchestrator,
        Arc::new(InMemoryCompanyStore::new()),
        Arc::new(InMemoryResultStore::new()),
    )
}

/// Create the API router with specific collaborators.
///
/// # Arguments
/// * `orchestrator` - The valuation engine
/// * `companies` - Company lookup for `company_id` resolution
/// * `sink` - Sink receiving completed results
pub fn create_router_with_stores(
    orchestrator: ValuationOrchestrator,
    companies: Arc<dyn CompanyLookup>,
    sink: Arc<dyn ResultSink>,
) -> Router {
    let state = Arc::new(AppState::new(orchestrator, companies, sink));

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Valuation
        .route("/api/valuation/run", post(handlers::run_valuation))
        .route("/api/valuation/sensitivity", post(handlers::run_sensitivity))
        // Scenarios
        .route("/api/scenarios", post(handlers::run_scenario))
        // Returns
        .route("/api/returns/irr", post(handlers::calculate_irr))
        // State
        .with_state(state)
}
