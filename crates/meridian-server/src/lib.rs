//! # Meridian Server
//!
//! REST server for the Meridian valuation engine.
//!
//! ## Features
//!
//! - DCF, comps and custom valuations with base financials filled from the
//!   company lookup
//! - Sensitivity grids, what-if scenarios and cash flow IRR
//! - Completed results handed to a result sink in the background
//! - Configuration via TOML file
//!
//! ## Usage
//!
//! ```ignore
//! use meridian_server::Server;
//!
//! let server = Server::new(config, companies, sink);
//! server.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod routes;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use meridian_traits::{CompanyLookup, ResultSink};
use meridian_valuation::ValuationOrchestrator;

pub use config::ServerConfig;

/// The Meridian server.
pub struct Server {
    config: ServerConfig,
    orchestrator: ValuationOrchestrator,
    companies: Arc<dyn CompanyLookup>,
    sink: Arc<dyn ResultSink>,
}

impl Server {
    /// Create a new server with an engine built from `config.engine`.
    pub fn new(
        config: ServerConfig,
        companies: Arc<dyn CompanyLookup>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let orchestrator = ValuationOrchestrator::new(config.engine);
        Self {
            config,
            orchestrator,
            companies,
            sink,
        }
    }

    /// Replace the engine, e.g. to register custom valuation models.
    #[must_use]
    pub fn with_orchestrator(mut self, orchestrator: ValuationOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router_with_stores(
            self.orchestrator.clone(),
            self.companies.clone(),
            self.sink.clone(),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::new(
            self.config
                .host
                .parse()
                .unwrap_or_else(|_| [0, 0, 0, 0].into()),
            self.config.port,
        );

        info!("Starting Meridian server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }
}
