//! Meridian valuation server entry point.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_server::store::{InMemoryCompanyStore, InMemoryResultStore};
use meridian_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,meridian=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Meridian Valuation Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/meridian.toml".to_string());

    let server_config = if std::path::Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        ServerConfig::from_file(&config_path)?
    } else {
        info!("Using default configuration");
        ServerConfig::default()
    };

    // Company lookup, seeded from file when configured
    let companies = match &server_config.companies_file {
        Some(path) => {
            let store = InMemoryCompanyStore::from_file(path)?;
            info!("Loaded {} companies from {}", store.len(), path);
            store
        }
        None => InMemoryCompanyStore::new(),
    };

    let server = Server::new(
        server_config,
        Arc::new(companies),
        Arc::new(InMemoryResultStore::new()),
    );
    server.start().await?;

    Ok(())
}
