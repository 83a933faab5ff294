//! # Meridian Traits
//!
//! Collaborator traits for the Meridian valuation engine.
//!
//! The engine itself performs no I/O. Anything that fetches or stores lives
//! behind one of these traits, with implementations in the service crate.
//!
//! ## Module Structure
//!
//! - [`company`]: Read-only company lookup ([`CompanyLookup`])
//! - [`sink`]: Persistence of completed results ([`ResultSink`])
//! - [`ids`]: Company and record identifiers
//! - [`error`]: Collaborator error type
//!
//! ## Dependency Injection
//!
//! ```ignore
//! AppState::new(
//!     ValuationOrchestrator::new(config.engine),
//!     Arc::new(impl CompanyLookup),
//!     Arc::new(impl ResultSink),
//! )
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod company;
pub mod error;
pub mod ids;
pub mod sink;

// Re-export commonly used types
pub use company::{CompanyLookup, CompanyMetrics, CompanySnapshot};
pub use error::TraitError;
pub use ids::*;
pub use sink::{AnalysisKind, AnalysisRecord, ResultSink, ScenarioRecord, ValuationRecord};
