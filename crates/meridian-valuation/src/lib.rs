//! # Meridian Valuation
//!
//! The valuation and scenario engine.
//!
//! This crate provides:
//!
//! - [`InputValidator`]: Method-specific checks on raw JSON inputs
//! - [`ProjectionEngine`]: Revenue, EBITDA and free cash flow projection
//! - [`DiscountingEngine`]: Present values, Gordon growth terminal value, EV and equity value
//! - [`ReturnSolver`]: MOIC and IRR, closed form and over irregular cash flows
//! - [`ValuationOrchestrator`]: Method dispatch (`dcf`, `comps`, `custom`) and the run stages
//! - [`ScenarioEngine`]: Single-exit what-if modeling
//! - [`SensitivityAnalysis`]: Discount rate x terminal growth grids
//!
//! ## Architecture
//!
//! ```text
//! method + raw inputs ─> InputValidator ─> ProjectionEngine ─> DiscountingEngine ─┐
//!                              │                                                  ├─> ValuationResult
//!                              ├─> CompsEngine ───────────────────────────────────┤
//!                              └─> CustomMethodRegistry ──────────────────────────┘
//!
//! assumptions ─> InputValidator ─> ScenarioEngine ─> ReturnSolver ─> ScenarioResult
//! ```
//!
//! Every run is a pure function of its validated input and the
//! [`EngineConfig`]. Nothing is cached and nothing is retried.
//!
//! ## Example
//!
//! ```rust
//! use meridian_valuation::prelude::*;
//! use serde_json::json;
//!
//! let orchestrator = ValuationOrchestrator::new(EngineConfig::default());
//!
//! let scenario = orchestrator
//!     .run_scenario(&json!({
//!         "base_revenue": 50,
//!         "revenue_growth": 0.15,
//!         "ebitda_margin": 0.25,
//!         "exit_multiple": 12,
//!         "projection_years": 5,
//!         "initial_investment": 20
//!     }))
//!     .unwrap();
//!
//! assert!(scenario.moic > scenario.irr);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]
#![allow(clippy::uninlined_format_args)]

mod arith;

pub mod comps;
pub mod config;
pub mod custom;
pub mod discounting;
pub mod orchestrator;
pub mod projection;
pub mod returns;
pub mod scenario;
pub mod sensitivity;
pub mod validation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::comps::CompsEngine;
    pub use crate::config::{ConfigError, EngineConfig, SolverSettings};
    pub use crate::custom::{CustomMethod, CustomMethodRegistry};
    pub use crate::discounting::{DiscountedCashFlows, DiscountingEngine};
    pub use crate::orchestrator::{RunStage, ValuationOrchestrator};
    pub use crate::projection::ProjectionEngine;
    pub use crate::returns::{CashFlowReturn, ReturnSolver};
    pub use crate::scenario::ScenarioEngine;
    pub use crate::sensitivity::{SensitivityAnalysis, SensitivityGrid};
    pub use crate::validation::InputValidator;
    pub use meridian_core::prelude::*;
}

pub use config::EngineConfig;
pub use discounting::DiscountingEngine;
pub use orchestrator::ValuationOrchestrator;
pub use projection::ProjectionEngine;
pub use returns::ReturnSolver;
pub use scenario::ScenarioEngine;
pub use sensitivity::SensitivityAnalysis;
pub use validation::InputValidator;
