//! # Meridian Core
//!
//! Core domain types and the error taxonomy for the Meridian valuation engine.
//!
//! This crate provides the value objects shared by every other Meridian crate:
//!
//! - **Methods**: The closed set of valuation method tags (`dcf`, `comps`, `custom`)
//! - **Inputs**: One typed input structure per method, plus scenario assumptions
//! - **Results**: Projection years, valuation results, and scenario results
//! - **Cash Flows**: Dated investor cash flows for generalized return solving
//! - **Errors**: `Validation`, `Computation`, and `NonConvergence` failures
//!
//! ## Design Philosophy
//!
//! - **Decimal Everywhere**: Monetary amounts and rates are `rust_decimal::Decimal`
//! - **Closed Variants**: A method tag always comes with its own typed input
//! - **Immutable Results**: Results are produced once per run and never mutated
//!
//! ## Example
//!
//! ```rust
//! use meridian_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let assumptions = ScenarioAssumptions {
//!     base_revenue: dec!(50),
//!     revenue_growth: dec!(0.15),
//!     ebitda_margin: dec!(0.25),
//!     exit_multiple: dec!(12),
//!     projection_years: 5,
//!     initial_investment: dec!(20),
//!     ownership_pct: dec!(1.0),
//! };
//! assert!(assumptions.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{EngineError, EngineResult, ErrorKind};
    pub use crate::types::{
        check_horizon, CashFlowPoint, Comparable, ComparableMultiple, ComparablesSummary, CompsInputs,
        CustomInputs, DcfInputs, FcfConversion, MethodInputs, ProjectedYear, ProjectionYear,
        ScenarioAssumptions, ScenarioResult, ScenarioYear, ValuationMethod, ValuationOutputs,
        ValuationResult, DEFAULT_MAX_PROJECTION_YEARS,
    };
}

// Re-export commonly used types at crate root
pub use error::{EngineError, EngineResult, ErrorKind};
pub use types::{MethodInputs, ValuationMethod, ValuationResult};
