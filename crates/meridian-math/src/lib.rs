//! # Meridian Math
//!
//! Numerical utilities for the Meridian valuation engine.
//!
//! This crate provides:
//!
//! - **Solvers**: Root-finding over `Decimal` (Newton-Raphson, Bisection, Hybrid)
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: All iteration is in decimal arithmetic, so the same
//!   inputs always take the same path to the same root
//! - **Bounded**: Every solver stops after a fixed iteration budget
//! - **Honest Failure**: A solve that misses its tolerance is an error, never
//!   an approximate answer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::solvers::{bisection, hybrid, newton_raphson, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
