//! Error types for the Meridian engine.
//!
//! Every run either assembles a complete result or stops with exactly one of
//! three failure categories. None of them is retried internally: the engine is
//! pure, so re-running the same input reproduces the same failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A specialized Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// The error type for valuation and scenario runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed, missing, or out-of-range input. Raised before any computation.
    #[error("Validation error on `{field}`: {reason}")]
    Validation {
        /// The offending input field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An arithmetic condition that makes the result undefined.
    #[error("Computation error: {reason}")]
    Computation {
        /// Description of what went wrong.
        reason: String,
    },

    /// An iterative solve exhausted its iteration budget.
    #[error("Non-convergence after {iterations} iterations (residual: {residual})")]
    NonConvergence {
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual of the solved equation.
        residual: Decimal,
    },
}

/// Coarse failure category, used by callers that map errors to transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`EngineError::Validation`].
    Validation,
    /// See [`EngineError::Computation`].
    Computation,
    /// See [`EngineError::NonConvergence`].
    NonConvergence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Computation => "computation_error",
            ErrorKind::NonConvergence => "non_convergence_error",
        };
        write!(f, "{name}")
    }
}

impl EngineError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a computation error.
    #[must_use]
    pub fn computation(reason: impl Into<String>) -> Self {
        Self::Computation {
            reason: reason.into(),
        }
    }

    /// Creates a non-convergence error.
    #[must_use]
    pub fn non_convergence(iterations: u32, residual: Decimal) -> Self {
        Self::NonConvergence {
            iterations,
            residual,
        }
    }

    /// Creates a validation error for a required field that was not supplied.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::validation(field, "required field is missing")
    }

    /// Creates a computation error for a decimal overflow in `operation`.
    #[must_use]
    pub fn overflow(operation: impl fmt::Display) -> Self {
        Self::computation(format!("decimal overflow in {operation}"))
    }

    /// Returns the failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::Computation { .. } => ErrorKind::Computation,
            EngineError::NonConvergence { .. } => ErrorKind::NonConvergence,
        }
    }

    /// Returns the offending field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = EngineError::validation("projection_years", "must be at least 1");
        assert!(err.to_string().contains("`projection_years`"));
        assert_eq!(err.field(), Some("projection_years"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_non_convergence_error() {
        let err = EngineError::non_convergence(100, dec!(0.0001));
        assert!(err.to_string().contains("100 iterations"));
        assert_eq!(err.field(), None);
        assert_eq!(err.kind().to_string(), "non_convergence_error");
    }

    #[test]
    fn test_overflow_is_computation() {
        let err = EngineError::overflow("terminal value");
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert!(err.to_string().contains("terminal value"));
    }
}
