//! Error types for numerical operations.

use rust_decimal::Decimal;
use thiserror::Error;

/// A specialized Result type for numerical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during numerical operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Root-finding algorithm failed to converge.
    #[error("Convergence failed after {iterations} iterations (residual: {residual})")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual value.
        residual: Decimal,
    },

    /// Invalid bracket for root-finding.
    #[error("Invalid bracket: f({a}) = {fa} and f({b}) = {fb} have same sign")]
    InvalidBracket {
        /// Lower bound of bracket.
        a: Decimal,
        /// Upper bound of bracket.
        b: Decimal,
        /// Function value at a.
        fa: Decimal,
        /// Function value at b.
        fb: Decimal,
    },

    /// Division by zero or near-zero value.
    #[error("Division by zero or near-zero value: {value}")]
    DivisionByZero {
        /// The near-zero value.
        value: Decimal,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Decimal overflow while evaluating the objective.
    #[error("Numerical overflow in {operation}")]
    Overflow {
        /// The operation that caused overflow.
        operation: String,
    },
}

impl MathError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: Decimal) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an overflow error.
    #[must_use]
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }
}
