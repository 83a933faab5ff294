//! Checked decimal arithmetic.
//!
//! `Decimal` operators panic on overflow; every engine stage goes through
//! these helpers instead so an overflow surfaces as a computation error.

use meridian_core::{EngineError, EngineResult};
use meridian_math::MathError;
use rust_decimal::{Decimal, MathematicalOps};

pub(crate) fn add(a: Decimal, b: Decimal, operation: &str) -> EngineResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::overflow(operation))
}

pub(crate) fn sub(a: Decimal, b: Decimal, operation: &str) -> EngineResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| EngineError::overflow(operation))
}

pub(crate) fn mul(a: Decimal, b: Decimal, operation: &str) -> EngineResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| EngineError::overflow(operation))
}

/// Divides `a` by `b`, failing on a zero denominator.
pub(crate) fn div(a: Decimal, b: Decimal, operation: &str) -> EngineResult<Decimal> {
    if b.is_zero() {
        return Err(EngineError::computation(format!(
            "division by zero in {operation}"
        )));
    }
    a.checked_div(b)
        .ok_or_else(|| EngineError::overflow(operation))
}

/// `(1 + rate)^periods`
pub(crate) fn compound(rate: Decimal, periods: u32, operation: &str) -> EngineResult<Decimal> {
    let base = add(Decimal::ONE, rate, operation)?;
    base.checked_powu(u64::from(periods))
        .ok_or_else(|| EngineError::overflow(operation))
}

/// Maps a solver failure into the engine taxonomy.
pub(crate) fn from_math(err: MathError) -> EngineError {
    match err {
        MathError::ConvergenceFailed {
            iterations,
            residual,
        } => EngineError::non_convergence(iterations, residual),
        other => EngineError::computation(other.to_string()),
    }
}
