//! Engine configuration.
//!
//! Settings that apply to every run unless an input overrides them: the
//! EBITDA to free cash flow conversion and the return solver's budget.

use meridian_core::prelude::*;
use meridian_math::solvers::{SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("Failed to parse engine configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document parsed but holds nonsensical settings.
    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Return solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Convergence tolerance on the normalized NPV residual.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,

    /// Iteration budget for each solver phase.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Lower end of the bisection fallback bracket.
    #[serde(default = "default_bracket_low")]
    pub bracket_low: Decimal,

    /// Upper end of the bisection fallback bracket.
    #[serde(default = "default_bracket_high")]
    pub bracket_high: Decimal,

    /// Seed used when no closed-form estimate is available.
    #[serde(default = "default_initial_guess")]
    pub initial_guess: Decimal,
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_bracket_low() -> Decimal {
    dec!(-0.99)
}

fn default_bracket_high() -> Decimal {
    dec!(10)
}

fn default_initial_guess() -> Decimal {
    dec!(0.10)
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            bracket_low: default_bracket_low(),
            bracket_high: default_bracket_high(),
            initial_guess: default_initial_guess(),
        }
    }
}

impl SolverSettings {
    /// Returns the root-finder configuration.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }

    /// Returns the bisection bracket.
    pub fn bracket(&self) -> (Decimal, Decimal) {
        (self.bracket_low, self.bracket_high)
    }

    /// Validates the solver settings.
    pub fn validate(&self) -> EngineResult<()> {
        if self.tolerance <= Decimal::ZERO {
            return Err(EngineError::validation(
                "solver.tolerance",
                "must be greater than zero",
            ));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::validation(
                "solver.max_iterations",
                "must be at least 1",
            ));
        }
        if self.bracket_low <= Decimal::NEGATIVE_ONE {
            return Err(EngineError::validation(
                "solver.bracket_low",
                "must be greater than -1",
            ));
        }
        if self.bracket_high <= self.bracket_low {
            return Err(EngineError::validation(
                "solver.bracket_high",
                "must be greater than solver.bracket_low",
            ));
        }
        if self.initial_guess <= self.bracket_low || self.initial_guess >= self.bracket_high {
            return Err(EngineError::validation(
                "solver.initial_guess",
                "must lie inside the bracket",
            ));
        }
        Ok(())
    }
}

/// Configuration shared by every run of an engine.
///
/// # Example
///
/// ```rust
/// use meridian_valuation::config::EngineConfig;
/// use meridian_core::types::FcfConversion;
/// use rust_decimal_macros::dec;
///
/// let config = EngineConfig::from_toml_str(r#"
///     [fcf_conversion]
///     type = "factor"
///     factor = 0.6
///
///     [solver]
///     max_iterations = 50
/// "#).unwrap();
///
/// assert_eq!(config.fcf_conversion, FcfConversion::Factor { factor: dec!(0.6) });
/// assert_eq!(config.solver.max_iterations, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default EBITDA to FCF conversion; a `dcf` input may override it.
    #[serde(default)]
    pub fcf_conversion: FcfConversion,

    /// Return solver settings.
    #[serde(default)]
    pub solver: SolverSettings,

    /// Longest accepted projection horizon for DCF and scenario runs.
    #[serde(default = "default_max_projection_years")]
    pub max_projection_years: u32,
}

fn default_max_projection_years() -> u32 {
    DEFAULT_MAX_PROJECTION_YEARS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fcf_conversion: FcfConversion::default(),
            solver: SolverSettings::default(),
            max_projection_years: default_max_projection_years(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the default FCF conversion.
    #[must_use]
    pub fn with_fcf_conversion(mut self, conversion: FcfConversion) -> Self {
        self.fcf_conversion = conversion;
        self
    }

    /// Sets the solver settings.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the longest accepted projection horizon.
    #[must_use]
    pub fn with_max_projection_years(mut self, years: u32) -> Self {
        self.max_projection_years = years;
        self
    }

    /// Validates every setting.
    pub fn validate(&self) -> EngineResult<()> {
        self.fcf_conversion.validate()?;
        self.solver.validate()?;
        if self.max_projection_years == 0 {
            return Err(EngineError::validation(
                "max_projection_years",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.fcf_conversion, FcfConversion::EbitdaProxy);
        assert_eq!(config.solver.max_iterations, 100);
        assert_eq!(config.solver.bracket(), (dec!(-0.99), dec!(10)));
        assert_eq!(config.max_projection_years, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_projection_years_from_toml() {
        let config = EngineConfig::from_toml_str("max_projection_years = 10").unwrap();
        assert_eq!(config.max_projection_years, 10);

        let err = EngineConfig::from_toml_str("max_projection_years = 0").unwrap_err();
        match err {
            ConfigError::Invalid(e) => assert_eq!(e.field(), Some("max_projection_years")),
            ConfigError::Parse(e) => panic!("unexpected parse error: {e}"),
        }
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_explicit_conversion_from_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [fcf_conversion]
            type = "explicit"
            tax_rate = 0.25
            capex_pct_revenue = 0.05
            nwc_pct_revenue = 0.10
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.fcf_conversion,
            FcfConversion::Explicit { .. }
        ));
    }

    #[test]
    fn test_invalid_bracket_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [solver]
            bracket_low = 0.5
            bracket_high = 0.2
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Invalid(e) => assert_eq!(e.field(), Some("solver.bracket_high")),
            ConfigError::Parse(e) => panic!("unexpected parse error: {e}"),
        }
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            EngineConfig::from_toml_str("solver = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
