//! Valuation run orchestration.
//!
//! A DCF run moves through `Validated -> Projected -> Discounted -> Assembled`.
//! Each stage is its own type, so a stage can only be reached from the one
//! before it, and any failure ends the run with a typed error.

use std::fmt;
use std::sync::Arc;

use meridian_core::prelude::*;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::comps::CompsEngine;
use crate::config::EngineConfig;
use crate::custom::{CustomMethod, CustomMethodRegistry};
use crate::discounting::{DiscountedCashFlows, DiscountingEngine};
use crate::projection::ProjectionEngine;
use crate::returns::ReturnSolver;
use crate::scenario::ScenarioEngine;
use crate::sensitivity::{SensitivityAnalysis, SensitivityGrid};
use crate::validation::InputValidator;

/// Stages of a DCF run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    /// Inputs parsed and checked.
    Validated,
    /// Revenue, EBITDA and FCF projected.
    Projected,
    /// Cash flows and terminal value discounted.
    Discounted,
    /// Result shaped.
    Assembled,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Validated => "validated",
            RunStage::Projected => "projected",
            RunStage::Discounted => "discounted",
            RunStage::Assembled => "assembled",
        };
        write!(f, "{name}")
    }
}

/// A run whose inputs passed validation.
#[derive(Debug, Clone)]
pub struct Validated {
    inputs: DcfInputs,
}

impl Validated {
    /// Validates `inputs` and enters the run.
    pub fn new(inputs: DcfInputs) -> EngineResult<Self> {
        inputs.validate()?;
        Ok(Self { inputs })
    }

    /// Returns the validated inputs.
    pub fn inputs(&self) -> &DcfInputs {
        &self.inputs
    }

    /// Projects the validated inputs.
    pub fn project(self, engine: &ProjectionEngine) -> EngineResult<Projected> {
        let years = engine.project(&self.inputs)?;
        debug!(stage = %RunStage::Projected, years = years.len(), "stage complete");
        Ok(Projected {
            inputs: self.inputs,
            years,
        })
    }
}

/// A run with its projection computed.
#[derive(Debug, Clone)]
pub struct Projected {
    inputs: DcfInputs,
    years: Vec<ProjectedYear>,
}

impl Projected {
    /// Returns the undiscounted projection.
    pub fn years(&self) -> &[ProjectedYear] {
        &self.years
    }

    /// Discounts the projection.
    pub fn discount(self, engine: &DiscountingEngine) -> EngineResult<Discounted> {
        let flows = engine.discount(&self.years, &self.inputs)?;
        debug!(
            stage = %RunStage::Discounted,
            enterprise_value = %flows.enterprise_value,
            "stage complete"
        );
        Ok(Discounted { flows })
    }
}

/// A run with every value computed.
#[derive(Debug, Clone)]
pub struct Discounted {
    flows: DiscountedCashFlows,
}

impl Discounted {
    /// Returns the discounted values.
    pub fn flows(&self) -> &DiscountedCashFlows {
        &self.flows
    }

    /// Shapes the final result.
    pub fn assemble(self) -> ValuationResult {
        let flows = self.flows;
        let mut result = ValuationResult::empty(ValuationMethod::Dcf);
        result.enterprise_value = Some(flows.enterprise_value);
        result.equity_value = Some(flows.equity_value);
        result.implied_multiple = Some(flows.implied_multiple);
        result.outputs.projections = flows.projections;
        result.outputs.terminal_value = Some(flows.terminal_value);
        result.outputs.pv_terminal_value = Some(flows.pv_terminal_value);
        debug!(stage = %RunStage::Assembled, "stage complete");
        result
    }
}

/// Dispatches runs by method tag.
///
/// Holds no state across runs: every call is a pure function of its inputs
/// and the engine configuration, so one orchestrator can be shared between
/// threads.
///
/// # Example
///
/// ```rust
/// use meridian_valuation::ValuationOrchestrator;
/// use rust_decimal_macros::dec;
/// use serde_json::json;
///
/// let orchestrator = ValuationOrchestrator::default();
/// let result = orchestrator
///     .run("dcf", &json!({
///         "base_revenue": 100,
///         "base_ebitda": 25,
///         "discount_rate": 0.10,
///         "terminal_growth_rate": 0.025,
///         "projection_years": 2,
///         "revenue_growth_rates": [0.10, 0.08],
///         "ebitda_margins": [0.25, 0.26],
///         "net_debt": 0
///     }))
///     .unwrap();
///
/// assert_eq!(result.outputs.terminal_value, Some(dec!(422.136)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValuationOrchestrator {
    config: EngineConfig,
    validator: InputValidator,
    projection: ProjectionEngine,
    discounting: DiscountingEngine,
    comps: CompsEngine,
    returns: ReturnSolver,
    custom: CustomMethodRegistry,
}

impl ValuationOrchestrator {
    /// Creates an orchestrator from an engine configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            validator: InputValidator::new(config.max_projection_years),
            projection: ProjectionEngine::new(config.fcf_conversion),
            discounting: DiscountingEngine::new(),
            comps: CompsEngine::new(),
            returns: ReturnSolver::from_settings(&config.solver),
            custom: CustomMethodRegistry::new(),
        }
    }

    /// Registers a custom model.
    #[must_use]
    pub fn with_custom_method(mut self, method: Arc<dyn CustomMethod>) -> Self {
        self.custom.register(method);
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the input validator.
    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    /// Returns the return solver built from the configuration.
    pub fn returns(&self) -> &ReturnSolver {
        &self.returns
    }

    /// Returns the custom model registry.
    pub fn custom_methods(&self) -> &CustomMethodRegistry {
        &self.custom
    }

    /// Returns a scenario engine sharing this orchestrator's return solver.
    pub fn scenario_engine(&self) -> ScenarioEngine {
        ScenarioEngine::with_return_solver(self.returns)
            .with_max_projection_years(self.config.max_projection_years)
    }

    /// Validates raw inputs for `method` and runs the valuation.
    #[instrument(level = "debug", skip(self, raw))]
    pub fn run(&self, method: &str, raw: &Value) -> EngineResult<ValuationResult> {
        let inputs = self.validator.validate(method, raw).map_err(|e| {
            warn!(stage = %RunStage::Validated, error = %e, "valuation rejected");
            e
        })?;
        self.run_validated(&inputs)
    }

    /// Runs already-typed inputs.
    pub fn run_validated(&self, inputs: &MethodInputs) -> EngineResult<ValuationResult> {
        let result = match inputs {
            MethodInputs::Dcf(dcf) => self.run_dcf(dcf.clone()),
            MethodInputs::Comps(comps) => {
                comps.validate()?;
                self.comps.value(comps)
            }
            MethodInputs::Custom(custom) => {
                inputs.validate()?;
                self.custom.run(custom)
            }
        };
        if let Err(e) = &result {
            warn!(method = %inputs.method(), error = %e, "valuation failed");
        }
        result
    }

    /// Runs a DCF through every stage.
    pub fn run_dcf(&self, inputs: DcfInputs) -> EngineResult<ValuationResult> {
        check_horizon(inputs.projection_years, self.config.max_projection_years)?;
        let validated = Validated::new(inputs)?;
        debug!(stage = %RunStage::Validated, "stage complete");
        let result = validated
            .project(&self.projection)?
            .discount(&self.discounting)?
            .assemble();
        Ok(result)
    }

    /// Validates raw DCF inputs and re-values them across `analysis`.
    #[instrument(level = "debug", skip_all)]
    pub fn run_sensitivity(
        &self,
        raw: &Value,
        analysis: &SensitivityAnalysis,
    ) -> EngineResult<SensitivityGrid> {
        let inputs = self.validator.validate_dcf(raw)?;
        analysis.run(&inputs, &self.projection, &self.discounting)
    }

    /// Validates raw assumptions and runs a scenario.
    #[instrument(level = "debug", skip_all)]
    pub fn run_scenario(&self, raw: &Value) -> EngineResult<ScenarioResult> {
        let assumptions = self.validator.validate_scenario(raw)?;
        self.scenario_engine().run(&assumptions)
    }
}
