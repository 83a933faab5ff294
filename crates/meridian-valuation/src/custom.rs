//! Registered custom valuation models.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use meridian_core::prelude::*;

/// A named valuation model plugged into the orchestrator.
///
/// Implementations receive the `params` object of a `custom` input and
/// return the common result shape. They must be pure: the same params always
/// produce the same result.
///
/// # Example
///
/// ```rust
/// use meridian_core::prelude::*;
/// use meridian_valuation::custom::{CustomMethod, CustomMethodRegistry};
/// use std::sync::Arc;
///
/// struct FixedValue;
///
/// impl CustomMethod for FixedValue {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn run(&self, _params: &serde_json::Value) -> EngineResult<ValuationResult> {
///         let mut result = ValuationResult::empty(ValuationMethod::Custom);
///         result.enterprise_value = Some(rust_decimal::Decimal::ONE_HUNDRED);
///         Ok(result)
///     }
/// }
///
/// let mut registry = CustomMethodRegistry::new();
/// registry.register(Arc::new(FixedValue));
/// assert!(registry.get("fixed").is_some());
/// ```
pub trait CustomMethod: Send + Sync {
    /// Name the model is registered under; matched against `model`.
    fn name(&self) -> &str;

    /// Runs the model.
    fn run(&self, params: &serde_json::Value) -> EngineResult<ValuationResult>;
}

/// Custom models by name.
#[derive(Clone, Default)]
pub struct CustomMethodRegistry {
    methods: HashMap<String, Arc<dyn CustomMethod>>,
}

impl fmt::Debug for CustomMethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMethodRegistry")
            .field("methods", &self.names())
            .finish()
    }
}

impl CustomMethodRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `method` under its name, replacing any previous model of the
    /// same name.
    pub fn register(&mut self, method: Arc<dyn CustomMethod>) {
        self.methods.insert(method.name().to_string(), method);
    }

    /// Looks up a model.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn CustomMethod>> {
        self.methods.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the model named by `inputs.model`.
    ///
    /// The returned result is always tagged `custom`.
    pub fn run(&self, inputs: &CustomInputs) -> EngineResult<ValuationResult> {
        let method = self.get(&inputs.model).ok_or_else(|| {
            EngineError::validation(
                "model",
                format!("no custom model registered as '{}'", inputs.model),
            )
        })?;
        let mut result = method.run(&inputs.params)?;
        result.method = ValuationMethod::Custom;
        Ok(result)
    }
}
