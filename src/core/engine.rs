//! Formula engine
//!
//! Owns one function registry, one ordered formula store and a constants
//! table. Formulas are applied strictly in insertion order and every written
//! column is visible to the formulas after it, which is what makes chaining
//! (`step2` reading `step1`) work.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::compute::{evaluate_formula, CallArgs, Datum, EvalContext, EvalError};
use super::references;
use super::registry::{FunctionDef, FunctionRegistry};
use super::store::FormulaStore;
use crate::config::{ColumnEntry, EngineConfig};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::create_default_registry;
use crate::types::{Dataset, Value};

/// Whether `apply` works on a copy or on the caller's dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Copy,
    InPlace,
}

/// Applies named formulas to datasets.
///
/// ```
/// use royalbit_colformula::{Dataset, FormulaEngine, FormulaStore, Value};
///
/// let engine = FormulaEngine::new();
/// let data = Dataset::new()
///     .with_column("price", [100.0, 200.0])
///     .with_column("qty", [2.0, 3.0]);
/// let formulas: FormulaStore = [("total", "@mul(price, qty)")].into_iter().collect();
///
/// let result = engine.apply(&data, Some(&formulas))?;
/// assert_eq!(result.column("total").unwrap(), &[Value::Number(200.0), Value::Number(600.0)]);
/// # Ok::<(), royalbit_colformula::FormulaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FormulaEngine {
    registry: FunctionRegistry,
    formulas: FormulaStore,
    constants: Vec<(String, Value)>,
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaEngine {
    /// Engine preloaded with the builtin function library
    pub fn new() -> Self {
        Self::with_registry(create_default_registry())
    }

    /// Engine with an empty registry
    pub fn empty() -> Self {
        Self::with_registry(FunctionRegistry::new())
    }

    pub fn with_defaults(include_defaults: bool) -> Self {
        if include_defaults {
            Self::new()
        } else {
            Self::empty()
        }
    }

    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            formulas: FormulaStore::new(),
            constants: Vec::new(),
        }
    }

    //==========================================================================
    // Registration
    //==========================================================================

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Register a custom function, callable as `@name(...)`
    pub fn register<F>(&mut self, name: impl Into<String>, function: F, doc: impl Into<String>) -> &mut Self
    where
        F: Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static,
    {
        self.registry.register(name, function, doc);
        self
    }

    pub fn register_batch<I, N>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, FunctionDef)>,
        N: Into<String>,
    {
        self.registry.register_batch(entries);
        self
    }

    pub fn unregister(&mut self, name: &str) -> &mut Self {
        self.registry.unregister(name);
        self
    }

    /// Add a named constant, callable as `@name()`
    pub fn add_constant(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();

        match self.constants.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value.clone(),
            None => self.constants.push((name.clone(), value.clone())),
        }

        let label = name.clone();
        let doc = format!("Constant {}: @{}()", value.as_text(), name);
        self.registry.register(
            name,
            move |args: &CallArgs| {
                if !args.is_empty() {
                    return Err(EvalError::new(format!(
                        "{}() takes 0 argument(s) but {} were given",
                        label,
                        args.len()
                    )));
                }
                Ok(Datum::Scalar(value.clone()))
            },
            doc,
        );
        self
    }

    /// Add or replace the stored formula for `column`
    pub fn add_formula(&mut self, column: impl Into<String>, formula: impl Into<String>) -> &mut Self {
        self.formulas.add(column, formula);
        self
    }

    pub fn formulas(&self) -> &FormulaStore {
        &self.formulas
    }

    pub fn constants(&self) -> &[(String, Value)] {
        &self.constants
    }

    //==========================================================================
    // Application
    //==========================================================================

    /// Apply formulas to a copy of `dataset`.
    ///
    /// `None` applies the stored formulas. Stops at the first failing formula.
    pub fn apply(&self, dataset: &Dataset, formulas: Option<&FormulaStore>) -> FormulaResult<Dataset> {
        let mut result = dataset.clone();
        self.run(&mut result, self.resolve(formulas))?;
        Ok(result)
    }

    /// Apply formulas directly to `dataset`.
    ///
    /// On failure, columns written before the failing formula stay written.
    pub fn apply_in_place(&self, dataset: &mut Dataset, formulas: Option<&FormulaStore>) -> FormulaResult<()> {
        self.run(dataset, self.resolve(formulas))
    }

    /// Apply with the write mode given as a value; returns the resulting dataset
    /// in both modes
    pub fn apply_with_mode(
        &self,
        dataset: &mut Dataset,
        formulas: Option<&FormulaStore>,
        mode: WriteMode,
    ) -> FormulaResult<Dataset> {
        match mode {
            WriteMode::Copy => self.apply(dataset, formulas),
            WriteMode::InPlace => {
                self.apply_in_place(dataset, formulas)?;
                Ok(dataset.clone())
            }
        }
    }

    /// Check formulas against a one-row sample of `dataset`.
    ///
    /// Every formula is attempted; the result holds one `"<column>: <message>"`
    /// entry per failure and is empty when all succeed.
    pub fn validate(&self, dataset: &Dataset, formulas: Option<&FormulaStore>) -> Vec<String> {
        let mut sample = dataset.head(1);
        let mut errors = Vec::new();

        for spec in self.resolve(formulas) {
            match self.evaluate(&sample, &spec.formula) {
                Ok(values) => sample.set_column(spec.column.clone(), values),
                Err(e) => {
                    warn!(column = %spec.column, formula = %spec.formula, error = %e, "formula failed validation");
                    errors.push(format!("{}: {}", spec.column, e));
                }
            }
        }

        errors
    }

    fn resolve<'a>(&'a self, formulas: Option<&'a FormulaStore>) -> &'a FormulaStore {
        formulas.unwrap_or(&self.formulas)
    }

    fn run(&self, dataset: &mut Dataset, formulas: &FormulaStore) -> FormulaResult<()> {
        if formulas.is_empty() {
            return Ok(());
        }
        dataset.validate_lengths()?;

        for spec in formulas {
            debug!(column = %spec.column, formula = %spec.formula, "applying formula");
            let values = self
                .evaluate(dataset, &spec.formula)
                .map_err(|source| FormulaError::Evaluation {
                    column: spec.column.clone(),
                    formula: spec.formula.clone(),
                    source,
                })?;
            dataset.set_column(spec.column.clone(), values);
        }

        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, formula: &str) -> Result<Vec<Value>, EvalError> {
        evaluate_formula(formula, &EvalContext::new(dataset, &self.registry))
    }

    //==========================================================================
    // Queries
    //==========================================================================

    /// Registered function names in registration order
    pub fn list_functions(&self) -> Vec<String> {
        self.registry.list_names()
    }

    pub fn function_doc(&self, name: &str) -> &str {
        self.registry.get_doc(name)
    }

    /// Columns a formula reads (see [`references::extract_references`])
    pub fn extract_references(&self, formula: &str) -> BTreeSet<String> {
        references::extract_references(formula)
    }

    /// Columns read by any formula in `formulas`
    pub fn extract_references_batch(&self, formulas: &FormulaStore) -> BTreeSet<String> {
        references::extract_references_batch(formulas.formulas())
    }

    //==========================================================================
    // Configuration
    //==========================================================================

    /// Engine with builtins plus the constants and enabled formulas of `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new();
        engine.load_config(config);
        engine
    }

    /// Add the constants and enabled formulas of `config` to this engine
    pub fn load_config(&mut self, config: &EngineConfig) -> &mut Self {
        for (name, value) in &config.constants {
            self.add_constant(name.clone(), value.clone());
        }
        for (column, formula) in config.enabled_formulas() {
            self.add_formula(column, formula);
        }
        self
    }

    pub fn from_yaml_str(content: &str) -> FormulaResult<Self> {
        Ok(Self::from_config(&EngineConfig::from_yaml_str(content)?))
    }

    pub fn from_json_str(content: &str) -> FormulaResult<Self> {
        Ok(Self::from_config(&EngineConfig::from_json_str(content)?))
    }

    /// Export constants and stored formulas
    pub fn to_config(&self) -> EngineConfig {
        EngineConfig {
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            constants: self.constants.clone(),
            columns: self
                .formulas
                .iter()
                .map(|spec| (spec.column.clone(), ColumnEntry::Formula(spec.formula.clone())))
                .collect(),
        }
    }

    pub fn to_yaml_string(&self) -> FormulaResult<String> {
        self.to_config().to_yaml_string()
    }
}
