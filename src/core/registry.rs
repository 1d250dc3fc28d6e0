//! Function registry: the single call namespace formulas resolve `@name` against

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::compute::{CallArgs, Datum, EvalError};
use crate::error::{FormulaError, FormulaResult};

/// Function implementation signature
pub type Function = Arc<dyn Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync>;

/// A registered callable with its documentation
#[derive(Clone)]
pub struct FunctionEntry {
    pub name: String,
    pub function: Function,
    pub doc: String,
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// A callable waiting to be registered, with or without a doc string
#[derive(Clone)]
pub struct FunctionDef {
    function: Function,
    doc: String,
}

impl FunctionDef {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            doc: String::new(),
        }
    }

    pub fn documented<F>(function: F, doc: impl Into<String>) -> Self
    where
        F: Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            doc: doc.into(),
        }
    }
}

/// Name → callable mapping with a parallel doc table.
///
/// Re-registering a name replaces the old callable silently and keeps its
/// place in [`FunctionRegistry::list_names`].
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
    docs: HashMap<String, String>,
    order: Vec<String>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.order)
            .finish()
    }
}

impl FunctionRegistry {
    /// Create an empty registry (see [`crate::functions::create_default_registry`]
    /// for one preloaded with builtins)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, overwriting any previous entry of the same name
    pub fn register<F>(&mut self, name: impl Into<String>, function: F, doc: impl Into<String>) -> &mut Self
    where
        F: Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(function), doc.into());
        self
    }

    /// Register an already shared callable
    pub fn register_function(&mut self, name: impl Into<String>, function: Function, doc: impl Into<String>) -> &mut Self {
        self.insert(name.into(), function, doc.into());
        self
    }

    /// Register many entries in iteration order
    pub fn register_batch<I, N>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, FunctionDef)>,
        N: Into<String>,
    {
        for (name, def) in entries {
            self.insert(name.into(), def.function, def.doc);
        }
        self
    }

    fn insert(&mut self, name: String, function: Function, doc: String) {
        trace!(function = %name, "registering function");
        if self.functions.insert(name.clone(), function).is_none() {
            self.order.push(name.clone());
        }
        if doc.is_empty() {
            self.docs.remove(&name);
        } else {
            self.docs.insert(name, doc);
        }
    }

    /// Remove a function; unknown names are ignored
    pub fn unregister(&mut self, name: &str) -> &mut Self {
        if self.functions.remove(name).is_some() {
            trace!(function = %name, "unregistering function");
            self.order.retain(|n| n != name);
        }
        self.docs.remove(name);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> FormulaResult<&Function> {
        self.functions
            .get(name)
            .ok_or_else(|| FormulaError::NotFound(name.to_string()))
    }

    /// All registered names in registration order
    pub fn list_names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Documentation for a function, empty when none was given
    pub fn get_doc(&self, name: &str) -> &str {
        self.docs.get(name).map_or("", String::as_str)
    }

    /// Full entry (name, callable, doc) for a registered function
    pub fn entry(&self, name: &str) -> Option<FunctionEntry> {
        self.functions.get(name).map(|function| FunctionEntry {
            name: name.to_string(),
            function: Arc::clone(function),
            doc: self.get_doc(name).to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
