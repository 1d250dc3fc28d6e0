//! colformula - named computed columns defined with `@function` formulas
//!
//! This library evaluates small formula expressions over columnar data and
//! writes each result to a named column, in registration order.
//!
//! # Features
//!
//! - `@function(arg, name=value)` formulas over columns and literals
//! - 61 built-in functions (arithmetic, comparison, logic, text, nulls, math, aggregation)
//! - Custom functions and named constants
//! - Column reference extraction for dependency analysis
//! - YAML/JSON configuration import and export
//!
//! # Example
//!
//! ```
//! use royalbit_colformula::{Dataset, FormulaEngine, FormulaStore, Value};
//!
//! let data = Dataset::new()
//!     .with_column("price", [100.0, 200.0])
//!     .with_column("qty", [2.0, 3.0]);
//!
//! let formulas: FormulaStore = [
//!     ("total", "@mul(price, qty)"),
//!     ("discounted", "@mul(total, 0.9)"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let engine = FormulaEngine::new();
//! let result = engine.apply(&data, Some(&formulas))?;
//!
//! assert_eq!(result.column("total").unwrap(), &[Value::from(200.0), Value::from(600.0)]);
//! # Ok::<(), royalbit_colformula::FormulaError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod functions;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::{ColumnEntry, EngineConfig};
pub use core::compute::{CallArgs, Datum, EvalError};
pub use core::{
    extract_references, extract_references_batch, FormulaEngine, FormulaSpec, FormulaStore,
    FunctionDef, FunctionRegistry, WriteMode,
};
pub use error::{FormulaError, FormulaResult};
pub use functions::create_default_registry;
pub use types::{Column, Dataset, Value};
