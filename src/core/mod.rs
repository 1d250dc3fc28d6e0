//! Formula resolution: registry, reference extraction, storage and the engine
//! that applies formulas in order

pub mod compute;
pub mod engine;
pub mod references;
pub mod registry;
pub mod store;

pub use engine::{FormulaEngine, WriteMode};
pub use references::{extract_references, extract_references_batch};
pub use registry::{Function, FunctionDef, FunctionEntry, FunctionRegistry};
pub use store::{FormulaSpec, FormulaStore};
