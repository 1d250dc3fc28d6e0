use thiserror::Error;

use crate::core::compute::EvalError;

pub type FormulaResult<T> = Result<T, FormulaError>;

#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Function '{0}' not registered")]
    NotFound(String),

    #[error("Failed to evaluate formula for '{column}': {formula}\nError: {source}")]
    Evaluation {
        column: String,
        formula: String,
        #[source]
        source: EvalError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl FormulaError {
    /// Column name carried by an evaluation failure
    pub fn column(&self) -> Option<&str> {
        match self {
            FormulaError::Evaluation { column, .. } => Some(column),
            _ => None,
        }
    }
}
