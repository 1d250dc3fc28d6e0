//! Formula evaluator
//!
//! Walks a parsed call tree against one dataset. Column names resolve to the
//! dataset's current columns, `@name(...)` resolves through the registry, and
//! arguments are evaluated depth-first before the call is made.

use super::parser::{Expr, Parser};
use super::tokenizer::tokenize;
use super::{CallArgs, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::{Dataset, Value};

/// Evaluation context: the working dataset plus the call namespace
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub dataset: &'a Dataset,
    pub registry: &'a FunctionRegistry,
}

impl<'a> EvalContext<'a> {
    pub fn new(dataset: &'a Dataset, registry: &'a FunctionRegistry) -> Self {
        Self { dataset, registry }
    }

    pub fn row_count(&self) -> usize {
        self.dataset.row_count()
    }
}

/// Tokenize and parse formula text into a call tree
pub fn parse_formula(formula: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(formula)?;
    Ok(Parser::new(tokens).parse()?)
}

/// Evaluate formula text and materialize it as a full-length column
pub fn evaluate_formula(formula: &str, ctx: &EvalContext<'_>) -> Result<Vec<Value>, EvalError> {
    let expr = parse_formula(formula)?;
    evaluate(&expr, ctx)?.materialize(ctx.row_count())
}

/// Evaluate an expression in the given context
pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Datum, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Datum::Scalar(Value::Number(*n))),

        Expr::Text(s) => Ok(Datum::Scalar(Value::Text(s.clone()))),

        Expr::Column(name) => ctx
            .dataset
            .column(name)
            .map(|values| Datum::Array(values.to_vec()))
            .ok_or_else(|| unknown_column(name, ctx.dataset)),

        Expr::Call { name, args } => {
            let function = ctx
                .registry
                .get(name)
                .map_err(|_| EvalError::new(format!("Unknown function: @{}", name)))?;

            let mut positional = Vec::new();
            let mut keywords = Vec::new();
            for arg in args {
                let value = evaluate(&arg.value, ctx)?;
                match &arg.keyword {
                    Some(keyword) => keywords.push((keyword.clone(), value)),
                    None => positional.push(value),
                }
            }

            function(&CallArgs::new(positional, keywords, ctx.row_count()))
        }
    }
}

fn unknown_column(name: &str, dataset: &Dataset) -> EvalError {
    let lower = name.to_lowercase();
    let similar = dataset
        .column_names()
        .into_iter()
        .find(|c| c.to_lowercase() == lower || c.to_lowercase().starts_with(&lower));

    match similar {
        Some(candidate) => EvalError::new(format!(
            "Unknown column: {} (did you mean '{}'?)",
            name, candidate
        )),
        None => EvalError::new(format!("Unknown column: {}", name)),
    }
}
