//! Builtin function library
//!
//! Every builtin is an ordinary registry entry; callers can shadow or remove
//! any of them after [`create_default_registry`].

mod aggregation;
mod arithmetic;
mod comparison;
mod logical;
mod math;
mod null;
mod text;

pub use aggregation::register_aggregation_functions;
pub use arithmetic::register_arithmetic_functions;
pub use comparison::register_comparison_functions;
pub use logical::register_logical_functions;
pub use math::register_math_functions;
pub use null::register_null_functions;
pub use text::register_text_functions;

use crate::core::compute::{BoundArgs, CallArgs, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

/// Create a registry with every builtin category installed
pub fn create_default_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    register_arithmetic_functions(&mut registry);
    register_comparison_functions(&mut registry);
    register_logical_functions(&mut registry);
    register_text_functions(&mut registry);
    register_null_functions(&mut registry);
    register_math_functions(&mut registry);
    register_aggregation_functions(&mut registry);
    registry
}

//==============================================================================
// Builtin construction helpers
//==============================================================================

/// Wrap `f` so it receives its arguments bound to `params`
pub(crate) fn builtin<F>(
    name: &'static str,
    params: &'static [&'static str],
    required: usize,
    f: F,
) -> impl Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static
where
    F: Fn(&BoundArgs<'_>) -> Result<Datum, EvalError> + Send + Sync + 'static,
{
    move |args: &CallArgs| f(&args.bind(name, params, required)?)
}

/// One-argument builtin: `@name(a)`
pub(crate) fn unary<F>(name: &'static str, f: F) -> impl Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static
where
    F: Fn(&Datum) -> Result<Datum, EvalError> + Send + Sync + 'static,
{
    builtin(name, &["a"], 1, move |args| f(args.required(0)?))
}

/// Two-argument builtin: `@name(a, b)`
pub(crate) fn binary<F>(name: &'static str, f: F) -> impl Fn(&CallArgs) -> Result<Datum, EvalError> + Send + Sync + 'static
where
    F: Fn(&Datum, &Datum) -> Result<Datum, EvalError> + Send + Sync + 'static,
{
    builtin(name, &["a", "b"], 2, move |args| f(args.required(0)?, args.required(1)?))
}

/// Text view of a cell; null stays None, numbers render without a trailing `.0`
pub(crate) fn text_value(v: &Value) -> Option<String> {
    if v.is_null() {
        None
    } else {
        Some(v.as_text())
    }
}

/// Scalar text parameter at `index`
pub(crate) fn text_param(args: &BoundArgs<'_>, index: usize, param: &str) -> Result<Option<String>, EvalError> {
    match args.scalar(index)? {
        None => Ok(None),
        Some(Value::Text(s)) => Ok(Some(s.clone())),
        Some(v) => Err(EvalError::new(format!(
            "{}(): argument '{}' must be text, got {} '{}'",
            args.func(),
            param,
            v.type_name(),
            v.as_text()
        ))),
    }
}

/// Scalar number parameter at `index`
pub(crate) fn number_param(args: &BoundArgs<'_>, index: usize, param: &str) -> Result<Option<f64>, EvalError> {
    match args.scalar(index)? {
        None => Ok(None),
        Some(v) => v.as_number().map(Some).ok_or_else(|| {
            EvalError::new(format!(
                "{}(): argument '{}' must be a number, got {} '{}'",
                args.func(),
                param,
                v.type_name(),
                v.as_text()
            ))
        }),
    }
}

/// Scalar integer parameter at `index`
pub(crate) fn integer_param(args: &BoundArgs<'_>, index: usize, param: &str) -> Result<Option<i64>, EvalError> {
    match number_param(args, index, param)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n.is_finite() => Ok(Some(n as i64)),
        Some(n) => Err(EvalError::new(format!(
            "{}(): argument '{}' must be an integer, got {}",
            args.func(),
            param,
            n
        ))),
    }
}
