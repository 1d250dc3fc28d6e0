//! Null handling functions
//! isnull, notnull, coalesce, fillna, dropna

use super::{binary, builtin, unary};
use crate::core::compute::{map1, map2, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

pub fn register_null_functions(registry: &mut FunctionRegistry) {
    registry
        .register(
            "isnull",
            unary("isnull", |a| map1(a, |v| Ok(Value::Boolean(v.is_null())))),
            "Check null: @isnull(a)",
        )
        .register(
            "notnull",
            unary("notnull", |a| map1(a, |v| Ok(Value::Boolean(!v.is_null())))),
            "Check not null: @notnull(a)",
        )
        .register(
            "coalesce",
            binary("coalesce", |a, b| fill("coalesce", a, b)),
            "Return first non-null: @coalesce(a, b)",
        )
        .register(
            "fillna",
            builtin("fillna", &["a", "val"], 2, |args| {
                fill("fillna", args.required(0)?, args.required(1)?)
            }),
            "Fill null with value: @fillna(a, 0)",
        )
        .register("dropna", unary("dropna", dropna), "Drop null values: @dropna(a)");
}

fn fill(func: &str, a: &Datum, replacement: &Datum) -> Result<Datum, EvalError> {
    map2(func, a, replacement, |v, r| {
        Ok(if v.is_null() { r.clone() } else { v.clone() })
    })
}

/// Removes null cells, so the result is shorter than the input whenever a
/// null was present
fn dropna(a: &Datum) -> Result<Datum, EvalError> {
    Ok(match a {
        Datum::Scalar(v) if v.is_null() => Datum::Array(Vec::new()),
        Datum::Scalar(v) => Datum::Scalar(v.clone()),
        Datum::Array(values) => Datum::Array(values.iter().filter(|v| !v.is_null()).cloned().collect()),
    })
}
