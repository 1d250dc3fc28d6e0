//! Comparison functions
//! eq, ne, gt, gte, lt, lte
//!
//! Results are booleans. Any comparison involving null is false, except `ne`
//! which is true.

use std::cmp::Ordering;

use super::binary;
use crate::core::compute::{map2, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

pub fn register_comparison_functions(registry: &mut FunctionRegistry) {
    registry
        .register(
            "eq",
            binary("eq", |a, b| equality("eq", a, b, true)),
            "Equal: @eq(a, b)",
        )
        .register(
            "ne",
            binary("ne", |a, b| equality("ne", a, b, false)),
            "Not equal: @ne(a, b)",
        )
        .register(
            "gt",
            binary("gt", |a, b| ordering("gt", a, b, Ordering::is_gt)),
            "Greater than: @gt(a, b)",
        )
        .register(
            "gte",
            binary("gte", |a, b| ordering("gte", a, b, Ordering::is_ge)),
            "Greater than or equal: @gte(a, b)",
        )
        .register(
            "lt",
            binary("lt", |a, b| ordering("lt", a, b, Ordering::is_lt)),
            "Less than: @lt(a, b)",
        )
        .register(
            "lte",
            binary("lte", |a, b| ordering("lte", a, b, Ordering::is_le)),
            "Less than or equal: @lte(a, b)",
        );
}

/// Values of different kinds are unequal; booleans compare as 1/0
fn values_equal(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Text(s), Value::Text(t)) => s == t,
        (Value::Text(_), _) | (_, Value::Text(_)) => false,
        _ => x.as_number() == y.as_number(),
    }
}

fn equality(func: &str, a: &Datum, b: &Datum, when_equal: bool) -> Result<Datum, EvalError> {
    map2(func, a, b, |x, y| {
        if x.is_null() || y.is_null() {
            return Ok(Value::Boolean(!when_equal));
        }
        Ok(Value::Boolean(values_equal(x, y) == when_equal))
    })
}

fn ordering(func: &str, a: &Datum, b: &Datum, test: fn(Ordering) -> bool) -> Result<Datum, EvalError> {
    map2(func, a, b, |x, y| {
        if x.is_null() || y.is_null() {
            return Ok(Value::Boolean(false));
        }
        let order = match (x, y) {
            (Value::Text(s), Value::Text(t)) => s.cmp(t),
            _ => match (x.as_number(), y.as_number()) {
                (Some(p), Some(q)) => p.partial_cmp(&q).unwrap_or(Ordering::Equal),
                _ => {
                    return Err(EvalError::new(format!(
                        "{}() cannot compare {} '{}' with {} '{}'",
                        func,
                        x.type_name(),
                        x.as_text(),
                        y.type_name(),
                        y.as_text()
                    )))
                }
            },
        };
        Ok(Value::Boolean(test(order)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::CallArgs;

    fn call(name: &str, a: Datum, b: Datum) -> Result<Datum, EvalError> {
        let mut registry = FunctionRegistry::new();
        register_comparison_functions(&mut registry);
        let f = registry.get(name).unwrap();
        f(&CallArgs::new(vec![a, b], vec![], 3))
    }

    fn column(values: Vec<Value>) -> Datum {
        Datum::Array(values)
    }

    fn bools(values: &[bool]) -> Datum {
        Datum::Array(values.iter().map(|b| Value::Boolean(*b)).collect())
    }

    #[test]
    fn test_numeric_ordering_against_scalar() {
        let scores = column(vec![Value::Number(40.0), Value::Number(60.0), Value::Number(50.0)]);
        let fifty = Datum::Scalar(Value::Number(50.0));
        assert_eq!(call("gt", scores.clone(), fifty.clone()).unwrap(), bools(&[false, true, false]));
        assert_eq!(call("gte", scores.clone(), fifty.clone()).unwrap(), bools(&[false, true, true]));
        assert_eq!(call("lt", scores.clone(), fifty.clone()).unwrap(), bools(&[true, false, false]));
        assert_eq!(call("lte", scores, fifty).unwrap(), bools(&[true, false, true]));
    }

    #[test]
    fn test_null_compares_false_except_ne() {
        let with_null = column(vec![Value::Null, Value::Number(1.0), Value::Number(f64::NAN)]);
        let one = Datum::Scalar(Value::Number(1.0));
        assert_eq!(call("eq", with_null.clone(), one.clone()).unwrap(), bools(&[false, true, false]));
        assert_eq!(call("ne", with_null.clone(), one.clone()).unwrap(), bools(&[true, false, true]));
        assert_eq!(call("gt", with_null, one).unwrap(), bools(&[false, false, false]));
    }

    #[test]
    fn test_text_equality_and_ordering() {
        let names = column(vec![Value::from("apple"), Value::from("pear"), Value::from("fig")]);
        let pear = Datum::Scalar(Value::from("pear"));
        assert_eq!(call("eq", names.clone(), pear.clone()).unwrap(), bools(&[false, true, false]));
        assert_eq!(call("lt", names, pear).unwrap(), bools(&[true, false, true]));
    }

    #[test]
    fn test_text_never_equals_number() {
        let result = call("eq", Datum::Scalar(Value::from("1")), Datum::Scalar(Value::Number(1.0))).unwrap();
        assert_eq!(result, Datum::Scalar(Value::Boolean(false)));
    }

    #[test]
    fn test_ordering_text_against_number_is_error() {
        let err = call("gt", Datum::Scalar(Value::from("a")), Datum::Scalar(Value::Number(1.0))).unwrap_err();
        assert!(err.message.contains("gt() cannot compare"));
    }
}
