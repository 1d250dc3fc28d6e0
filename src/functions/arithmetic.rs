//! Arithmetic functions
//! add, sub, mul, div, floordiv, mod, pow, neg, abs
//!
//! Float semantics throughout: division by zero yields ±inf or NaN, never an error.

use super::{binary, unary};
use crate::core::compute::{map2, number_arg, numeric1, numeric2, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

pub fn register_arithmetic_functions(registry: &mut FunctionRegistry) {
    registry
        .register("add", binary("add", add), "Add two values: @add(a, b)")
        .register(
            "sub",
            binary("sub", |a, b| numeric2("sub", a, b, |x, y| x - y)),
            "Subtract: @sub(a, b)",
        )
        .register(
            "mul",
            binary("mul", |a, b| numeric2("mul", a, b, |x, y| x * y)),
            "Multiply: @mul(a, b)",
        )
        .register(
            "div",
            binary("div", |a, b| numeric2("div", a, b, |x, y| x / y)),
            "Divide: @div(a, b)",
        )
        .register(
            "floordiv",
            binary("floordiv", |a, b| numeric2("floordiv", a, b, |x, y| (x / y).floor())),
            "Floor divide: @floordiv(a, b)",
        )
        .register(
            "mod",
            binary("mod", |a, b| numeric2("mod", a, b, floored_mod)),
            "Modulo: @mod(a, b)",
        )
        .register(
            "pow",
            binary("pow", |a, b| numeric2("pow", a, b, f64::powf)),
            "Power: @pow(a, b)",
        )
        .register(
            "neg",
            unary("neg", |a| numeric1("neg", a, |x| -x)),
            "Negate: @neg(a)",
        )
        .register(
            "abs",
            unary("abs", |a| numeric1("abs", a, f64::abs)),
            "Absolute value: @abs(a)",
        );
}

/// Numeric addition, or concatenation when both sides are text
fn add(a: &Datum, b: &Datum) -> Result<Datum, EvalError> {
    map2("add", a, b, |x, y| {
        if x.is_null() || y.is_null() {
            return Ok(Value::Null);
        }
        if let (Value::Text(s), Value::Text(t)) = (x, y) {
            return Ok(Value::Text(format!("{}{}", s, t)));
        }
        match (number_arg("add", x)?, number_arg("add", y)?) {
            (Some(x), Some(y)) => Ok(Value::Number(x + y)),
            _ => Ok(Value::Null),
        }
    })
}

/// Remainder taking the sign of the divisor
fn floored_mod(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::CallArgs;

    fn nums(values: &[f64]) -> Datum {
        Datum::Array(values.iter().map(|n| Value::Number(*n)).collect())
    }

    fn call(name: &str, args: Vec<Datum>) -> Result<Datum, EvalError> {
        let mut registry = FunctionRegistry::new();
        register_arithmetic_functions(&mut registry);
        let f = registry.get(name).unwrap();
        f(&CallArgs::new(args, vec![], 3))
    }

    #[test]
    fn test_add_columns() {
        let result = call("add", vec![nums(&[1.0, 2.0, 3.0]), nums(&[4.0, 5.0, 6.0])]).unwrap();
        assert_eq!(result, nums(&[5.0, 7.0, 9.0]));
    }

    #[test]
    fn test_add_concatenates_text() {
        let result = call(
            "add",
            vec![Datum::Scalar(Value::from("ab")), Datum::Scalar(Value::from("cd"))],
        )
        .unwrap();
        assert_eq!(result, Datum::Scalar(Value::from("abcd")));
    }

    #[test]
    fn test_add_text_and_number_is_error() {
        let err = call(
            "add",
            vec![Datum::Scalar(Value::from("ab")), Datum::Scalar(Value::Number(1.0))],
        )
        .unwrap_err();
        assert!(err.message.contains("add() requires a number"));
    }

    #[test]
    fn test_div_by_zero_is_not_an_error() {
        let result = call("div", vec![nums(&[1.0, -1.0, 0.0]), Datum::Scalar(Value::Number(0.0))]).unwrap();
        let values = result.elements();
        assert_eq!(values[0], Value::Number(f64::INFINITY));
        assert_eq!(values[1], Value::Number(f64::NEG_INFINITY));
        assert!(values[2].is_null());
    }

    #[test]
    fn test_floordiv_and_mod_follow_divisor_sign() {
        let floordiv = call("floordiv", vec![nums(&[7.0, -7.0, 7.0]), Datum::Scalar(Value::Number(2.0))]).unwrap();
        assert_eq!(floordiv, nums(&[3.0, -4.0, 3.0]));

        let modulo = call("mod", vec![nums(&[7.0, -7.0, 7.0]), nums(&[3.0, 3.0, -3.0])]).unwrap();
        assert_eq!(modulo, nums(&[1.0, 2.0, -2.0]));
    }

    #[test]
    fn test_neg_and_abs_propagate_null() {
        let input = Datum::Array(vec![Value::Number(-2.0), Value::Null, Value::Number(3.0)]);
        assert_eq!(
            call("abs", vec![input.clone()]).unwrap(),
            Datum::Array(vec![Value::Number(2.0), Value::Null, Value::Number(3.0)])
        );
        assert_eq!(
            call("neg", vec![input]).unwrap(),
            Datum::Array(vec![Value::Number(2.0), Value::Null, Value::Number(-3.0)])
        );
    }

    #[test]
    fn test_pow() {
        assert_eq!(call("pow", vec![nums(&[2.0, 3.0, 4.0]), nums(&[2.0, 2.0, 0.5])]).unwrap(), nums(&[4.0, 9.0, 2.0]));
    }

    #[test]
    fn test_wrong_arity() {
        let err = call("neg", vec![nums(&[1.0]), nums(&[1.0])]).unwrap_err();
        assert!(err.message.contains("neg() takes 1 argument(s) but 2 were given"));
    }
}
