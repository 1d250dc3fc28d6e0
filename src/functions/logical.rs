//! Logical functions
//! and_, or_, not_, if_else

use super::{binary, builtin, unary};
use crate::core::compute::{map1, map2, map3, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

pub fn register_logical_functions(registry: &mut FunctionRegistry) {
    registry
        .register(
            "and_",
            binary("and_", |a, b| logical2("and_", a, b, |x, y| x && y)),
            "Logical AND: @and_(a, b)",
        )
        .register(
            "or_",
            binary("or_", |a, b| logical2("or_", a, b, |x, y| x || y)),
            "Logical OR: @or_(a, b)",
        )
        .register("not_", unary("not_", not), "Logical NOT: @not_(a)")
        .register(
            "if_else",
            builtin("if_else", &["cond", "true_val", "false_val"], 3, |args| {
                if_else(args.required(0)?, args.required(1)?, args.required(2)?)
            }),
            "Conditional: @if_else(condition, true_value, false_value)",
        );
}

/// Null operands count as false
fn logical2(func: &str, a: &Datum, b: &Datum, f: fn(bool, bool) -> bool) -> Result<Datum, EvalError> {
    map2(func, a, b, |x, y| {
        let x = x.as_bool().unwrap_or(false);
        let y = y.as_bool().unwrap_or(false);
        Ok(Value::Boolean(f(x, y)))
    })
}

fn not(a: &Datum) -> Result<Datum, EvalError> {
    map1(a, |v| {
        Ok(match v.as_bool() {
            Some(b) => Value::Boolean(!b),
            None => Value::Null,
        })
    })
}

/// Elementwise select; a null condition picks the false branch
fn if_else(cond: &Datum, when_true: &Datum, when_false: &Datum) -> Result<Datum, EvalError> {
    map3("if_else", cond, when_true, when_false, |c, t, f| {
        Ok(if c.as_bool() == Some(true) { t.clone() } else { f.clone() })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::CallArgs;

    fn call(name: &str, args: Vec<Datum>) -> Result<Datum, EvalError> {
        let mut registry = FunctionRegistry::new();
        register_logical_functions(&mut registry);
        let f = registry.get(name).unwrap();
        f(&CallArgs::new(args, vec![], 3))
    }

    fn bools(values: &[bool]) -> Datum {
        Datum::Array(values.iter().map(|b| Value::Boolean(*b)).collect())
    }

    #[test]
    fn test_and_or() {
        let a = bools(&[true, true, false]);
        let b = bools(&[true, false, false]);
        assert_eq!(call("and_", vec![a.clone(), b.clone()]).unwrap(), bools(&[true, false, false]));
        assert_eq!(call("or_", vec![a, b]).unwrap(), bools(&[true, true, false]));
    }

    #[test]
    fn test_or_treats_null_as_false() {
        let a = Datum::Array(vec![Value::Null, Value::Boolean(true), Value::Boolean(true)]);
        let result = call("or_", vec![a.clone(), Datum::Scalar(Value::Boolean(false))]).unwrap();
        assert_eq!(result, bools(&[false, true, true]));
    }

    #[test]
    fn test_not_propagates_null() {
        let a = Datum::Array(vec![Value::Boolean(true), Value::Null, Value::Number(0.0)]);
        assert_eq!(
            call("not_", vec![a]).unwrap(),
            Datum::Array(vec![Value::Boolean(false), Value::Null, Value::Boolean(true)])
        );
    }

    #[test]
    fn test_if_else_selects_per_row() {
        let cond = Datum::Array(vec![Value::Boolean(true), Value::Boolean(false), Value::Null]);
        let result = call(
            "if_else",
            vec![cond, Datum::Scalar(Value::from("pass")), Datum::Scalar(Value::from("fail"))],
        )
        .unwrap();
        assert_eq!(
            result,
            Datum::Array(vec![Value::from("pass"), Value::from("fail"), Value::from("fail")])
        );
    }

    #[test]
    fn test_if_else_with_column_branches() {
        let cond = bools(&[true, false, true]);
        let a = Datum::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        let b = Datum::Array(vec![Value::Number(10.0), Value::Number(20.0), Value::Number(30.0)]);
        assert_eq!(
            call("if_else", vec![cond, a, b]).unwrap(),
            Datum::Array(vec![Value::Number(1.0), Value::Number(20.0), Value::Number(3.0)])
        );
    }
}
