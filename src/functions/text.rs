//! Text functions
//! upper, lower, strip, lstrip, rstrip, concat, concat3, concat_sep, str_len,
//! contains, startswith, endswith, replace, slice
//!
//! Null in, null out. Numbers are rendered as text before string operations.

use regex::Regex;

use super::{builtin, integer_param, text_param, text_value, unary};
use crate::core::compute::{broadcast_len, map1, BoundArgs, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

pub fn register_text_functions(registry: &mut FunctionRegistry) {
    registry
        .register(
            "upper",
            unary("upper", |a| map_text(a, |s| s.to_uppercase())),
            "Uppercase: @upper(a)",
        )
        .register(
            "lower",
            unary("lower", |a| map_text(a, |s| s.to_lowercase())),
            "Lowercase: @lower(a)",
        )
        .register(
            "strip",
            unary("strip", |a| map_text(a, |s| s.trim().to_string())),
            "Strip whitespace: @strip(a)",
        )
        .register(
            "lstrip",
            unary("lstrip", |a| map_text(a, |s| s.trim_start().to_string())),
            "Left strip: @lstrip(a)",
        )
        .register(
            "rstrip",
            unary("rstrip", |a| map_text(a, |s| s.trim_end().to_string())),
            "Right strip: @rstrip(a)",
        )
        .register(
            "concat",
            builtin("concat", &["a", "b"], 2, |args| {
                concat("concat", &[args.required(0)?, args.required(1)?], "")
            }),
            "Concatenate: @concat(a, b)",
        )
        .register(
            "concat3",
            builtin("concat3", &["a", "b", "c"], 3, |args| {
                concat(
                    "concat3",
                    &[args.required(0)?, args.required(1)?, args.required(2)?],
                    "",
                )
            }),
            "Concatenate 3: @concat3(a, b, c)",
        )
        .register(
            "concat_sep",
            builtin("concat_sep", &["a", "b", "sep"], 3, |args| {
                let sep = text_param(args, 2, "sep")?.unwrap_or_default();
                concat("concat_sep", &[args.required(0)?, args.required(1)?], &sep)
            }),
            "Concatenate with separator: @concat_sep(a, b, ' ')",
        )
        .register(
            "str_len",
            unary("str_len", |a| {
                map1(a, |v| {
                    Ok(text_value(v).map_or(Value::Null, |s| Value::Number(s.chars().count() as f64)))
                })
            }),
            "String length: @str_len(a)",
        )
        .register(
            "contains",
            builtin("contains", &["a", "pattern"], 2, contains),
            "Contains pattern: @contains(a, 'pattern')",
        )
        .register(
            "startswith",
            builtin("startswith", &["a", "prefix"], 2, |args| {
                let prefix = text_param(args, 1, "prefix")?.unwrap_or_default();
                test_text(args.required(0)?, |s| s.starts_with(prefix.as_str()))
            }),
            "Starts with: @startswith(a, 'prefix')",
        )
        .register(
            "endswith",
            builtin("endswith", &["a", "suffix"], 2, |args| {
                let suffix = text_param(args, 1, "suffix")?.unwrap_or_default();
                test_text(args.required(0)?, |s| s.ends_with(suffix.as_str()))
            }),
            "Ends with: @endswith(a, 'suffix')",
        )
        .register(
            "replace",
            builtin("replace", &["a", "old", "new"], 3, |args| {
                let old = text_param(args, 1, "old")?.unwrap_or_default();
                let new = text_param(args, 2, "new")?.unwrap_or_default();
                map_text(args.required(0)?, |s| s.replace(old.as_str(), new.as_str()))
            }),
            "Replace: @replace(a, 'old', 'new')",
        )
        .register(
            "slice",
            builtin("slice", &["a", "start", "end"], 1, |args| {
                let start = integer_param(args, 1, "start")?;
                let end = integer_param(args, 2, "end")?;
                map_text(args.required(0)?, |s| slice_chars(&s, start, end))
            }),
            "Slice string: @slice(a, 0, 5)",
        );
}

/// Transform every non-null cell as text
fn map_text<F>(a: &Datum, f: F) -> Result<Datum, EvalError>
where
    F: Fn(String) -> String,
{
    map1(a, |v| Ok(text_value(v).map_or(Value::Null, |s| Value::Text(f(s)))))
}

/// Boolean test over text cells; null cells answer false
fn test_text<F>(a: &Datum, f: F) -> Result<Datum, EvalError>
where
    F: Fn(&str) -> bool,
{
    map1(a, |v| Ok(Value::Boolean(text_value(v).is_some_and(|s| f(&s)))))
}

fn concat(func: &str, parts: &[&Datum], sep: &str) -> Result<Datum, EvalError> {
    let join = |row: usize| -> Value {
        let mut pieces = Vec::with_capacity(parts.len());
        for part in parts {
            match text_value(part.at(row)) {
                Some(s) => pieces.push(s),
                None => return Value::Null,
            }
        }
        Value::Text(pieces.join(sep))
    };

    Ok(match broadcast_len(func, parts)? {
        None => Datum::Scalar(join(0)),
        Some(n) => Datum::Array((0..n).map(join).collect()),
    })
}

fn contains(args: &BoundArgs<'_>) -> Result<Datum, EvalError> {
    let pattern = text_param(args, 1, "pattern")?.unwrap_or_default();
    let re = Regex::new(&pattern)
        .map_err(|e| EvalError::new(format!("contains(): invalid pattern '{}': {}", pattern, e)))?;
    test_text(args.required(0)?, |s| re.is_match(s))
}

/// Character slice with negative indices counted from the end
fn slice_chars(s: &str, start: Option<i64>, end: Option<i64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { i + len } else { i };
        i.clamp(0, len) as usize
    };

    let from = start.map_or(0, clamp);
    let to = end.map_or(chars.len(), clamp);
    if from >= to {
        return String::new();
    }
    chars[from..to].iter().collect()
}
