//! Columnar compute layer: tokenizer, parser and evaluator for formula text,
//! plus the argument and broadcasting primitives builtin functions are
//! written against.

pub mod evaluator;
pub mod parser;
pub mod tokenizer;

pub use evaluator::{evaluate, evaluate_formula, parse_formula, EvalContext};
pub use parser::{Argument, Expr, ParseError};
pub use tokenizer::{Token, TokenizeError};

use crate::types::Value;

static NULL: Value = Value::Null;

/// Error during evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

impl From<TokenizeError> for EvalError {
    fn from(e: TokenizeError) -> Self {
        EvalError::new(e.to_string())
    }
}

impl From<ParseError> for EvalError {
    fn from(e: ParseError) -> Self {
        EvalError::new(e.to_string())
    }
}

//==============================================================================
// Datum: scalar or column-shaped intermediate
//==============================================================================

/// Result of evaluating an argument or a call.
///
/// Scalars broadcast against arrays; a scalar left at the top of a formula is
/// repeated to the dataset's row count when the column is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Scalar(Value),
    Array(Vec<Value>),
}

impl Datum {
    /// Number of elements, or None for a scalar
    pub fn len(&self) -> Option<usize> {
        match self {
            Datum::Scalar(_) => None,
            Datum::Array(values) => Some(values.len()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Datum::Scalar(_))
    }

    /// Element at `row`; a scalar answers the same value for every row
    pub fn at(&self, row: usize) -> &Value {
        match self {
            Datum::Scalar(v) => v,
            Datum::Array(values) => values.get(row).unwrap_or(&NULL),
        }
    }

    /// All elements; a scalar is a one-element sequence
    pub fn elements(&self) -> &[Value] {
        match self {
            Datum::Scalar(v) => std::slice::from_ref(v),
            Datum::Array(values) => values,
        }
    }

    /// The scalar value, if this is a scalar
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Datum::Scalar(v) => Some(v),
            Datum::Array(_) => None,
        }
    }

    /// Turn into a column of exactly `rows` values
    pub fn materialize(self, rows: usize) -> Result<Vec<Value>, EvalError> {
        match self {
            Datum::Scalar(v) => Ok(vec![v; rows]),
            Datum::Array(values) if values.len() == rows => Ok(values),
            Datum::Array(values) => Err(EvalError::new(format!(
                "Result has {} rows, expected {} rows",
                values.len(),
                rows
            ))),
        }
    }
}

impl From<Value> for Datum {
    fn from(v: Value) -> Self {
        Datum::Scalar(v)
    }
}

impl From<Vec<Value>> for Datum {
    fn from(values: Vec<Value>) -> Self {
        Datum::Array(values)
    }
}

/// Common length of the array arguments; None when every argument is scalar
pub fn broadcast_len(func: &str, args: &[&Datum]) -> Result<Option<usize>, EvalError> {
    let mut len: Option<usize> = None;
    for arg in args {
        if let Some(n) = arg.len() {
            match len {
                Some(m) if m != n => {
                    return Err(EvalError::new(format!(
                        "{}: argument lengths differ ({} vs {})",
                        func, m, n
                    )));
                }
                _ => len = Some(n),
            }
        }
    }
    Ok(len)
}

/// Apply `f` to every element of `a`
pub fn map1<F>(a: &Datum, mut f: F) -> Result<Datum, EvalError>
where
    F: FnMut(&Value) -> Result<Value, EvalError>,
{
    match a {
        Datum::Scalar(v) => Ok(Datum::Scalar(f(v)?)),
        Datum::Array(values) => values
            .iter()
            .map(f)
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::Array),
    }
}

/// Apply `f` pairwise, broadcasting scalars
pub fn map2<F>(func: &str, a: &Datum, b: &Datum, mut f: F) -> Result<Datum, EvalError>
where
    F: FnMut(&Value, &Value) -> Result<Value, EvalError>,
{
    match broadcast_len(func, &[a, b])? {
        None => Ok(Datum::Scalar(f(a.at(0), b.at(0))?)),
        Some(n) => (0..n)
            .map(|i| f(a.at(i), b.at(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::Array),
    }
}

/// Apply `f` to aligned triples, broadcasting scalars
pub fn map3<F>(func: &str, a: &Datum, b: &Datum, c: &Datum, mut f: F) -> Result<Datum, EvalError>
where
    F: FnMut(&Value, &Value, &Value) -> Result<Value, EvalError>,
{
    match broadcast_len(func, &[a, b, c])? {
        None => Ok(Datum::Scalar(f(a.at(0), b.at(0), c.at(0))?)),
        Some(n) => (0..n)
            .map(|i| f(a.at(i), b.at(i), c.at(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::Array),
    }
}

/// Numeric view of `v` for `func`; text is an error, null is None
pub fn number_arg(func: &str, v: &Value) -> Result<Option<f64>, EvalError> {
    if v.is_null() {
        return Ok(None);
    }
    v.as_number().map(Some).ok_or_else(|| {
        EvalError::new(format!(
            "{}() requires a number, got {} '{}'",
            func,
            v.type_name(),
            v.as_text()
        ))
    })
}

/// Elementwise numeric function with null propagation
pub fn numeric1<F>(func: &str, a: &Datum, f: F) -> Result<Datum, EvalError>
where
    F: Fn(f64) -> f64,
{
    map1(a, |v| {
        Ok(match number_arg(func, v)? {
            Some(x) => Value::Number(f(x)),
            None => Value::Null,
        })
    })
}

/// Pairwise numeric function with null propagation
pub fn numeric2<F>(func: &str, a: &Datum, b: &Datum, f: F) -> Result<Datum, EvalError>
where
    F: Fn(f64, f64) -> f64,
{
    map2(func, a, b, |x, y| {
        Ok(match (number_arg(func, x)?, number_arg(func, y)?) {
            (Some(x), Some(y)) => Value::Number(f(x, y)),
            _ => Value::Null,
        })
    })
}

//==============================================================================
// Call arguments
//==============================================================================

/// Evaluated arguments handed to a registered function
#[derive(Debug, Clone, PartialEq)]
pub struct CallArgs {
    positional: Vec<Datum>,
    keywords: Vec<(String, Datum)>,
    rows: usize,
}

impl CallArgs {
    pub fn new(positional: Vec<Datum>, keywords: Vec<(String, Datum)>, rows: usize) -> Self {
        Self {
            positional,
            keywords,
            rows,
        }
    }

    pub fn positional(&self) -> &[Datum] {
        &self.positional
    }

    pub fn keywords(&self) -> &[(String, Datum)] {
        &self.keywords
    }

    /// Row count of the dataset the call is evaluated against
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind arguments to parameters: positionals fill slots in order, keywords by name.
    ///
    /// The first `required` parameters must be supplied; the rest are optional.
    pub fn bind(
        &self,
        func: &str,
        params: &[&'static str],
        required: usize,
    ) -> Result<BoundArgs<'_>, EvalError> {
        if self.positional.len() > params.len() {
            return Err(EvalError::new(format!(
                "{}() takes {} argument(s) but {} were given",
                func,
                params.len(),
                self.positional.len()
            )));
        }

        let mut slots: Vec<Option<&Datum>> = vec![None; params.len()];
        for (i, datum) in self.positional.iter().enumerate() {
            slots[i] = Some(datum);
        }

        for (keyword, datum) in &self.keywords {
            let index = params
                .iter()
                .position(|p| p == keyword)
                .ok_or_else(|| {
                    EvalError::new(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        func, keyword
                    ))
                })?;
            if slots[index].is_some() {
                return Err(EvalError::new(format!(
                    "{}() got multiple values for argument '{}'",
                    func, keyword
                )));
            }
            slots[index] = Some(datum);
        }

        for (param, slot) in params.iter().zip(&slots).take(required) {
            if slot.is_none() {
                return Err(EvalError::new(format!(
                    "{}() missing required argument '{}'",
                    func, param
                )));
            }
        }

        Ok(BoundArgs {
            func: func.to_string(),
            params: params.to_vec(),
            slots,
        })
    }
}

/// Arguments matched to parameter slots by [`CallArgs::bind`]
#[derive(Debug)]
pub struct BoundArgs<'a> {
    func: String,
    params: Vec<&'static str>,
    slots: Vec<Option<&'a Datum>>,
}

impl<'a> BoundArgs<'a> {
    /// Optional parameter at `index`
    pub fn get(&self, index: usize) -> Option<&'a Datum> {
        self.slots.get(index).copied().flatten()
    }

    /// Parameter at `index`, which must have been supplied
    pub fn required(&self, index: usize) -> Result<&'a Datum, EvalError> {
        self.get(index).ok_or_else(|| {
            EvalError::new(format!(
                "{}() missing required argument '{}'",
                self.func,
                self.params.get(index).copied().unwrap_or("?")
            ))
        })
    }

    /// Scalar parameter at `index`, or None when omitted or null
    pub fn scalar(&self, index: usize) -> Result<Option<&'a Value>, EvalError> {
        match self.get(index) {
            None => Ok(None),
            Some(Datum::Scalar(v)) if v.is_null() => Ok(None),
            Some(Datum::Scalar(v)) => Ok(Some(v)),
            Some(Datum::Array(_)) => Err(EvalError::new(format!(
                "{}(): argument '{}' must be a single value, not a column",
                self.func,
                self.params.get(index).copied().unwrap_or("?")
            ))),
        }
    }

    pub fn func(&self) -> &str {
        &self.func
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[f64]) -> Datum {
        Datum::Array(values.iter().map(|n| Value::Number(*n)).collect())
    }

    #[test]
    fn test_map2_broadcasts_scalar() {
        let result = numeric2("mul", &nums(&[1.0, 2.0]), &Datum::Scalar(Value::Number(3.0)), |a, b| a * b)
            .unwrap();
        assert_eq!(result, nums(&[3.0, 6.0]));
    }

    #[test]
    fn test_map2_rejects_mismatched_lengths() {
        let err = numeric2("add", &nums(&[1.0, 2.0]), &nums(&[1.0]), |a, b| a + b).unwrap_err();
        assert!(err.message.contains("lengths differ"));
    }

    #[test]
    fn test_numeric1_propagates_null() {
        let input = Datum::Array(vec![Value::Number(4.0), Value::Null]);
        let result = numeric1("sqrt", &input, f64::sqrt).unwrap();
        assert_eq!(result, Datum::Array(vec![Value::Number(2.0), Value::Null]));
    }

    #[test]
    fn test_numeric1_rejects_text() {
        let err = numeric1("abs", &Datum::Scalar(Value::from("x")), f64::abs).unwrap_err();
        assert!(err.message.contains("abs() requires a number"));
    }

    #[test]
    fn test_materialize_scalar_and_length_check() {
        let col = Datum::Scalar(Value::Number(1.0)).materialize(3).unwrap();
        assert_eq!(col.len(), 3);
        assert!(nums(&[1.0]).materialize(2).is_err());
    }

    #[test]
    fn test_bind_positional_and_keyword() {
        let args = CallArgs::new(
            vec![nums(&[1.0])],
            vec![("upper".to_string(), Datum::Scalar(Value::Number(5.0)))],
            1,
        );
        let bound = args.bind("clip", &["a", "lower", "upper"], 1).unwrap();
        assert!(bound.get(1).is_none());
        assert_eq!(bound.get(2), Some(&Datum::Scalar(Value::Number(5.0))));
    }

    #[test]
    fn test_bind_errors() {
        let too_many = CallArgs::new(vec![nums(&[1.0]), nums(&[2.0])], vec![], 1);
        assert!(too_many
            .bind("neg", &["a"], 1)
            .unwrap_err()
            .message
            .contains("takes 1 argument(s) but 2 were given"));

        let unknown = CallArgs::new(
            vec![nums(&[1.0])],
            vec![("digits".to_string(), Datum::Scalar(Value::Number(2.0)))],
            1,
        );
        assert!(unknown
            .bind("round", &["a", "n"], 1)
            .unwrap_err()
            .message
            .contains("unexpected keyword argument 'digits'"));

        let duplicate = CallArgs::new(
            vec![nums(&[1.0]), Datum::Scalar(Value::Number(1.0))],
            vec![("n".to_string(), Datum::Scalar(Value::Number(2.0)))],
            1,
        );
        assert!(duplicate
            .bind("round", &["a", "n"], 1)
            .unwrap_err()
            .message
            .contains("multiple values for argument 'n'"));

        let missing = CallArgs::new(vec![nums(&[1.0])], vec![], 1);
        assert!(missing
            .bind("add", &["a", "b"], 2)
            .unwrap_err()
            .message
            .contains("missing required argument 'b'"));
    }
}
