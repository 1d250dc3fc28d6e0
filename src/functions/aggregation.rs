//! Aggregation functions
//! sum, mean, median, min, max, std, var, count, pct_of_total, normalize, zscore
//!
//! Nulls are skipped. The first eight reduce a column to one value that is
//! broadcast back to the column length; the last three return a full column.

use super::unary;
use crate::core::compute::{number_arg, numeric1, Datum, EvalError};
use crate::core::registry::FunctionRegistry;
use crate::types::Value;

pub fn register_aggregation_functions(registry: &mut FunctionRegistry) {
    registry
        .register("sum", unary("sum", |a| reduce("sum", a, sum)), "Sum: @sum(a)")
        .register("mean", unary("mean", |a| reduce("mean", a, mean)), "Mean: @mean(a)")
        .register("median", unary("median", |a| reduce("median", a, median)), "Median: @median(a)")
        .register("min", unary("min", |a| reduce("min", a, min)), "Minimum: @min(a)")
        .register("max", unary("max", |a| reduce("max", a, max)), "Maximum: @max(a)")
        .register("std", unary("std", |a| reduce("std", a, std_dev)), "Standard deviation: @std(a)")
        .register("var", unary("var", |a| reduce("var", a, variance)), "Variance: @var(a)")
        .register("count", unary("count", count), "Count non-null: @count(a)")
        .register(
            "pct_of_total",
            unary("pct_of_total", |a| {
                let total = sum(&numbers("pct_of_total", a)?);
                numeric1("pct_of_total", a, |x| x / total * 100.0)
            }),
            "Percentage of total: @pct_of_total(a)",
        )
        .register(
            "normalize",
            unary("normalize", |a| {
                let values = numbers("normalize", a)?;
                let (lo, hi) = (min(&values), max(&values));
                numeric1("normalize", a, |x| (x - lo) / (hi - lo))
            }),
            "Normalize 0-1: @normalize(a)",
        )
        .register(
            "zscore",
            unary("zscore", |a| {
                let values = numbers("zscore", a)?;
                let (mu, sigma) = (mean(&values), std_dev(&values));
                numeric1("zscore", a, |x| (x - mu) / sigma)
            }),
            "Z-score: @zscore(a)",
        );
}

/// Non-null numeric cells of `a`
fn numbers(func: &str, a: &Datum) -> Result<Vec<f64>, EvalError> {
    let mut out = Vec::new();
    for v in a.elements() {
        if let Some(x) = number_arg(func, v)? {
            out.push(x);
        }
    }
    Ok(out)
}

fn reduce(func: &str, a: &Datum, f: fn(&[f64]) -> f64) -> Result<Datum, EvalError> {
    Ok(Datum::Scalar(Value::Number(f(&numbers(func, a)?))))
}

fn count(a: &Datum) -> Result<Datum, EvalError> {
    let n = a.elements().iter().filter(|v| !v.is_null()).count();
    Ok(Datum::Scalar(Value::Number(n as f64)))
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

/// Sample variance (n - 1 denominator)
fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mu = mean(values);
    values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}
