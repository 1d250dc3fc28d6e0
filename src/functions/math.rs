//! Math functions
//! round, ceil, floor, sqrt, log, log10, log2, exp, sin, cos, tan, clip
//!
//! Out-of-domain inputs (`sqrt(-1)`, `log(0)`) produce NaN or -inf rather
//! than errors.

use super::{builtin, integer_param, number_param, unary};
use crate::core::compute::{numeric1, BoundArgs, Datum, EvalError};
use crate::core::registry::FunctionRegistry;

pub fn register_math_functions(registry: &mut FunctionRegistry) {
    registry
        .register(
            "round",
            builtin("round", &["a", "n"], 1, round),
            "Round: @round(a, 2)",
        )
        .register("ceil", unary("ceil", |a| numeric1("ceil", a, f64::ceil)), "Ceiling: @ceil(a)")
        .register("floor", unary("floor", |a| numeric1("floor", a, f64::floor)), "Floor: @floor(a)")
        .register("sqrt", unary("sqrt", |a| numeric1("sqrt", a, f64::sqrt)), "Square root: @sqrt(a)")
        .register("log", unary("log", |a| numeric1("log", a, f64::ln)), "Natural log: @log(a)")
        .register("log10", unary("log10", |a| numeric1("log10", a, f64::log10)), "Log base 10: @log10(a)")
        .register("log2", unary("log2", |a| numeric1("log2", a, f64::log2)), "Log base 2: @log2(a)")
        .register("exp", unary("exp", |a| numeric1("exp", a, f64::exp)), "Exponential: @exp(a)")
        .register("sin", unary("sin", |a| numeric1("sin", a, f64::sin)), "Sine: @sin(a)")
        .register("cos", unary("cos", |a| numeric1("cos", a, f64::cos)), "Cosine: @cos(a)")
        .register("tan", unary("tan", |a| numeric1("tan", a, f64::tan)), "Tangent: @tan(a)")
        .register(
            "clip",
            builtin("clip", &["a", "lower", "upper"], 1, clip),
            "Clip values: @clip(a, 0, 100)",
        );
}

/// Round half to even at `n` decimal places (negative `n` rounds to tens, hundreds, ...)
fn round(args: &BoundArgs<'_>) -> Result<Datum, EvalError> {
    let digits = integer_param(args, 1, "n")?.unwrap_or(0);
    let digits = i32::try_from(digits)
        .map_err(|_| EvalError::new(format!("round(): argument 'n' out of range: {}", digits)))?;

    numeric1("round", args.required(0)?, |x| round_half_even(x, digits))
}

fn round_half_even(x: f64, digits: i32) -> f64 {
    if digits > 0 {
        let scaled = x * 10_f64.powi(digits);
        // Past f64 precision there is nothing left to round
        if !scaled.is_finite() {
            return x;
        }
        scaled.round_ties_even() / 10_f64.powi(digits)
    } else {
        let factor = 10_f64.powi(digits.saturating_neg());
        if factor.is_infinite() {
            return 0.0_f64.copysign(x);
        }
        (x / factor).round_ties_even() * factor
    }
}

fn clip(args: &BoundArgs<'_>) -> Result<Datum, EvalError> {
    let lower = number_param(args, 1, "lower")?;
    let upper = number_param(args, 2, "upper")?;
    if lower.is_none() && upper.is_none() {
        return Err(EvalError::new(
            "clip() requires at least one of 'lower' or 'upper'",
        ));
    }

    numeric1("clip", args.required(0)?, |x| {
        let x = lower.map_or(x, |lo| x.max(lo));
        upper.map_or(x, |hi| x.min(hi))
    })
}
