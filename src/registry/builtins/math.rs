//! Math namespace builtins
//!
//! Every function coerces through `ToNumber` and is total: bad input flows
//! through as NaN the way JavaScript's Math does, it never errors.

use crate::model::{self, Value};
use crate::registry::function::{FunctionCategory, SafeFunction};

fn unary(name: &str, f: fn(f64) -> f64) -> SafeFunction {
    SafeFunction::pure(
        format!("Math.{name}"),
        FunctionCategory::Math,
        1,
        Some(1),
        move |args| Ok(Value::Number(f(model::to_number(&args[0])))),
    )
}

pub(super) fn functions() -> Vec<SafeFunction> {
    vec![
        unary("abs", f64::abs),
        unary("ceil", f64::ceil),
        unary("floor", f64::floor),
        unary("round", js_round),
        unary("trunc", f64::trunc),
        unary("sqrt", f64::sqrt),
        SafeFunction::pure("Math.pow", FunctionCategory::Math, 2, Some(2), |args| {
            let base = model::to_number(&args[0]);
            let exponent = model::to_number(&args[1]);
            Ok(Value::Number(base.powf(exponent)))
        }),
        SafeFunction::pure("Math.min", FunctionCategory::Math, 0, None, |args| {
            Ok(Value::Number(fold_extreme(args, f64::INFINITY, f64::min)))
        }),
        SafeFunction::pure("Math.max", FunctionCategory::Math, 0, None, |args| {
            Ok(Value::Number(fold_extreme(args, f64::NEG_INFINITY, f64::max)))
        }),
    ]
}

// Math.round rounds halves toward positive infinity: round(-2.5) == -2
fn js_round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        return n;
    }
    (n + 0.5).floor()
}

fn fold_extreme(args: &[Value], identity: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut result = identity;
    for arg in args {
        let n = model::to_number(arg);
        if n.is_nan() {
            return f64::NAN;
        }
        result = pick(result, n);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FunctionRegistry;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: &[Value]) -> Value {
        FunctionRegistry::standard().call_pure(name, args).unwrap()
    }

    #[test]
    fn test_round_half_toward_positive_infinity() {
        assert_eq!(call("Math.round", &[Value::Number(2.5)]), Value::Number(3.0));
        assert_eq!(call("Math.round", &[Value::Number(-2.5)]), Value::Number(-2.0));
        assert_eq!(call("Math.round", &[Value::Number(1.4)]), Value::Number(1.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(
            call("Math.min", &[Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)]),
            Value::Number(1.0)
        );
        assert_eq!(call("Math.max", &[]), Value::Number(f64::NEG_INFINITY));
        assert!(
            call("Math.min", &[Value::Number(1.0), Value::string("abc")])
                .as_number()
                .unwrap()
                .is_nan()
        );
    }

    #[test]
    fn test_coercion() {
        assert_eq!(call("Math.abs", &[Value::string("-4")]), Value::Number(4.0));
        assert_eq!(call("Math.floor", &[Value::string("2.9")]), Value::Number(2.0));
    }
}
