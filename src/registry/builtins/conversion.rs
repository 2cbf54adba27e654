//! Type-conversion builtins
//!
//! `String`, `Number` and `Boolean` are callable as bare constructors-style
//! functions; the namespace predicates (`Array.isArray`, `Number.is*`)
//! mirror their JavaScript counterparts.

use crate::model::{self, Value};
use crate::registry::function::{FunctionCategory, SafeFunction};

pub(super) fn functions() -> Vec<SafeFunction> {
    let cat = FunctionCategory::Conversion;
    vec![
        SafeFunction::pure("String", cat, 1, Some(1), |args| {
            Ok(Value::String(model::to_string_value(&args[0])))
        }),
        SafeFunction::pure("Number", cat, 1, Some(1), |args| {
            Ok(Value::Number(model::to_number(&args[0])))
        }),
        SafeFunction::pure("Boolean", cat, 1, Some(1), |args| {
            Ok(Value::Bool(model::to_boolean(&args[0])))
        }),
        SafeFunction::pure("Array.isArray", cat, 1, Some(1), |args| {
            Ok(Value::Bool(matches!(args[0], Value::Array(_))))
        }),
        SafeFunction::pure("Number.isInteger", cat, 1, Some(1), |args| {
            Ok(Value::Bool(matches!(
                &args[0],
                Value::Number(n) if n.is_finite() && n.fract() == 0.0
            )))
        }),
        SafeFunction::pure("Number.isFinite", cat, 1, Some(1), |args| {
            Ok(Value::Bool(matches!(&args[0], Value::Number(n) if n.is_finite())))
        }),
        SafeFunction::pure("Number.isNaN", cat, 1, Some(1), |args| {
            Ok(Value::Bool(matches!(&args[0], Value::Number(n) if n.is_nan())))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::registry::FunctionRegistry;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: &[Value]) -> Value {
        FunctionRegistry::standard().call_pure(name, args).unwrap()
    }

    #[test]
    fn test_constructors() {
        assert_eq!(call("String", &[Value::Number(5.0)]), Value::string("5"));
        assert_eq!(call("Number", &[Value::string(" 42 ")]), Value::Number(42.0));
        assert_eq!(call("Boolean", &[Value::Array(vec![])]), Value::Bool(true));
        assert_eq!(call("Boolean", &[Value::string("")]), Value::Bool(false));
    }

    #[test]
    fn test_predicates_do_not_coerce() {
        assert_eq!(call("Number.isInteger", &[Value::string("5")]), Value::Bool(false));
        assert_eq!(call("Number.isInteger", &[Value::Number(5.0)]), Value::Bool(true));
        assert_eq!(call("Number.isNaN", &[Value::string("abc")]), Value::Bool(false));
        assert_eq!(call("Array.isArray", &[Value::Array(vec![])]), Value::Bool(true));
    }
}
