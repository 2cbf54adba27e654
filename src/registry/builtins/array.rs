//! Array builtins
//!
//! The pure helpers live here; the higher-order entries (`map`, `filter`,
//! `find`, `some`, `every`, `reduce`) are declared here but executed by the
//! walker, which is the only place arrow arguments can be bound.

use crate::model::{self, Value};
use crate::registry::function::{
    FunctionCategory, FunctionResult, HigherOrderKind, SafeFunction, argument_type_error,
};

fn expect_array<'a>(name: &str, args: &'a [Value]) -> FunctionResult<&'a [Value]> {
    match &args[0] {
        Value::Array(items) => Ok(items),
        other => Err(argument_type_error(name, 0, "array", other)),
    }
}

pub(super) fn functions() -> Vec<SafeFunction> {
    let cat = FunctionCategory::Array;
    vec![
        SafeFunction::pure("first", cat, 1, Some(1), |args| {
            Ok(expect_array("first", args)?.first().cloned().unwrap_or(Value::Null))
        }),
        SafeFunction::pure("last", cat, 1, Some(1), |args| {
            Ok(expect_array("last", args)?.last().cloned().unwrap_or(Value::Null))
        }),
        SafeFunction::pure("count", cat, 1, Some(1), |args| {
            Ok(Value::Number(expect_array("count", args)?.len() as f64))
        }),
        SafeFunction::pure("unique", cat, 1, Some(1), unique),
        SafeFunction::pure("flatten", cat, 1, Some(1), flatten),
        SafeFunction::pure("sum", cat, 1, Some(1), sum),
        SafeFunction::pure("keys", cat, 1, Some(1), keys),
        SafeFunction::pure("values", cat, 1, Some(1), values),
        SafeFunction::higher_order("map", HigherOrderKind::Map, 2, Some(2)),
        SafeFunction::higher_order("filter", HigherOrderKind::Filter, 2, Some(2)),
        SafeFunction::higher_order("find", HigherOrderKind::Find, 2, Some(2)),
        SafeFunction::higher_order("some", HigherOrderKind::Some, 2, Some(2)),
        SafeFunction::higher_order("every", HigherOrderKind::Every, 2, Some(2)),
        SafeFunction::higher_order("reduce", HigherOrderKind::Reduce, 2, Some(3)),
    ]
}

fn unique(args: &[Value]) -> FunctionResult<Value> {
    let items = expect_array("unique", args)?;
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|seen| model::strict_equals(seen, item)) {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

// One level deep, like Array.prototype.flat()
fn flatten(args: &[Value]) -> FunctionResult<Value> {
    let items = expect_array("flatten", args)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::Array(out))
}

fn sum(args: &[Value]) -> FunctionResult<Value> {
    let items = expect_array("sum", args)?;
    Ok(Value::Number(items.iter().map(model::to_number).sum()))
}

fn keys(args: &[Value]) -> FunctionResult<Value> {
    let out = match &args[0] {
        Value::Object(map) => map.keys().map(|k| Value::String(k.clone())).collect(),
        Value::Array(items) => (0..items.len()).map(|i| Value::Number(i as f64)).collect(),
        other => return Err(argument_type_error("keys", 0, "object or array", other)),
    };
    Ok(Value::Array(out))
}

fn values(args: &[Value]) -> FunctionResult<Value> {
    let out = match &args[0] {
        Value::Object(map) => map.values().cloned().collect(),
        Value::Array(items) => items.clone(),
        other => return Err(argument_type_error("values", 0, "object or array", other)),
    };
    Ok(Value::Array(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FunctionRegistry;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: &[Value]) -> Value {
        FunctionRegistry::standard().call_pure(name, args).unwrap()
    }

    fn nums(ns: &[f64]) -> Value {
        Value::Array(ns.iter().map(|n| Value::Number(*n)).collect())
    }

    #[test]
    fn test_first_last_count() {
        let arr = nums(&[1.0, 2.0, 3.0]);
        assert_eq!(call("first", &[arr.clone()]), Value::Number(1.0));
        assert_eq!(call("last", &[arr.clone()]), Value::Number(3.0));
        assert_eq!(call("count", &[arr]), Value::Number(3.0));
        assert_eq!(call("first", &[Value::Array(vec![])]), Value::Null);
    }

    #[test]
    fn test_unique_preserves_first_occurrence_order() {
        assert_eq!(
            call("unique", &[nums(&[3.0, 1.0, 3.0, 2.0, 1.0])]),
            nums(&[3.0, 1.0, 2.0])
        );
    }

    #[test]
    fn test_flatten_one_level() {
        let nested = Value::Array(vec![nums(&[1.0, 2.0]), Value::Number(3.0), nums(&[4.0])]);
        assert_eq!(call("flatten", &[nested]), nums(&[1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_sum_coerces() {
        let arr = Value::Array(vec![Value::Number(1.0), Value::string("2"), Value::Bool(true)]);
        assert_eq!(call("sum", &[arr]), Value::Number(4.0));
    }

    #[test]
    fn test_non_array_input_errors() {
        let err = FunctionRegistry::standard()
            .call_pure("sum", &[Value::Number(1.0)])
            .unwrap_err();
        assert!(err.to_string().contains("expects array"));
    }
}
