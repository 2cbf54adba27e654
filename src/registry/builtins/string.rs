//! String builtins
//!
//! All of these accept any value for their receiver argument and coerce it
//! through `ToString`, matching how loosely-typed workflow data behaves in
//! practice.

use crate::model::{self, Value};
use crate::registry::function::{FunctionCategory, FunctionResult, SafeFunction};

fn text(args: &[Value], index: usize) -> String {
    model::to_string_value(&args[index])
}

pub(super) fn functions() -> Vec<SafeFunction> {
    let cat = FunctionCategory::String;
    vec![
        SafeFunction::pure("upper", cat, 1, Some(1), |args| {
            Ok(Value::String(text(args, 0).to_uppercase()))
        }),
        SafeFunction::pure("lower", cat, 1, Some(1), |args| {
            Ok(Value::String(text(args, 0).to_lowercase()))
        }),
        SafeFunction::pure("trim", cat, 1, Some(1), |args| {
            Ok(Value::String(text(args, 0).trim().to_string()))
        }),
        SafeFunction::pure("length", cat, 1, Some(1), length),
        SafeFunction::pure("split", cat, 1, Some(2), split),
        SafeFunction::pure("join", cat, 1, Some(2), join),
        SafeFunction::pure("replace", cat, 3, Some(3), |args| {
            let s = text(args, 0);
            let from = text(args, 1);
            let to = text(args, 2);
            // Like String.prototype.replace: first occurrence only
            Ok(Value::String(s.replacen(&from, &to, 1)))
        }),
        SafeFunction::pure("includes", cat, 2, Some(2), includes),
        SafeFunction::pure("startsWith", cat, 2, Some(2), |args| {
            Ok(Value::Bool(text(args, 0).starts_with(&text(args, 1))))
        }),
        SafeFunction::pure("endsWith", cat, 2, Some(2), |args| {
            Ok(Value::Bool(text(args, 0).ends_with(&text(args, 1))))
        }),
        SafeFunction::pure("substring", cat, 2, Some(3), substring),
    ]
}

fn length(args: &[Value]) -> FunctionResult<Value> {
    let len = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => model::to_string_value(other).chars().count(),
    };
    Ok(Value::Number(len as f64))
}

fn split(args: &[Value]) -> FunctionResult<Value> {
    let s = text(args, 0);
    let Some(separator) = args.get(1) else {
        // No separator: the whole string as a single element
        return Ok(Value::Array(vec![Value::String(s)]));
    };
    let separator = model::to_string_value(separator);
    let parts: Vec<Value> = if separator.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(&separator)
            .map(|part| Value::String(part.to_string()))
            .collect()
    };
    Ok(Value::Array(parts))
}

fn join(args: &[Value]) -> FunctionResult<Value> {
    let items = match &args[0] {
        Value::Array(items) => items,
        other => {
            return Err(super::super::function::argument_type_error(
                "join", 0, "array", other,
            ));
        }
    };
    let separator = args
        .get(1)
        .map(model::to_string_value)
        .unwrap_or_else(|| ",".to_string());
    let parts: Vec<String> = items.iter().map(model::to_string_value).collect();
    Ok(Value::String(parts.join(&separator)))
}

fn includes(args: &[Value]) -> FunctionResult<Value> {
    let found = match &args[0] {
        Value::Array(items) => items.iter().any(|item| model::strict_equals(item, &args[1])),
        other => model::to_string_value(other).contains(&model::to_string_value(&args[1])),
    };
    Ok(Value::Bool(found))
}

fn substring(args: &[Value]) -> FunctionResult<Value> {
    let chars: Vec<char> = text(args, 0).chars().collect();
    let len = chars.len();

    // String.prototype.substring: NaN becomes 0, bounds clamp, arguments
    // swap when start > end
    let clamp = |v: &Value| -> usize {
        let n = model::to_number(v);
        if n.is_nan() || n < 0.0 {
            0
        } else {
            (n as usize).min(len)
        }
    };
    let mut start = clamp(&args[1]);
    let mut end = args.get(2).map(&clamp).unwrap_or(len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    Ok(Value::String(chars[start..end].iter().collect()))
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
    fn test_case_functions() {
        assert_eq!(call("upper", &[Value::string("ada")]), Value::string("ADA"));
        assert_eq!(call("lower", &[Value::string("ADA")]), Value::string("ada"));
        // Non-strings coerce through ToString
        assert_eq!(call("upper", &[Value::Bool(true)]), Value::string("TRUE"));
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(
            call("split", &[Value::string("a,b"), Value::string(",")]),
            Value::Array(vec![Value::string("a"), Value::string("b")])
        );
        assert_eq!(
            call("join", &[
                Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
                Value::string("-"),
            ]),
            Value::string("1-2")
        );
    }

    #[test]
    fn test_replace_first_occurrence_only() {
        assert_eq!(
            call("replace", &[
                Value::string("a-a"),
                Value::string("a"),
                Value::string("b"),
            ]),
            Value::string("b-a")
        );
    }

    #[test]
    fn test_substring_clamps_and_swaps() {
        assert_eq!(
            call("substring", &[Value::string("hello"), Value::Number(1.0), Value::Number(3.0)]),
            Value::string("el")
        );
        assert_eq!(
            call("substring", &[Value::string("hello"), Value::Number(3.0), Value::Number(1.0)]),
            Value::string("el")
        );
        assert_eq!(
            call("substring", &[Value::string("hello"), Value::Number(-5.0), Value::Number(99.0)]),
            Value::string("hello")
        );
    }

    #[test]
    fn test_includes_on_arrays_uses_strict_equality() {
        let arr = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(call("includes", &[arr.clone(), Value::Number(2.0)]), Value::Bool(true));
        assert_eq!(call("includes", &[arr, Value::string("2")]), Value::Bool(false));
    }
}
