//! Date namespace builtins
//!
//! Only the two stateless entry points workflow expressions actually use.
//! `Date.now` is the single nondeterministic function in the standard set.

use chrono::{DateTime, Utc};

use crate::model::Value;
use crate::registry::function::{FunctionCategory, SafeFunction, argument_type_error};

pub(super) fn functions() -> Vec<SafeFunction> {
    let cat = FunctionCategory::DateTime;
    vec![
        SafeFunction::pure("Date.now", cat, 0, Some(0), |_args| {
            Ok(Value::Number(Utc::now().timestamp_millis() as f64))
        }),
        SafeFunction::pure("Date.parse", cat, 1, Some(1), |args| {
            let source = match &args[0] {
                Value::String(s) => s,
                other => return Err(argument_type_error("Date.parse", 0, "string", other)),
            };
            // Invalid input is NaN, like JavaScript's Date.parse
            let millis = DateTime::parse_from_rfc3339(source)
                .map(|dt| dt.timestamp_millis() as f64)
                .unwrap_or(f64::NAN);
            Ok(Value::Number(millis))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::registry::FunctionRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = FunctionRegistry::standard()
            .call_pure("Date.parse", &[Value::string("1970-01-01T00:00:01Z")])
            .unwrap();
        assert_eq!(parsed, Value::Number(1000.0));
    }

    #[test]
    fn test_parse_invalid_is_nan() {
        let parsed = FunctionRegistry::standard()
            .call_pure("Date.parse", &[Value::string("not a date")])
            .unwrap();
        assert!(parsed.as_number().unwrap().is_nan());
    }
}
