//! JSON namespace builtins

use crate::model::Value;
use crate::registry::function::{
    FunctionCategory, FunctionError, FunctionResult, SafeFunction,
};

pub(super) fn functions() -> Vec<SafeFunction> {
    let cat = FunctionCategory::Json;
    vec![
        SafeFunction::pure("JSON.stringify", cat, 1, Some(1), stringify),
        SafeFunction::pure("JSON.parse", cat, 1, Some(1), parse),
    ]
}

fn stringify(args: &[Value]) -> FunctionResult<Value> {
    let json: serde_json::Value = args[0].clone().into();
    serde_json::to_string(&json)
        .map(Value::String)
        .map_err(|e| FunctionError::EvaluationError {
            name: "JSON.stringify".to_string(),
            message: e.to_string(),
        })
}

fn parse(args: &[Value]) -> FunctionResult<Value> {
    let source = match &args[0] {
        Value::String(s) => s,
        other => {
            return Err(super::super::function::argument_type_error(
                "JSON.parse",
                0,
                "string",
                other,
            ));
        }
    };
    serde_json::from_str::<serde_json::Value>(source)
        .map(Value::from)
        .map_err(|e| FunctionError::EvaluationError {
            name: "JSON.parse".to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::registry::FunctionRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stringify_and_parse() {
        let registry = FunctionRegistry::standard();
        let obj = Value::from(serde_json::json!({"a": [1, true, null]}));
        let text = registry.call_pure("JSON.stringify", &[obj.clone()]).unwrap();
        assert_eq!(text, Value::string(r#"{"a":[1,true,null]}"#));

        let back = registry.call_pure("JSON.parse", &[text]).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn test_parse_failure_is_a_function_error() {
        assert!(
            FunctionRegistry::standard()
                .call_pure("JSON.parse", &[Value::string("{broken")])
                .is_err()
        );
    }
}
