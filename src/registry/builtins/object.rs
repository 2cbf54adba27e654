//! Object namespace builtins

use crate::model::Value;
use crate::registry::function::{
    FunctionCategory, FunctionResult, SafeFunction, argument_type_error,
};

pub(super) fn functions() -> Vec<SafeFunction> {
    let cat = FunctionCategory::Object;
    vec![
        SafeFunction::pure("Object.keys", cat, 1, Some(1), |args| {
            Ok(Value::Array(
                expect_object("Object.keys", args)?
                    .keys()
                    .map(|k| Value::String(k.clone()))
                    .collect(),
            ))
        }),
        SafeFunction::pure("Object.values", cat, 1, Some(1), |args| {
            Ok(Value::Array(
                expect_object("Object.values", args)?.values().cloned().collect(),
            ))
        }),
        SafeFunction::pure("Object.entries", cat, 1, Some(1), |args| {
            Ok(Value::Array(
                expect_object("Object.entries", args)?
                    .iter()
                    .map(|(k, v)| Value::Array(vec![Value::String(k.clone()), v.clone()]))
                    .collect(),
            ))
        }),
    ]
}

fn expect_object<'a>(
    name: &str,
    args: &'a [Value],
) -> FunctionResult<&'a indexmap::IndexMap<String, Value>> {
    match &args[0] {
        Value::Object(map) => Ok(map),
        other => Err(argument_type_error(name, 0, "object", other)),
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::registry::FunctionRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entries_preserve_insertion_order() {
        let obj = Value::from(serde_json::json!({"b": 1, "a": 2}));
        let keys = FunctionRegistry::standard()
            .call_pure("Object.keys", &[obj])
            .unwrap();
        assert_eq!(keys, Value::Array(vec![Value::string("b"), Value::string("a")]));
    }
}
