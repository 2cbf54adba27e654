//! Settings binding: substituting evaluated `{{ ... }}` templates into
//! configuration structures
//!
//! A string that is exactly one template keeps the evaluated value's native
//! type; mixed text interpolates every span through the string conversion.
//! Any failed expression aborts the whole bind with the offending path
//! attached.

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::evaluator::{ErrorKind, Evaluator, ExpressionContext};
use crate::model::{self, PathSegment, Value, build_path};
use crate::template;

/// Error produced when binding a settings structure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("bind failed at '{path}' ({kind}): {message}")]
pub struct BindError {
    /// Path of the offending entry, e.g. `items[0].name`
    pub path: String,
    /// Classification of the underlying failure
    pub kind: ErrorKind,
    /// Underlying message
    pub message: String,
}

/// Binds template expressions inside settings values against an item.
#[derive(Debug, Clone)]
pub struct Binder {
    evaluator: Arc<Evaluator>,
}

impl Binder {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self { evaluator }
    }

    /// Bind one string. Plain text passes through unchanged; a string that
    /// is exactly one template span yields the evaluated value as native
    /// JSON; anything else interpolates.
    pub fn bind_string(&self, item: &JsonValue, text: &str) -> Result<JsonValue, BindError> {
        self.bind_string_at(item, text, &[])
    }

    /// Recursively bind every string inside a settings value.
    pub fn bind_value(&self, item: &JsonValue, settings: &JsonValue) -> Result<JsonValue, BindError> {
        let mut path = Vec::new();
        self.bind_value_at(item, settings, &mut path)
    }

    /// Bind a settings value, then marshal it into a typed structure.
    pub fn bind_to_struct<T: DeserializeOwned>(
        &self,
        item: &JsonValue,
        settings: &JsonValue,
    ) -> Result<T, BindError> {
        let bound = self.bind_value(item, settings)?;
        serde_json::from_value(bound).map_err(|err| BindError {
            path: String::new(),
            kind: ErrorKind::Type,
            message: err.to_string(),
        })
    }

    fn bind_value_at(
        &self,
        item: &JsonValue,
        settings: &JsonValue,
        path: &mut Vec<PathSegment>,
    ) -> Result<JsonValue, BindError> {
        match settings {
            JsonValue::String(text) => self.bind_string_at(item, text, path),
            JsonValue::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    path.push(PathSegment::Key(key.clone()));
                    let bound = self.bind_value_at(item, value, path)?;
                    path.pop();
                    out.insert(key.clone(), bound);
                }
                Ok(JsonValue::Object(out))
            }
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, value) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    let bound = self.bind_value_at(item, value, path)?;
                    path.pop();
                    out.push(bound);
                }
                Ok(JsonValue::Array(out))
            }
            // Scalars carry no templates
            other => Ok(other.clone()),
        }
    }

    fn bind_string_at(
        &self,
        item: &JsonValue,
        text: &str,
        path: &[PathSegment],
    ) -> Result<JsonValue, BindError> {
        let spans = template::extract_template_expressions(text);
        if spans.is_empty() {
            return Ok(JsonValue::String(text.to_string()));
        }

        let context = ExpressionContext::with_item(Value::from(item.clone()));

        // A lone span covering the whole string keeps its native type
        if spans.len() == 1 && spans[0].full_match == text {
            let value = self.evaluate_span(&spans[0].expression, &context, path)?;
            if self.evaluator.options().enable_debugging {
                debug!("bound '{}' natively at '{}'", spans[0].expression, build_path(path));
            }
            return Ok(value.into());
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in &spans {
            out.push_str(&text[cursor..span.start_index]);
            let value = self.evaluate_span(&span.expression, &context, path)?;
            out.push_str(&model::to_string_value(&value));
            cursor = span.end_index;
        }
        out.push_str(&text[cursor..]);
        Ok(JsonValue::String(out))
    }

    fn evaluate_span(
        &self,
        expression: &str,
        context: &ExpressionContext,
        path: &[PathSegment],
    ) -> Result<Value, BindError> {
        let result = self.evaluator.evaluate(expression, context);
        if result.success {
            Ok(result.value)
        } else {
            Err(BindError {
                path: build_path(path),
                kind: result.error_kind.unwrap_or(ErrorKind::Runtime),
                message: result
                    .error
                    .unwrap_or_else(|| "evaluation failed".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn binder() -> Binder {
        Binder::new(Arc::new(Evaluator::default()))
    }

    #[test]
    fn test_plain_text_passes_through() {
        let bound = binder().bind_string(&json!({}), "no templates").unwrap();
        assert_eq!(bound, json!("no templates"));
    }

    #[test]
    fn test_whole_string_template_keeps_native_type() {
        let item = json!({"count": 42, "tags": ["a", "b"]});
        let b = binder();
        assert_eq!(b.bind_string(&item, "{{ item.count }}").unwrap(), json!(42));
        assert_eq!(b.bind_string(&item, "{{ item.count > 10 }}").unwrap(), json!(true));
        assert_eq!(b.bind_string(&item, "{{ item.tags }}").unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_padded_template_interpolates_as_string() {
        // Text outside the span, even pure whitespace, means interpolation
        let item = json!({"count": 42});
        let b = binder();
        assert_eq!(
            b.bind_string(&item, "  {{ item.count }}  ").unwrap(),
            json!("  42  ")
        );
        assert_eq!(
            b.bind_string(&item, "{{ item.count }}\n").unwrap(),
            json!("42\n")
        );
    }

    #[test]
    fn test_interpolation() {
        let item = json!({"name": "Ada"});
        let bound = binder().bind_string(&item, "Hello {{item.name}}!").unwrap();
        assert_eq!(bound, json!("Hello Ada!"));
    }

    #[test]
    fn test_multiple_spans_interpolate() {
        let item = json!({"a": 1, "b": 2});
        let bound = binder()
            .bind_string(&item, "{{item.a}} + {{item.b}} = {{item.a + item.b}}")
            .unwrap();
        assert_eq!(bound, json!("1 + 2 = 3"));
    }

    #[test]
    fn test_bind_value_recurses() {
        let item = json!({"name": "Ada", "count": 3});
        let settings = json!({
            "greeting": "Hi {{item.name}}",
            "limits": [{"max": "{{ item.count * 2 }}"}],
            "enabled": true
        });
        let bound = binder().bind_value(&item, &settings).unwrap();
        assert_eq!(
            bound,
            json!({
                "greeting": "Hi Ada",
                "limits": [{"max": 6}],
                "enabled": true
            })
        );
    }

    #[test]
    fn test_error_carries_path() {
        let settings = json!({"items": [{"name": "{{ require('fs') }}"}]});
        let err = binder().bind_value(&json!({}), &settings).unwrap_err();
        assert_eq!(err.path, "items[0].name");
        assert_eq!(err.kind, ErrorKind::Security);
    }

    #[test]
    fn test_bind_to_struct() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Settings {
            greeting: String,
            max: f64,
        }
        let item = json!({"name": "Ada", "count": 5});
        let settings = json!({"greeting": "Hi {{item.name}}", "max": "{{item.count}}"});
        let bound: Settings = binder().bind_to_struct(&item, &settings).unwrap();
        assert_eq!(
            bound,
            Settings {
                greeting: "Hi Ada".to_string(),
                max: 5.0
            }
        );
    }

    #[test]
    fn test_bind_to_struct_shape_mismatch_is_type_error() {
        #[derive(serde::Deserialize, Debug)]
        struct Settings {
            #[allow(dead_code)]
            max: bool,
        }
        let err = binder()
            .bind_to_struct::<Settings>(&json!({}), &json!({"max": "{{ 1 + 1 }}"}))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_syntax_error_aborts_bind() {
        let err = binder()
            .bind_string(&json!({}), "x {{ 1 + }} y")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }
}
