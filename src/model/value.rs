//! Core value type for expression evaluation

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::convert;

/// Dynamic value produced and consumed by expression evaluation.
///
/// This is a closed sum type over the JSON-shaped values a workflow item can
/// contain. Numbers follow ECMAScript semantics: a single `f64`
/// representation where integers are floats without a fractional part.
/// `Null` also stands in for JavaScript `undefined` — the engine never needs
/// to distinguish the two.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Null / undefined
    Null,

    /// Boolean value
    Bool(bool),

    /// Number with ECMAScript `f64` semantics (NaN and infinities included)
    Number(f64),

    /// String value
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// String-keyed mapping with stable insertion order
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Create an empty object value
    pub fn object() -> Self {
        Self::Object(IndexMap::new())
    }

    /// Create a string value from anything string-like
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Check whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the JavaScript-style type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Try to view this value as a boolean without coercion
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to view this value as a number without coercion
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to view this value as a string slice without coercion
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view this value as an array slice
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Try to view this value as an object map
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a property the way JavaScript member access does.
    ///
    /// Objects resolve their keys; arrays and strings expose `length`.
    /// Anything missing resolves to `Null` rather than erroring.
    pub fn get_property(&self, name: &str) -> Value {
        match self {
            Self::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
            Self::Array(items) if name == "length" => Value::Number(items.len() as f64),
            Self::String(s) if name == "length" => Value::Number(s.chars().count() as f64),
            _ => Value::Null,
        }
    }
}

/// Convert from serde_json::Value, preserving object key order via indexmap
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => {
                Self::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Self::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Convert to serde_json::Value. Non-finite numbers become `null`, matching
/// what `JSON.stringify` does with NaN and the infinities; integral numbers
/// come out as JSON integers so they render without a decimal point.
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => {
                if n.is_finite()
                    && n.fract() == 0.0
                    && n >= i64::MIN as f64
                    && n <= i64::MAX as f64
                {
                    serde_json::Value::Number((n as i64).into())
                } else {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// The default value is `Null`, matching what absent data resolves to
impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

/// Display renders the ECMAScript `ToString` of the value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", convert::to_string_value(self))
    }
}

/// Debug uses a cleaner format than the derived one
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| format!("{v:?}")).collect();
                write!(f, "Array([{}])", parts.join(", "))
            }
            Self::Object(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v:?}")).collect();
                write!(f, "Object({{{}}})", parts.join(", "))
            }
        }
    }
}

/// Serialize through the JSON bridge so values round-trip as plain JSON
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let json: serde_json::Value = self.clone().into();
        json.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from(json))
    }
}
