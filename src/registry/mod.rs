//! Function registry — the whitelist of callables reachable from
//! expressions

pub mod builtins;
pub mod function;

use std::sync::Arc;

use rustc_hash::FxHashMap;

pub use function::{
    FunctionCategory, FunctionError, FunctionKind, FunctionResult, HigherOrderKind, PureFn,
    SafeFunction, argument_type_error,
};

use crate::model::Value;

/// Registry of safe functions, keyed by call name (`upper`, `Math.round`).
///
/// Built once at evaluator construction, then shared read-only — lookups
/// never lock.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<SafeFunction>>,
}

impl FunctionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full standard set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for function in builtins::all() {
            registry.register(function);
        }
        registry
    }

    /// Register a function. Re-registering a name replaces the previous
    /// entry, which is how callers override builtins.
    pub fn register(&mut self, function: SafeFunction) {
        self.functions
            .insert(function.name.clone(), Arc::new(function));
    }

    /// Look up a function by call name.
    pub fn get(&self, name: &str) -> Option<&Arc<SafeFunction>> {
        self.functions.get(name)
    }

    /// Whether a call name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All registered names, sorted (for docs and the CLI listing).
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Validate arity and invoke a pure function by name. Higher-order
    /// functions cannot be called this way — they need the walker.
    pub fn call_pure(&self, name: &str, args: &[Value]) -> FunctionResult<Value> {
        let function = self
            .get(name)
            .ok_or_else(|| FunctionError::EvaluationError {
                name: name.to_string(),
                message: "function is not registered".to_string(),
            })?;
        function.validate_arity(args.len())?;
        match &function.kind {
            FunctionKind::Pure(f) => f(args),
            FunctionKind::HigherOrder(_) => Err(FunctionError::EvaluationError {
                name: name.to_string(),
                message: "higher-order function requires the evaluator".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_contents() {
        let registry = FunctionRegistry::standard();
        for name in [
            "upper", "lower", "trim", "split", "join", "map", "filter", "find",
            "Math.round", "Math.abs", "JSON.stringify", "JSON.parse",
            "Object.keys", "String", "Number", "Boolean", "Date.now",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
        assert!(!registry.contains("eval"));
        assert!(!registry.contains("require"));
    }

    #[test]
    fn test_registration_replaces() {
        let mut registry = FunctionRegistry::standard();
        let before = registry.len();
        registry.register(SafeFunction::pure(
            "upper",
            FunctionCategory::Custom,
            1,
            Some(1),
            |_| Ok(Value::string("overridden")),
        ));
        assert_eq!(registry.len(), before);
        let result = registry.call_pure("upper", &[Value::string("x")]).unwrap();
        assert_eq!(result, Value::string("overridden"));
    }

    #[test]
    fn test_arity_is_checked_centrally() {
        let registry = FunctionRegistry::standard();
        assert!(matches!(
            registry.call_pure("upper", &[]),
            Err(FunctionError::InvalidArity { .. })
        ));
    }
}
