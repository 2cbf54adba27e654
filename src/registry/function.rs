//! Safe-function definitions
//!
//! A [`SafeFunction`] is the only kind of callable reachable from an
//! expression. Anything the registry does not know — by bare name, by
//! `Namespace.method` for the fixed namespaces, or as a method name — is
//! rejected by the evaluator as a security error before it can run.

use std::sync::Arc;

use thiserror::Error;

use crate::model::Value;

/// Result type for function evaluation
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Errors raised by safe-function implementations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Wrong number of arguments
    #[error("function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unbounded)
        max: Option<usize>,
        /// Arguments actually provided
        actual: usize,
    },

    /// Argument of an unusable type
    #[error("function '{name}' argument {index} expects {expected}, got {actual}")]
    InvalidArgumentType {
        /// Function name
        name: String,
        /// Argument index
        index: usize,
        /// Expected type description
        expected: String,
        /// Actual type name
        actual: String,
    },

    /// Any other failure inside the function body
    #[error("function '{name}' failed: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Underlying message
        message: String,
    },
}

/// Signature of a pure (value-in, value-out) safe function
pub type PureFn = Arc<dyn Fn(&[Value]) -> FunctionResult<Value> + Send + Sync>;

/// Higher-order builtins the walker executes itself so arrow arguments can
/// capture the walk state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HigherOrderKind {
    /// Transform every element
    Map,
    /// Keep elements whose predicate is truthy
    Filter,
    /// First element whose predicate is truthy, else null
    Find,
    /// True iff any predicate call is truthy
    Some,
    /// True iff every predicate call is truthy
    Every,
    /// Left fold with accumulator
    Reduce,
}

/// How a safe function executes
#[derive(Clone)]
pub enum FunctionKind {
    /// Ordinary function over already-evaluated values
    Pure(PureFn),
    /// Higher-order builtin executed by the walker
    HigherOrder(HigherOrderKind),
}

impl std::fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pure(_) => f.write_str("Pure(..)"),
            Self::HigherOrder(kind) => write!(f, "HigherOrder({kind:?})"),
        }
    }
}

/// Category a function belongs to, mirrored in docs and the CLI listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCategory {
    /// String manipulation
    String,
    /// Math namespace
    Math,
    /// Array helpers
    Array,
    /// Object namespace
    Object,
    /// JSON namespace
    Json,
    /// Type conversion
    Conversion,
    /// Date namespace
    DateTime,
    /// Caller-registered
    Custom,
}

/// A whitelisted callable reachable from expressions.
#[derive(Debug, Clone)]
pub struct SafeFunction {
    /// Name as called (qualified for namespace methods, e.g. `Math.round`)
    pub name: String,
    /// Grouping category
    pub category: FunctionCategory,
    /// Minimum argument count (method receivers count as the first argument)
    pub min_args: usize,
    /// Maximum argument count, `None` for unbounded
    pub max_args: Option<usize>,
    /// Reserved for future async sources; every builtin is synchronous
    pub is_async: bool,
    /// Execution strategy
    pub kind: FunctionKind,
}

impl SafeFunction {
    /// Define a pure function.
    pub fn pure<F>(
        name: impl Into<String>,
        category: FunctionCategory,
        min_args: usize,
        max_args: Option<usize>,
        f: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> FunctionResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            category,
            min_args,
            max_args,
            is_async: false,
            kind: FunctionKind::Pure(Arc::new(f)),
        }
    }

    /// Define a higher-order builtin.
    pub fn higher_order(
        name: impl Into<String>,
        kind: HigherOrderKind,
        min_args: usize,
        max_args: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            category: FunctionCategory::Array,
            min_args,
            max_args,
            is_async: false,
            kind: FunctionKind::HigherOrder(kind),
        }
    }

    /// Check an actual argument count against the declared arity.
    pub fn validate_arity(&self, actual: usize) -> FunctionResult<()> {
        if actual < self.min_args || self.max_args.is_some_and(|max| actual > max) {
            return Err(FunctionError::InvalidArity {
                name: self.name.clone(),
                min: self.min_args,
                max: self.max_args,
                actual,
            });
        }
        Ok(())
    }
}

/// Shorthand for the common "wrong argument type" error
pub fn argument_type_error(
    name: &str,
    index: usize,
    expected: &str,
    actual: &Value,
) -> FunctionError {
    FunctionError::InvalidArgumentType {
        name: name.to_string(),
        index,
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}
