//! Evaluation error types

use serde::Serialize;
use thiserror::Error;

use crate::registry::FunctionError;

/// Error classification carried on every failed [`super::EvaluationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Expression failed to parse
    Syntax,
    /// Expression tried to reach outside the sandbox
    Security,
    /// Expression exceeded the configured complexity or depth budget
    Complexity,
    /// Expression exceeded the wall-clock budget
    Timeout,
    /// Any other failure during the walk
    Runtime,
    /// Structural mismatch when marshalling into a target shape
    Type,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Syntax => "syntax",
            Self::Security => "security",
            Self::Complexity => "complexity",
            Self::Timeout => "timeout",
            Self::Runtime => "runtime",
            Self::Type => "type",
        };
        f.write_str(name)
    }
}

/// Errors raised while walking an expression tree.
///
/// These never cross the public API as `Err`: the evaluator folds them into
/// an [`super::EvaluationResult`] so one bad expression cannot abort a batch
/// of node executions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Callee is not a registered safe function or whitelisted namespace
    /// method
    #[error("function '{name}' is not allowed")]
    FunctionNotAllowed {
        /// The rejected call name
        name: String,
    },

    /// Callee is a computed expression, which the sandbox never resolves
    #[error("dynamic callees are not allowed")]
    DynamicCallee,

    /// Wall-clock budget exceeded mid-walk
    #[error("evaluation timed out")]
    Timeout,

    /// Arrow function used anywhere but as a higher-order function argument
    #[error("arrow functions are only allowed as arguments to {0}")]
    ArrowNotAllowed(&'static str),

    /// Higher-order function called without an arrow argument
    #[error("function '{name}' requires an arrow function argument")]
    ArrowRequired {
        /// The higher-order function name
        name: String,
    },

    /// Failure inside a safe function (arity, argument types, body)
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Unknown identifier in strict mode
    #[error("unknown identifier '{name}'")]
    UnknownIdentifier {
        /// The unresolved name
        name: String,
    },

    /// Anything else
    #[error("{message}")]
    Runtime {
        /// Underlying message
        message: String,
    },
}

impl EvalError {
    /// Classification of this error for the result taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FunctionNotAllowed { .. } | Self::DynamicCallee => ErrorKind::Security,
            Self::Timeout => ErrorKind::Timeout,
            Self::ArrowNotAllowed(_)
            | Self::ArrowRequired { .. }
            | Self::Function(_)
            | Self::UnknownIdentifier { .. }
            | Self::Runtime { .. } => ErrorKind::Runtime,
        }
    }
}
