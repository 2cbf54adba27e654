//! # flowexpr
//!
//! Sandboxed evaluation of JavaScript-style template expressions for
//! workflow configuration, without embedding a JavaScript engine.
//!
//! Expressions like `item.count > 10` or `Hello {{ item.name }}!` are
//! parsed by a hand-written Pratt parser, gated on complexity, depth and a
//! wall-clock budget, and executed by a tree-walking interpreter that can
//! only reach a whitelist of registered functions. Coercions follow
//! ECMAScript ToString / ToNumber / ToBoolean semantics so values behave
//! the way template authors expect.
//!
//! ```
//! use flowexpr::{Evaluator, EvaluatorOptions, ExpressionContext, Value};
//!
//! let evaluator = Evaluator::new(EvaluatorOptions::default());
//! let mut ctx = ExpressionContext::with_item(Value::from(serde_json::json!({
//!     "price": 10.0,
//! })));
//! ctx.set_variable("rate", 1.2);
//!
//! let result = evaluator.evaluate("Math.round(item.price * rate)", &ctx);
//! assert!(result.success);
//! assert_eq!(result.value, Value::Number(12.0));
//! ```
//!
//! Binding substitutes `{{ ... }}` spans into whole settings structures:
//! a string that is exactly one template keeps the evaluated value's
//! native type, mixed text interpolates.
//!
//! ```
//! use std::sync::Arc;
//! use flowexpr::{Binder, Evaluator};
//! use serde_json::json;
//!
//! let binder = Binder::new(Arc::new(Evaluator::default()));
//! let item = json!({"name": "Ada", "count": 3});
//! let bound = binder
//!     .bind_value(&item, &json!({"greeting": "Hello {{item.name}}!", "max": "{{item.count * 2}}"}))
//!     .unwrap();
//! assert_eq!(bound, json!({"greeting": "Hello Ada!", "max": 6}));
//! ```

pub mod ast;
pub mod binder;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod registry;
pub mod template;

pub use ast::{CONTEXT_NAMES, ExpressionAnalysis, STATIC_NAMESPACES};
pub use binder::{BindError, Binder};
pub use evaluator::{
    ErrorKind, EvaluationMetadata, EvaluationResult, Evaluator, EvaluatorOptions,
    ExpressionContext,
};
pub use model::{PathSegment, Value, build_path, parse_path};
pub use parser::{
    CacheStats, ComplexityReport, ExpressionParser, ParseCache, ParseError, ParsedExpression,
    parse_expression,
};
pub use registry::{FunctionCategory, FunctionError, FunctionRegistry, SafeFunction};
pub use template::{TemplateMatch, extract_template_expressions, has_template_expressions};
