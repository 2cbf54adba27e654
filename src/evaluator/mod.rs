//! Sandboxed expression evaluation
//!
//! The evaluator parses through a shared cache, gates on complexity and
//! depth before anything runs, then walks the tree with a cooperative
//! deadline. Failures never cross the public API as `Err` — every outcome
//! is an [`EvaluationResult`] so one bad expression in a batch cannot abort
//! its neighbours.

pub mod error;
mod walk;

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

pub use error::{ErrorKind, EvalError};

use crate::model::Value;
use crate::parser::{CacheStats, ComplexityReport, ExpressionParser, ParseCache, ParsedExpression};
use crate::registry::{FunctionRegistry, SafeFunction};

/// Input data visible to one evaluation. Built fresh per call; evaluation
/// never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ExpressionContext {
    /// The current item, reachable as `item`
    pub item: Value,
    /// Named variables, reachable bare by name
    pub variables: FxHashMap<String, Value>,
}

impl ExpressionContext {
    /// Context with only an item.
    pub fn with_item(item: impl Into<Value>) -> Self {
        Self {
            item: item.into(),
            variables: FxHashMap::default(),
        }
    }

    /// Add a named variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }
}

/// Evaluator configuration.
#[derive(Debug, Clone)]
pub struct EvaluatorOptions {
    /// Reject expressions whose weighted complexity exceeds this
    pub max_complexity: f64,
    /// Reject expressions nested deeper than this
    pub max_depth: usize,
    /// Emit debug-level traces of gate decisions and cache behaviour
    pub enable_debugging: bool,
    /// Unknown identifiers become runtime errors instead of null
    pub strict_mode: bool,
    /// Wall-clock budget per evaluation
    pub timeout: Duration,
    /// Share parsed expressions across evaluations
    pub enable_caching: bool,
    /// Parse cache capacity (distinct expression strings)
    pub max_cache_size: usize,
    /// Attach [`EvaluationMetadata`] to successful results
    pub collect_metrics: bool,
    /// Extra functions merged into the standard registry. Re-registering a
    /// builtin name replaces it.
    pub custom_functions: Vec<SafeFunction>,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_complexity: 1000.0,
            max_depth: 50,
            enable_debugging: false,
            strict_mode: false,
            timeout: Duration::from_secs(1),
            enable_caching: true,
            max_cache_size: 1000,
            collect_metrics: false,
            custom_functions: Vec::new(),
        }
    }
}

impl EvaluatorOptions {
    pub fn with_max_complexity(mut self, max_complexity: f64) -> Self {
        self.max_complexity = max_complexity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn with_caching(mut self, enable_caching: bool) -> Self {
        self.enable_caching = enable_caching;
        self
    }

    pub fn with_max_cache_size(mut self, max_cache_size: usize) -> Self {
        self.max_cache_size = max_cache_size;
        self
    }

    pub fn with_metrics(mut self, collect_metrics: bool) -> Self {
        self.collect_metrics = collect_metrics;
        self
    }

    pub fn with_debugging(mut self, enable_debugging: bool) -> Self {
        self.enable_debugging = enable_debugging;
        self
    }

    pub fn with_function(mut self, function: SafeFunction) -> Self {
        self.custom_functions.push(function);
        self
    }
}

/// Per-evaluation measurements, attached when `collect_metrics` is on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMetadata {
    /// Wall-clock time for parse + walk
    pub execution_time_micros: u128,
    /// Weighted complexity of the expression
    pub complexity: f64,
    /// Context names the expression referenced
    pub accessed_variables: Vec<String>,
    /// Function names the expression called
    pub called_functions: Vec<String>,
    /// Heuristic memory footprint in bytes
    pub estimated_memory_usage: usize,
}

/// Outcome of one evaluation. `success` is the discriminant: on failure
/// `value` is null and `error`/`error_kind` are populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub success: bool,
    pub value: Value,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EvaluationMetadata>,
}

impl EvaluationResult {
    fn ok(value: Value, metadata: Option<EvaluationMetadata>) -> Self {
        Self {
            success: true,
            value,
            error: None,
            error_kind: None,
            metadata,
        }
    }

    fn fail(kind: ErrorKind, message: String) -> Self {
        Self {
            success: false,
            value: Value::Null,
            error: Some(message),
            error_kind: Some(kind),
            metadata: None,
        }
    }
}

/// Sandboxed expression evaluator.
///
/// `Send + Sync`: the registry and parse cache are `Arc`-shared and parsed
/// expressions are immutable, so one evaluator can serve many threads.
/// Evaluation itself is synchronous; callers own concurrency.
#[derive(Debug)]
pub struct Evaluator {
    options: EvaluatorOptions,
    registry: Arc<FunctionRegistry>,
    parser: ExpressionParser,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorOptions::default())
    }
}

impl Evaluator {
    pub fn new(mut options: EvaluatorOptions) -> Self {
        let mut registry = FunctionRegistry::standard();
        for function in options.custom_functions.drain(..) {
            registry.register(function);
        }
        let parser = if options.enable_caching && options.max_cache_size > 0 {
            ExpressionParser::with_cache(Arc::new(ParseCache::new(options.max_cache_size)))
        } else {
            ExpressionParser::uncached()
        };
        Self {
            options,
            registry: Arc::new(registry),
            parser,
        }
    }

    /// The active configuration.
    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// The function registry this evaluator dispatches through.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Evaluate one expression against a context.
    pub fn evaluate(&self, source: &str, context: &ExpressionContext) -> EvaluationResult {
        let started = Instant::now();

        let parsed = match self.parser.parse(source) {
            Ok(parsed) => parsed,
            Err(err) => {
                if self.options.enable_debugging {
                    debug!("parse failed for {source:?}: {err}");
                }
                return EvaluationResult::fail(ErrorKind::Syntax, err.to_string());
            }
        };

        if let Some(result) = self.check_budget(&parsed) {
            return result;
        }

        let mut walker = walk::Walker::new(
            context,
            &self.registry,
            Some(started + self.options.timeout),
            self.options.strict_mode,
        );
        match walker.evaluate(&parsed.ast) {
            Ok(value) => {
                let metadata = self.options.collect_metrics.then(|| EvaluationMetadata {
                    execution_time_micros: started.elapsed().as_micros(),
                    complexity: parsed.complexity(),
                    accessed_variables: parsed.dependencies().to_vec(),
                    called_functions: parsed.functions().to_vec(),
                    estimated_memory_usage: parsed.estimated_memory_usage(),
                });
                EvaluationResult::ok(value, metadata)
            }
            Err(err) => {
                if self.options.enable_debugging {
                    debug!("evaluation failed for {source:?}: {err}");
                }
                EvaluationResult::fail(err.kind(), err.to_string())
            }
        }
    }

    fn check_budget(&self, parsed: &ParsedExpression) -> Option<EvaluationResult> {
        if parsed.complexity() > self.options.max_complexity {
            if self.options.enable_debugging {
                debug!(
                    "complexity gate: {} > {}",
                    parsed.complexity(),
                    self.options.max_complexity
                );
            }
            return Some(EvaluationResult::fail(
                ErrorKind::Complexity,
                format!(
                    "expression complexity {} exceeds the limit of {}",
                    parsed.complexity(),
                    self.options.max_complexity
                ),
            ));
        }
        if parsed.depth() > self.options.max_depth {
            if self.options.enable_debugging {
                debug!(
                    "depth gate: {} > {}",
                    parsed.depth(),
                    self.options.max_depth
                );
            }
            return Some(EvaluationResult::fail(
                ErrorKind::Complexity,
                format!(
                    "expression depth {} exceeds the limit of {}",
                    parsed.depth(),
                    self.options.max_depth
                ),
            ));
        }
        None
    }

    /// Complexity breakdown for an expression, without evaluating it.
    pub fn analyze_complexity(
        &self,
        source: &str,
    ) -> Result<ComplexityReport, crate::parser::ParseError> {
        self.parser.analyze_complexity(source)
    }

    /// Parse cache counters, when caching is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.parser.cache_stats()
    }
}
