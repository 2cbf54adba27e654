//! Expression parsing: tokenizer, Pratt parser, analysis and parse cache

pub mod cache;
pub mod error;
pub mod pratt;
pub mod tokenizer;

use std::sync::Arc;

use crate::ast::{self, ExpressionAnalysis, ExpressionNode};
use crate::template;

pub use cache::{CacheStats, ParseCache};
pub use error::{ParseError, ParseResult};

/// Immutable analyzed form of one expression string.
///
/// Created once per distinct source text, shared read-only through the parse
/// cache. Never mutated after construction — that invariant is what lets
/// concurrent evaluations reuse cached parses without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    /// The parse tree
    pub ast: ExpressionNode,
    /// Everything the single analysis pass computed
    pub analysis: ExpressionAnalysis,
    /// Whether the raw source itself contains `{{ ... }}` markers
    pub has_templates: bool,
}

impl ParsedExpression {
    /// Context names the expression references
    pub fn dependencies(&self) -> &[String] {
        &self.analysis.dependencies
    }

    /// Function names the expression calls
    pub fn functions(&self) -> &[String] {
        &self.analysis.functions
    }

    /// Weighted complexity score
    pub fn complexity(&self) -> f64 {
        self.analysis.complexity
    }

    /// Maximum nesting depth
    pub fn depth(&self) -> usize {
        self.analysis.depth
    }

    /// True iff the tree contains only identifiers, member/index access,
    /// literals and binary operators
    pub fn is_simple(&self) -> bool {
        self.analysis.is_simple
    }

    /// Heuristic memory footprint in bytes
    pub fn estimated_memory_usage(&self) -> usize {
        self.analysis.estimated_memory_usage
    }
}

/// Complexity breakdown for tooling and inspection (not used by execution)
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityReport {
    /// Total weighted complexity
    pub complexity: f64,
    /// Node count per kind
    pub node_counts: std::collections::BTreeMap<&'static str, usize>,
    /// Call expression count
    pub function_calls: usize,
    /// Member/index access count
    pub property_accesses: usize,
    /// Maximum nesting depth
    pub max_depth: usize,
    /// Rough execution-time estimate in milliseconds
    pub estimated_execution_time_ms: f64,
}

impl From<&ExpressionAnalysis> for ComplexityReport {
    fn from(analysis: &ExpressionAnalysis) -> Self {
        Self {
            complexity: analysis.complexity,
            node_counts: analysis.node_counts.clone(),
            function_calls: analysis.function_calls,
            property_accesses: analysis.property_accesses,
            max_depth: analysis.depth,
            estimated_execution_time_ms: (analysis.complexity * 0.05).max(0.1),
        }
    }
}

/// Parse plus analyze, without any caching. Used by the cache on miss and
/// directly by one-shot callers.
pub(crate) fn parse_source_to_parsed(source: &str) -> Result<ParsedExpression, ParseError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let ast = pratt::parse_source(trimmed)?;
    let analysis = ast::analyze(&ast);
    Ok(ParsedExpression {
        ast,
        analysis,
        has_templates: template::has_template_expressions(source),
    })
}

/// Parse a single expression without a cache.
pub fn parse_expression(source: &str) -> Result<Arc<ParsedExpression>, ParseError> {
    parse_source_to_parsed(source).map(Arc::new)
}

/// Parser front-end with an optional shared cache.
#[derive(Debug)]
pub struct ExpressionParser {
    cache: Option<Arc<ParseCache>>,
}

impl ExpressionParser {
    /// Parser backed by a shared cache.
    pub fn with_cache(cache: Arc<ParseCache>) -> Self {
        Self { cache: Some(cache) }
    }

    /// Parser that re-parses every call.
    pub fn uncached() -> Self {
        Self { cache: None }
    }

    /// Parse `source`, consulting the cache when one is configured. The
    /// cache key is the trimmed source text.
    pub fn parse(&self, source: &str) -> Result<Arc<ParsedExpression>, ParseError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyExpression);
        }
        match &self.cache {
            Some(cache) => cache.get_or_parse(trimmed, parse_source_to_parsed),
            None => parse_expression(trimmed),
        }
    }

    /// Complexity breakdown for an expression, via the cache.
    pub fn analyze_complexity(&self, source: &str) -> Result<ComplexityReport, ParseError> {
        let parsed = self.parse(source)?;
        Ok(ComplexityReport::from(&parsed.analysis))
    }

    /// Cache counters, when caching is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }
}
