//! Single-pass AST analysis
//!
//! One traversal computes everything the evaluator needs to know about an
//! expression before running it: which context names it depends on, which
//! functions it calls, a weighted complexity score, maximum nesting depth
//! and a heuristic memory estimate. The traversal is deterministic, so the
//! same source text always analyzes to identical results (a cache-hit must
//! never change what a parse reports).

use std::collections::{BTreeMap, BTreeSet};

use super::expression::{ExpressionNode, LiteralValue};

/// Context names an expression may depend on. Identifiers (or the base of a
/// member chain) outside this list are either arrow parameters, named
/// variables or unknowns — they are not reported as dependencies.
pub const CONTEXT_NAMES: &[&str] = &[
    "item",
    "inputs",
    "outputs",
    "node",
    "execution",
    "variables",
    "env",
];

/// Static namespaces whose methods may be called (`Math.round`,
/// `JSON.stringify`, ...). Nothing else resolves as a namespace.
pub const STATIC_NAMESPACES: &[&str] = &[
    "Object", "Math", "JSON", "Date", "Array", "Crypto", "String", "Number",
];

/// Complexity weights per node kind (a fixed heuristic, not a benchmark)
mod weight {
    pub const CALL: f64 = 3.0;
    pub const ACCESS: f64 = 1.0;
    pub const BINARY: f64 = 1.0;
    pub const CONDITIONAL: f64 = 4.0;
    pub const CONTAINER_LITERAL: f64 = 2.0;
    pub const CONTAINER_PER_ELEMENT: f64 = 0.5;
    pub const ARROW: f64 = 5.0;
    pub const DEFAULT: f64 = 0.5;
}

/// Everything a single analysis pass learns about an expression
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionAnalysis {
    /// Sorted, deduplicated context names referenced
    pub dependencies: Vec<String>,
    /// Sorted, deduplicated function names called (qualified for namespace
    /// methods, e.g. `Math.round`)
    pub functions: Vec<String>,
    /// Weighted complexity score
    pub complexity: f64,
    /// Maximum nesting depth
    pub depth: usize,
    /// Heuristic memory footprint in bytes
    pub estimated_memory_usage: usize,
    /// True iff the tree holds only identifiers, member/index access,
    /// literals and binary operators
    pub is_simple: bool,
    /// Node count per kind name (sorted for stable reporting)
    pub node_counts: BTreeMap<&'static str, usize>,
    /// Total call expressions
    pub function_calls: usize,
    /// Total member/index accesses
    pub property_accesses: usize,
}

/// Analyze an expression tree in a single traversal.
pub fn analyze(ast: &ExpressionNode) -> ExpressionAnalysis {
    let mut analyzer = Analyzer::default();
    let depth = analyzer.visit(ast);
    ExpressionAnalysis {
        dependencies: analyzer.dependencies.into_iter().collect(),
        functions: analyzer.functions.into_iter().collect(),
        complexity: analyzer.complexity,
        depth,
        estimated_memory_usage: analyzer.memory,
        is_simple: analyzer.simple,
        node_counts: analyzer.node_counts,
        function_calls: analyzer.function_calls,
        property_accesses: analyzer.property_accesses,
    }
}

struct Analyzer {
    dependencies: BTreeSet<String>,
    functions: BTreeSet<String>,
    complexity: f64,
    memory: usize,
    simple: bool,
    node_counts: BTreeMap<&'static str, usize>,
    function_calls: usize,
    property_accesses: usize,
    /// Arrow parameters in scope; shadows context names in the body
    bound: Vec<String>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            dependencies: BTreeSet::new(),
            functions: BTreeSet::new(),
            complexity: 0.0,
            memory: 0,
            simple: true,
            node_counts: BTreeMap::new(),
            function_calls: 0,
            property_accesses: 0,
            bound: Vec::new(),
        }
    }
}

impl Analyzer {
    fn count(&mut self, kind: &'static str) {
        *self.node_counts.entry(kind).or_insert(0) += 1;
    }

    /// Visit one node, returning the subtree depth.
    fn visit(&mut self, node: &ExpressionNode) -> usize {
        match node {
            ExpressionNode::Literal(lit) => {
                self.count("literal");
                self.complexity += weight::DEFAULT;
                self.memory += match lit {
                    LiteralValue::String(s) => 24 + s.len(),
                    LiteralValue::Number(_) => 16,
                    LiteralValue::Boolean(_) | LiteralValue::Null => 8,
                };
                1
            }
            ExpressionNode::Identifier(name) => {
                self.count("identifier");
                self.complexity += weight::DEFAULT;
                self.memory += 16 + name.len();
                self.record_dependency(name);
                1
            }
            ExpressionNode::Member { object, property } => {
                self.count("member");
                self.complexity += weight::ACCESS;
                self.memory += 32 + property.len();
                self.property_accesses += 1;
                1 + self.visit(object)
            }
            ExpressionNode::Index { object, index } => {
                self.count("index");
                self.complexity += weight::ACCESS;
                self.memory += 32;
                self.property_accesses += 1;
                1 + self.visit(object).max(self.visit(index))
            }
            ExpressionNode::Binary(data) => {
                self.count("binary");
                self.complexity += weight::BINARY;
                self.memory += 32;
                1 + self.visit(&data.left).max(self.visit(&data.right))
            }
            ExpressionNode::Unary { operand, .. } => {
                self.count("unary");
                self.complexity += weight::DEFAULT;
                self.memory += 16;
                self.simple = false;
                1 + self.visit(operand)
            }
            ExpressionNode::Call(data) => {
                self.count("call");
                self.complexity += weight::CALL;
                self.memory += 48;
                self.function_calls += 1;
                self.simple = false;
                self.record_call(&data.callee);

                let mut depth = self.visit_callee(&data.callee);
                for arg in &data.args {
                    depth = depth.max(self.visit(arg));
                }
                1 + depth
            }
            ExpressionNode::Conditional(data) => {
                self.count("conditional");
                self.complexity += weight::CONDITIONAL;
                self.memory += 32;
                self.simple = false;
                let depth = self
                    .visit(&data.test)
                    .max(self.visit(&data.consequent))
                    .max(self.visit(&data.alternate));
                1 + depth
            }
            ExpressionNode::Arrow(data) => {
                self.count("arrow");
                self.complexity += weight::ARROW;
                self.memory += 48;
                self.simple = false;
                let bound_before = self.bound.len();
                self.bound.extend(data.params.iter().cloned());
                let depth = self.visit(&data.body);
                self.bound.truncate(bound_before);
                1 + depth
            }
            ExpressionNode::ArrayLiteral(items) => {
                self.count("array_literal");
                self.complexity +=
                    weight::CONTAINER_LITERAL + weight::CONTAINER_PER_ELEMENT * items.len() as f64;
                self.memory += 32 + 16 * items.len();
                self.simple = false;
                let mut depth = 0;
                for item in items {
                    depth = depth.max(self.visit(item));
                }
                1 + depth
            }
            ExpressionNode::ObjectLiteral(entries) => {
                self.count("object_literal");
                self.complexity += weight::CONTAINER_LITERAL
                    + weight::CONTAINER_PER_ELEMENT * entries.len() as f64;
                self.memory += 32 + entries.iter().map(|(k, _)| 16 + k.len()).sum::<usize>();
                self.simple = false;
                let mut depth = 0;
                for (_, value) in entries {
                    depth = depth.max(self.visit(value));
                }
                1 + depth
            }
        }
    }

    fn record_dependency(&mut self, name: &str) {
        if self.bound.iter().any(|bound| bound == name) {
            return;
        }
        if CONTEXT_NAMES.contains(&name) {
            self.dependencies.insert(name.to_string());
        }
    }

    /// Record the called name: bare identifiers, `Namespace.method` for the
    /// fixed namespaces, and the method name for receiver-style calls.
    fn record_call(&mut self, callee: &ExpressionNode) {
        match callee {
            ExpressionNode::Identifier(name) => {
                self.functions.insert(name.clone());
            }
            ExpressionNode::Member { object, property } => {
                if let ExpressionNode::Identifier(ns) = object.as_ref() {
                    if STATIC_NAMESPACES.contains(&ns.as_str()) {
                        self.functions.insert(format!("{ns}.{property}"));
                        return;
                    }
                }
                self.functions.insert(property.clone());
            }
            _ => {}
        }
    }

    /// Visit a callee. A `Namespace.method` callee contributes no
    /// dependencies or access counts (the namespace name is not data);
    /// every other callee is visited normally so receiver chains still
    /// count.
    fn visit_callee(&mut self, callee: &ExpressionNode) -> usize {
        if let ExpressionNode::Member { object, .. } = callee {
            if let ExpressionNode::Identifier(ns) = object.as_ref() {
                if STATIC_NAMESPACES.contains(&ns.as_str()) {
                    return 2;
                }
            }
        }
        self.visit(callee)
    }
}
