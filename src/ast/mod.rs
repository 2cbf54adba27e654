//! Expression AST and single-pass analysis

pub mod analysis;
pub mod expression;

pub use analysis::{CONTEXT_NAMES, ExpressionAnalysis, STATIC_NAMESPACES, analyze};
pub use expression::{
    ArrowData, BinaryOpData, BinaryOperator, CallData, ConditionalData, ExpressionNode,
    LiteralValue, UnaryOperator,
};
