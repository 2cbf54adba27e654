//! Expression AST node definitions
//!
//! Large variants are boxed to keep the enum small; call arguments use
//! `SmallVec` for the common case of a handful of arguments.

use smallvec::SmallVec;

/// AST representation of a parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Literal value (number, string, boolean, null)
    Literal(LiteralValue),

    /// Bare identifier (context name, variable, arrow parameter)
    Identifier(String),

    /// Property access (`object.property`)
    Member {
        /// Base expression
        object: Box<ExpressionNode>,
        /// Property name
        property: String,
    },

    /// Computed access (`object[index]`)
    Index {
        /// Base expression
        object: Box<ExpressionNode>,
        /// Index expression
        index: Box<ExpressionNode>,
    },

    /// Binary operation (boxed for size)
    Binary(Box<BinaryOpData>),

    /// Unary operation
    Unary {
        /// The operator
        op: UnaryOperator,
        /// The operand
        operand: Box<ExpressionNode>,
    },

    /// Call expression (boxed for size)
    Call(Box<CallData>),

    /// Ternary conditional (boxed for size)
    Conditional(Box<ConditionalData>),

    /// Arrow function (boxed for size) — only legal as an argument to a
    /// higher-order safe function
    Arrow(Box<ArrowData>),

    /// Array literal (`[a, b, c]`)
    ArrayLiteral(Vec<ExpressionNode>),

    /// Object literal (`{key: value}`) with stable entry order
    ObjectLiteral(Vec<(String, ExpressionNode)>),
}

/// Binary operators of the expression subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+` — numeric addition or string concatenation
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `**` (right associative)
    Power,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `&&` (short-circuit)
    And,
    /// `||` (short-circuit)
    Or,
    /// `??` (short-circuit)
    NullishCoalesce,
}

impl BinaryOperator {
    /// Operator spelling as written in source
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "**",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::StrictEqual => "===",
            Self::StrictNotEqual => "!==",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::NullishCoalesce => "??",
        }
    }

    /// Whether this operator short-circuits its right operand
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::NullishCoalesce)
    }
}

/// Unary operators of the expression subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `-`
    Negate,
    /// `+` (ToNumber coercion)
    Plus,
    /// `typeof`
    TypeOf,
}

/// Binary operation payload
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: ExpressionNode,
    /// Right operand
    pub right: ExpressionNode,
}

/// Call payload. The callee stays a full expression; the evaluator decides
/// whether it is a bare function, a namespace method or a method call on a
/// receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct CallData {
    /// Callee expression
    pub callee: ExpressionNode,
    /// Arguments in source order
    pub args: SmallVec<[ExpressionNode; 4]>,
}

/// Ternary conditional payload
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalData {
    /// Test expression
    pub test: ExpressionNode,
    /// Branch taken when the test is truthy
    pub consequent: ExpressionNode,
    /// Branch taken when the test is falsy
    pub alternate: ExpressionNode,
}

/// Arrow function payload (expression body only)
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowData {
    /// Parameter names
    pub params: SmallVec<[String; 2]>,
    /// Body expression
    pub body: ExpressionNode,
}

/// Literal values of the expression subset
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `null` or `undefined`
    Null,
    /// Boolean literal
    Boolean(bool),
    /// Number literal
    Number(f64),
    /// String literal (quotes and escapes already resolved)
    String(String),
}

impl ExpressionNode {
    /// Create a literal node
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create an identifier node
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a member-access node
    pub fn member(object: ExpressionNode, property: impl Into<String>) -> Self {
        Self::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// Create an index-access node
    pub fn index(object: ExpressionNode, index: ExpressionNode) -> Self {
        Self::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    /// Create a binary-operation node
    pub fn binary(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::Binary(Box::new(BinaryOpData { op, left, right }))
    }

    /// Create a call node
    pub fn call(callee: ExpressionNode, args: impl Into<SmallVec<[ExpressionNode; 4]>>) -> Self {
        Self::Call(Box::new(CallData {
            callee,
            args: args.into(),
        }))
    }

    /// Create a conditional node
    pub fn conditional(
        test: ExpressionNode,
        consequent: ExpressionNode,
        alternate: ExpressionNode,
    ) -> Self {
        Self::Conditional(Box::new(ConditionalData {
            test,
            consequent,
            alternate,
        }))
    }

    /// Create an arrow-function node
    pub fn arrow(params: impl Into<SmallVec<[String; 2]>>, body: ExpressionNode) -> Self {
        Self::Arrow(Box::new(ArrowData {
            params: params.into(),
            body,
        }))
    }

    /// Root identifier of a member/index chain, if the chain bottoms out in
    /// one (`item.user.name` → `item`; `items[0].id` → `items`).
    pub fn base_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            Self::Member { object, .. } => object.base_identifier(),
            Self::Index { object, .. } => object.base_identifier(),
            _ => None,
        }
    }
}
