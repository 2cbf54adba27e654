//! Tree-walking interpreter
//!
//! Left-to-right, depth-first, with a cooperative deadline check at every
//! node entry so a runaway expression is interruptible at the timeout
//! boundary rather than only at entry. Short-circuit operators and the
//! ternary never evaluate the untaken branch.

use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;

use super::ExpressionContext;
use super::error::EvalError;
use crate::ast::{
    ArrowData, BinaryOperator, CallData, ExpressionNode, LiteralValue, STATIC_NAMESPACES,
    UnaryOperator,
};
use crate::model::{self, Value};
use crate::registry::{
    FunctionKind, FunctionRegistry, HigherOrderKind, SafeFunction, argument_type_error,
};

pub(super) struct Walker<'a> {
    context: &'a ExpressionContext,
    registry: &'a FunctionRegistry,
    deadline: Option<Instant>,
    strict: bool,
    /// Arrow-parameter scopes, innermost last
    scopes: Vec<FxHashMap<String, Value>>,
}

impl<'a> Walker<'a> {
    pub(super) fn new(
        context: &'a ExpressionContext,
        registry: &'a FunctionRegistry,
        deadline: Option<Instant>,
        strict: bool,
    ) -> Self {
        Self {
            context,
            registry,
            deadline,
            strict,
            scopes: Vec::new(),
        }
    }

    pub(super) fn evaluate(&mut self, node: &ExpressionNode) -> Result<Value, EvalError> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(EvalError::Timeout);
            }
        }

        match node {
            ExpressionNode::Literal(literal) => Ok(match literal {
                LiteralValue::Null => Value::Null,
                LiteralValue::Boolean(b) => Value::Bool(*b),
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::String(s.clone()),
            }),
            ExpressionNode::Identifier(name) => self.resolve_identifier(name),
            ExpressionNode::Member { object, property } => {
                let object = self.evaluate(object)?;
                Ok(object.get_property(property))
            }
            ExpressionNode::Index { object, index } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                Ok(index_access(&object, &index))
            }
            ExpressionNode::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                Ok(apply_unary(*op, &operand))
            }
            ExpressionNode::Binary(data) => self.evaluate_binary(data.op, &data.left, &data.right),
            ExpressionNode::Conditional(data) => {
                // Exactly one branch runs
                let test = self.evaluate(&data.test)?;
                if model::to_boolean(&test) {
                    self.evaluate(&data.consequent)
                } else {
                    self.evaluate(&data.alternate)
                }
            }
            ExpressionNode::Call(data) => self.evaluate_call(data),
            ExpressionNode::Arrow(_) => {
                Err(EvalError::ArrowNotAllowed("higher-order functions"))
            }
            ExpressionNode::ArrayLiteral(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.evaluate(item)?);
                }
                Ok(Value::Array(out))
            }
            ExpressionNode::ObjectLiteral(entries) => {
                let mut map = indexmap::IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), self.evaluate(value)?);
                }
                Ok(Value::Object(map))
            }
        }
    }

    fn resolve_identifier(&mut self, name: &str) -> Result<Value, EvalError> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Ok(value.clone());
            }
        }
        if name == "item" {
            return Ok(self.context.item.clone());
        }
        if let Some(value) = self.context.variables.get(name) {
            return Ok(value.clone());
        }
        if self.strict {
            return Err(EvalError::UnknownIdentifier {
                name: name.to_string(),
            });
        }
        Ok(Value::Null)
    }

    fn evaluate_binary(
        &mut self,
        op: BinaryOperator,
        left: &ExpressionNode,
        right: &ExpressionNode,
    ) -> Result<Value, EvalError> {
        let left = self.evaluate(left)?;

        // Short-circuit forms return the deciding operand unchanged
        match op {
            BinaryOperator::And => {
                return if model::to_boolean(&left) {
                    self.evaluate(right)
                } else {
                    Ok(left)
                };
            }
            BinaryOperator::Or => {
                return if model::to_boolean(&left) {
                    Ok(left)
                } else {
                    self.evaluate(right)
                };
            }
            BinaryOperator::NullishCoalesce => {
                return if left.is_null() {
                    self.evaluate(right)
                } else {
                    Ok(left)
                };
            }
            _ => {}
        }

        let right = self.evaluate(right)?;
        Ok(apply_binary(op, &left, &right))
    }

    fn evaluate_call(&mut self, data: &CallData) -> Result<Value, EvalError> {
        let (function, receiver) = self.resolve_callee(&data.callee)?;

        match &function.kind {
            FunctionKind::Pure(f) => {
                let mut args = Vec::with_capacity(data.args.len() + 1);
                if let Some(receiver) = receiver {
                    args.push(receiver);
                }
                for arg in &data.args {
                    if matches!(arg, ExpressionNode::Arrow(_)) {
                        return Err(EvalError::ArrowNotAllowed("higher-order functions"));
                    }
                    args.push(self.evaluate(arg)?);
                }
                function.validate_arity(args.len())?;
                Ok(f(&args)?)
            }
            FunctionKind::HigherOrder(kind) => {
                self.evaluate_higher_order(&function, *kind, receiver, &data.args)
            }
        }
    }

    /// Resolve a callee into a registered function, plus the evaluated
    /// receiver for method-style calls. This is the sandboxing boundary:
    /// everything unresolved is a security error, before anything runs.
    fn resolve_callee(
        &mut self,
        callee: &ExpressionNode,
    ) -> Result<(Arc<SafeFunction>, Option<Value>), EvalError> {
        match callee {
            ExpressionNode::Identifier(name) => {
                let function = self
                    .registry
                    .get(name)
                    .ok_or_else(|| EvalError::FunctionNotAllowed { name: name.clone() })?;
                Ok((Arc::clone(function), None))
            }
            ExpressionNode::Member { object, property } => {
                if let ExpressionNode::Identifier(namespace) = object.as_ref() {
                    if STATIC_NAMESPACES.contains(&namespace.as_str()) {
                        let qualified = format!("{namespace}.{property}");
                        let function = self.registry.get(&qualified).ok_or(
                            EvalError::FunctionNotAllowed { name: qualified },
                        )?;
                        return Ok((Arc::clone(function), None));
                    }
                }
                // Method call: the receiver becomes the first argument
                let receiver = self.evaluate(object)?;
                let function = self.registry.get(property).ok_or_else(|| {
                    EvalError::FunctionNotAllowed {
                        name: property.clone(),
                    }
                })?;
                Ok((Arc::clone(function), Some(receiver)))
            }
            _ => Err(EvalError::DynamicCallee),
        }
    }

    fn evaluate_higher_order(
        &mut self,
        function: &SafeFunction,
        kind: HigherOrderKind,
        receiver: Option<Value>,
        args: &[ExpressionNode],
    ) -> Result<Value, EvalError> {
        let effective_len = args.len() + usize::from(receiver.is_some());
        function.validate_arity(effective_len)?;

        // Effective argument 0 is the subject array; the arrow and any
        // extras follow.
        let mut nodes = args.iter();
        let subject = match receiver {
            Some(value) => value,
            None => {
                let node = nodes.next().ok_or_else(|| EvalError::ArrowRequired {
                    name: function.name.clone(),
                })?;
                self.evaluate(node)?
            }
        };
        let items = match subject {
            Value::Array(items) => items,
            other => {
                return Err(argument_type_error(&function.name, 0, "array", &other).into());
            }
        };

        let arrow = match nodes.next() {
            Some(ExpressionNode::Arrow(data)) => data,
            _ => {
                return Err(EvalError::ArrowRequired {
                    name: function.name.clone(),
                });
            }
        };

        match kind {
            HigherOrderKind::Map => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(self.call_arrow(arrow, &[item.clone(), Value::from(index as i64)])?);
                }
                Ok(Value::Array(out))
            }
            HigherOrderKind::Filter => {
                let mut out = Vec::new();
                for (index, item) in items.iter().enumerate() {
                    let keep =
                        self.call_arrow(arrow, &[item.clone(), Value::from(index as i64)])?;
                    if model::to_boolean(&keep) {
                        out.push(item.clone());
                    }
                }
                Ok(Value::Array(out))
            }
            HigherOrderKind::Find => {
                for (index, item) in items.iter().enumerate() {
                    let hit =
                        self.call_arrow(arrow, &[item.clone(), Value::from(index as i64)])?;
                    if model::to_boolean(&hit) {
                        return Ok(item.clone());
                    }
                }
                Ok(Value::Null)
            }
            HigherOrderKind::Some => {
                for (index, item) in items.iter().enumerate() {
                    let hit =
                        self.call_arrow(arrow, &[item.clone(), Value::from(index as i64)])?;
                    if model::to_boolean(&hit) {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            HigherOrderKind::Every => {
                for (index, item) in items.iter().enumerate() {
                    let hit =
                        self.call_arrow(arrow, &[item.clone(), Value::from(index as i64)])?;
                    if !model::to_boolean(&hit) {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            HigherOrderKind::Reduce => {
                let mut accumulator = match nodes.next() {
                    Some(node) => self.evaluate(node)?,
                    None => Value::Null,
                };
                for (index, item) in items.iter().enumerate() {
                    accumulator = self.call_arrow(
                        arrow,
                        &[accumulator, item.clone(), Value::from(index as i64)],
                    )?;
                }
                Ok(accumulator)
            }
        }
    }

    /// Bind positional parameters into a fresh child scope and evaluate the
    /// arrow body. Unbound trailing parameters resolve to null.
    fn call_arrow(&mut self, arrow: &ArrowData, args: &[Value]) -> Result<Value, EvalError> {
        let mut scope = FxHashMap::default();
        for (position, name) in arrow.params.iter().enumerate() {
            scope.insert(
                name.clone(),
                args.get(position).cloned().unwrap_or(Value::Null),
            );
        }
        self.scopes.push(scope);
        let result = self.evaluate(&arrow.body);
        self.scopes.pop();
        result
    }
}

fn index_access(object: &Value, index: &Value) -> Value {
    match object {
        Value::Array(items) => {
            let position = model::to_array_index(index);
            if position == model::NOT_AN_INDEX {
                return Value::Null;
            }
            items.get(position as usize).cloned().unwrap_or(Value::Null)
        }
        Value::Object(map) => {
            let key = model::to_string_value(index);
            map.get(&key).cloned().unwrap_or(Value::Null)
        }
        Value::String(s) => {
            let position = model::to_array_index(index);
            if position == model::NOT_AN_INDEX {
                return Value::Null;
            }
            s.chars()
                .nth(position as usize)
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

fn apply_unary(op: UnaryOperator, operand: &Value) -> Value {
    match op {
        UnaryOperator::Not => Value::Bool(!model::to_boolean(operand)),
        UnaryOperator::Negate => Value::Number(-model::to_number(operand)),
        UnaryOperator::Plus => Value::Number(model::to_number(operand)),
        UnaryOperator::TypeOf => Value::String(
            match operand {
                Value::Null => "undefined",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) | Value::Object(_) => "object",
            }
            .to_string(),
        ),
    }
}

fn apply_binary(op: BinaryOperator, left: &Value, right: &Value) -> Value {
    use BinaryOperator::*;
    match op {
        Add => {
            // String concatenation wins when either side is a string
            if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                Value::String(format!(
                    "{}{}",
                    model::to_string_value(left),
                    model::to_string_value(right)
                ))
            } else {
                Value::Number(model::to_number(left) + model::to_number(right))
            }
        }
        Subtract => Value::Number(model::to_number(left) - model::to_number(right)),
        Multiply => Value::Number(model::to_number(left) * model::to_number(right)),
        Divide => Value::Number(model::to_number(left) / model::to_number(right)),
        Modulo => Value::Number(model::to_number(left) % model::to_number(right)),
        Power => Value::Number(model::to_number(left).powf(model::to_number(right))),
        Equal => Value::Bool(model::loose_equals(left, right)),
        NotEqual => Value::Bool(!model::loose_equals(left, right)),
        StrictEqual => Value::Bool(model::strict_equals(left, right)),
        StrictNotEqual => Value::Bool(!model::strict_equals(left, right)),
        LessThan => Value::Bool(matches!(
            model::compare(left, right),
            Some(std::cmp::Ordering::Less)
        )),
        LessThanOrEqual => Value::Bool(matches!(
            model::compare(left, right),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        )),
        GreaterThan => Value::Bool(matches!(
            model::compare(left, right),
            Some(std::cmp::Ordering::Greater)
        )),
        GreaterThanOrEqual => Value::Bool(matches!(
            model::compare(left, right),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        )),
        // Short-circuit forms are handled before operand evaluation
        And | Or | NullishCoalesce => unreachable!("short-circuit ops handled by the walker"),
    }
}
