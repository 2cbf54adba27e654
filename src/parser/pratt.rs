//! Pratt parser for the expression language
//!
//! Parses exactly one expression; trailing tokens are rejected, which is
//! what keeps multi-statement input and declarations out of the language.
//! Precedence climbs through a small table, with `**` right-associative and
//! postfix member/index/call binding tightest.

use smallvec::SmallVec;

use super::error::{ParseError, ParseResult};
use super::tokenizer::{SpannedToken, Token, tokenize};
use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, UnaryOperator};

/// Operator precedence levels (higher binds tighter)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Nullish = 1,
    Or = 2,
    And = 3,
    Equality = 4,
    Relational = 5,
    Additive = 6,
    Multiplicative = 7,
    Exponent = 8,
}

fn binary_precedence(token: &Token) -> Option<(BinaryOperator, Precedence)> {
    let entry = match token {
        Token::QuestionQuestion => (BinaryOperator::NullishCoalesce, Precedence::Nullish),
        Token::PipePipe => (BinaryOperator::Or, Precedence::Or),
        Token::AmpAmp => (BinaryOperator::And, Precedence::And),
        Token::EqEq => (BinaryOperator::Equal, Precedence::Equality),
        Token::NotEq => (BinaryOperator::NotEqual, Precedence::Equality),
        Token::EqEqEq => (BinaryOperator::StrictEqual, Precedence::Equality),
        Token::NotEqEq => (BinaryOperator::StrictNotEqual, Precedence::Equality),
        Token::Lt => (BinaryOperator::LessThan, Precedence::Relational),
        Token::Le => (BinaryOperator::LessThanOrEqual, Precedence::Relational),
        Token::Gt => (BinaryOperator::GreaterThan, Precedence::Relational),
        Token::Ge => (BinaryOperator::GreaterThanOrEqual, Precedence::Relational),
        Token::Plus => (BinaryOperator::Add, Precedence::Additive),
        Token::Minus => (BinaryOperator::Subtract, Precedence::Additive),
        Token::Star => (BinaryOperator::Multiply, Precedence::Multiplicative),
        Token::Slash => (BinaryOperator::Divide, Precedence::Multiplicative),
        Token::Percent => (BinaryOperator::Modulo, Precedence::Multiplicative),
        Token::StarStar => (BinaryOperator::Power, Precedence::Exponent),
        _ => return None,
    };
    Some(entry)
}

/// Parse a source string into a single expression tree.
pub fn parse_source(source: &str) -> ParseResult<ExpressionNode> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, position: 0 };
    let expression = parser.parse_expression()?;
    if let Some(extra) = parser.peek() {
        return Err(ParseError::TrailingTokens {
            token: extra.token.describe(),
            position: extra.start,
        });
    }
    Ok(expression)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.position + n)
    }

    fn advance(&mut self) -> ParseResult<SpannedToken> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or(ParseError::UnexpectedEof)?;
        self.position += 1;
        Ok(token)
    }

    fn consume_if(&mut self, expected: &Token) -> bool {
        if matches!(self.peek(), Some(t) if &t.token == expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        match self.peek() {
            Some(t) if t.token == expected => {
                self.position += 1;
                Ok(())
            }
            Some(t) => Err(ParseError::UnexpectedToken {
                token: t.token.describe(),
                position: t.start,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Full expression: arrow functions first (lowest precedence), then the
    /// ternary conditional, then binary precedence climbing.
    fn parse_expression(&mut self) -> ParseResult<ExpressionNode> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        self.parse_conditional()
    }

    /// `x => body` or `(a, b) => body`, detected by lookahead.
    fn try_parse_arrow(&mut self) -> ParseResult<Option<ExpressionNode>> {
        // Single bare parameter
        if let (Some(first), Some(second)) = (self.peek(), self.peek_ahead(1)) {
            if matches!(first.token, Token::Identifier(_)) && second.token == Token::Arrow {
                let name = match self.advance()?.token {
                    Token::Identifier(name) => name,
                    _ => unreachable!(),
                };
                self.expect(Token::Arrow)?;
                let body = self.parse_expression()?;
                let params: SmallVec<[String; 2]> = std::iter::once(name).collect();
                return Ok(Some(ExpressionNode::arrow(params, body)));
            }
        }

        // Parenthesized parameter list: scan to the matching paren and check
        // for `=>` before committing
        if matches!(self.peek(), Some(t) if t.token == Token::LeftParen) {
            let mut depth = 0usize;
            let mut offset = 0usize;
            let close = loop {
                match self.peek_ahead(offset) {
                    Some(t) if t.token == Token::LeftParen => depth += 1,
                    Some(t) if t.token == Token::RightParen => {
                        depth -= 1;
                        if depth == 0 {
                            break offset;
                        }
                    }
                    Some(_) => {}
                    None => return Ok(None),
                }
                offset += 1;
            };
            if matches!(self.peek_ahead(close + 1), Some(t) if t.token == Token::Arrow) {
                let open = self.advance()?; // (
                let mut params: SmallVec<[String; 2]> = SmallVec::new();
                while !self.consume_if(&Token::RightParen) {
                    match self.advance()?.token {
                        Token::Identifier(name) => params.push(name),
                        _ => {
                            return Err(ParseError::InvalidArrowParams {
                                position: open.start,
                            });
                        }
                    }
                    if !self.consume_if(&Token::Comma) {
                        self.expect(Token::RightParen)?;
                        break;
                    }
                }
                self.expect(Token::Arrow)?;
                let body = self.parse_expression()?;
                return Ok(Some(ExpressionNode::arrow(params, body)));
            }
        }

        Ok(None)
    }

    /// Ternary conditional, right-associative.
    fn parse_conditional(&mut self) -> ParseResult<ExpressionNode> {
        let test = self.parse_binary(Precedence::Nullish as u8)?;
        if !self.consume_if(&Token::Question) {
            return Ok(test);
        }
        let consequent = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let alternate = self.parse_expression()?;
        Ok(ExpressionNode::conditional(test, consequent, alternate))
    }

    /// Binary operators by precedence climbing.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) =
            self.peek().and_then(|t| binary_precedence(&t.token))
        {
            let precedence = precedence as u8;
            if precedence < min_precedence {
                break;
            }
            self.position += 1;
            // `**` is the only right-associative binary operator
            let next_min = if op == BinaryOperator::Power {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min)?;
            left = ExpressionNode::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<ExpressionNode> {
        let op = match self.peek().map(|t| &t.token) {
            Some(Token::Bang) => Some(UnaryOperator::Not),
            Some(Token::Minus) => Some(UnaryOperator::Negate),
            Some(Token::Plus) => Some(UnaryOperator::Plus),
            Some(Token::TypeOf) => Some(UnaryOperator::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.position += 1;
            let operand = self.parse_unary()?;
            return Ok(ExpressionNode::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    /// Postfix chain: member access, indexing and calls bind tightest.
    fn parse_postfix(&mut self) -> ParseResult<ExpressionNode> {
        let mut expression = self.parse_primary()?;

        loop {
            if self.consume_if(&Token::Dot) {
                let property = match self.advance()? {
                    SpannedToken {
                        token: Token::Identifier(name),
                        ..
                    } => name,
                    // Keywords are valid property names after a dot
                    SpannedToken {
                        token: Token::True, ..
                    } => "true".to_string(),
                    SpannedToken {
                        token: Token::False,
                        ..
                    } => "false".to_string(),
                    SpannedToken {
                        token: Token::Null, ..
                    } => "null".to_string(),
                    SpannedToken { token, start } => {
                        return Err(ParseError::UnexpectedToken {
                            token: token.describe(),
                            position: start,
                        });
                    }
                };
                expression = ExpressionNode::member(expression, property);
            } else if self.consume_if(&Token::LeftBracket) {
                let index = self.parse_expression()?;
                self.expect(Token::RightBracket)?;
                expression = ExpressionNode::index(expression, index);
            } else if self.consume_if(&Token::LeftParen) {
                let mut args: SmallVec<[ExpressionNode; 4]> = SmallVec::new();
                if !self.consume_if(&Token::RightParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.consume_if(&Token::Comma) {
                            self.expect(Token::RightParen)?;
                            break;
                        }
                    }
                }
                expression = ExpressionNode::call(expression, args);
            } else {
                break;
            }
        }

        Ok(expression)
    }

    fn parse_primary(&mut self) -> ParseResult<ExpressionNode> {
        let SpannedToken { token, start } = self.advance()?;
        match token {
            Token::Number(n) => Ok(ExpressionNode::literal(LiteralValue::Number(n))),
            Token::String(s) => Ok(ExpressionNode::literal(LiteralValue::String(s))),
            Token::True => Ok(ExpressionNode::literal(LiteralValue::Boolean(true))),
            Token::False => Ok(ExpressionNode::literal(LiteralValue::Boolean(false))),
            Token::Null | Token::Undefined => Ok(ExpressionNode::literal(LiteralValue::Null)),
            Token::Identifier(name) => Ok(ExpressionNode::identifier(name)),
            Token::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Token::LeftBracket => {
                let mut items = Vec::new();
                if !self.consume_if(&Token::RightBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if !self.consume_if(&Token::Comma) {
                            self.expect(Token::RightBracket)?;
                            break;
                        }
                        // Trailing comma
                        if self.consume_if(&Token::RightBracket) {
                            break;
                        }
                    }
                }
                Ok(ExpressionNode::ArrayLiteral(items))
            }
            Token::LeftBrace => {
                let mut entries = Vec::new();
                if !self.consume_if(&Token::RightBrace) {
                    loop {
                        let key = match self.advance()? {
                            SpannedToken {
                                token: Token::Identifier(name),
                                ..
                            } => name,
                            SpannedToken {
                                token: Token::String(s),
                                ..
                            } => s,
                            SpannedToken { token, start } => {
                                return Err(ParseError::UnexpectedToken {
                                    token: token.describe(),
                                    position: start,
                                });
                            }
                        };
                        self.expect(Token::Colon)?;
                        entries.push((key, self.parse_expression()?));
                        if !self.consume_if(&Token::Comma) {
                            self.expect(Token::RightBrace)?;
                            break;
                        }
                        if self.consume_if(&Token::RightBrace) {
                            break;
                        }
                    }
                }
                Ok(ExpressionNode::ObjectLiteral(entries))
            }
            other => Err(ParseError::UnexpectedToken {
                token: other.describe(),
                position: start,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator as Op;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> ExpressionNode {
        ExpressionNode::literal(LiteralValue::Number(n))
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let ast = parse_source("1 + 2 * 3").unwrap();
        assert_eq!(
            ast,
            ExpressionNode::binary(
                Op::Add,
                num(1.0),
                ExpressionNode::binary(Op::Multiply, num(2.0), num(3.0)),
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        // 2 ** 3 ** 2 parses as 2 ** (3 ** 2)
        let ast = parse_source("2 ** 3 ** 2").unwrap();
        assert_eq!(
            ast,
            ExpressionNode::binary(
                Op::Power,
                num(2.0),
                ExpressionNode::binary(Op::Power, num(3.0), num(2.0)),
            )
        );
    }

    #[test]
    fn test_member_and_index_chain() {
        let ast = parse_source("items[0].name").unwrap();
        assert_eq!(
            ast,
            ExpressionNode::member(
                ExpressionNode::index(ExpressionNode::identifier("items"), num(0.0)),
                "name",
            )
        );
    }

    #[test]
    fn test_ternary_nests_right() {
        let ast = parse_source("a ? 1 : b ? 2 : 3").unwrap();
        match ast {
            ExpressionNode::Conditional(data) => {
                assert_eq!(data.test, ExpressionNode::identifier("a"));
                assert!(matches!(data.alternate, ExpressionNode::Conditional(_)));
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_call_forms() {
        let ast = parse_source("Math.round(1.5)").unwrap();
        match ast {
            ExpressionNode::Call(data) => {
                assert_eq!(
                    data.callee,
                    ExpressionNode::member(ExpressionNode::identifier("Math"), "round")
                );
                assert_eq!(data.args.len(), 1);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_arrow_functions() {
        let ast = parse_source("x => x * 2").unwrap();
        match ast {
            ExpressionNode::Arrow(data) => {
                assert_eq!(data.params.as_slice(), ["x".to_string()]);
            }
            other => panic!("expected arrow, got {other:?}"),
        }

        let ast = parse_source("(a, b) => a + b").unwrap();
        match ast {
            ExpressionNode::Arrow(data) => {
                assert_eq!(data.params.as_slice(), ["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        let ast = parse_source("(1 + 2) * 3").unwrap();
        assert_eq!(
            ast,
            ExpressionNode::binary(
                Op::Multiply,
                ExpressionNode::binary(Op::Add, num(1.0), num(2.0)),
                num(3.0),
            )
        );
    }

    #[test]
    fn test_container_literals() {
        let ast = parse_source("[1, 'a', true]").unwrap();
        assert!(matches!(ast, ExpressionNode::ArrayLiteral(items) if items.len() == 3));

        let ast = parse_source("{name: 'Ada', 'age': 36}").unwrap();
        match ast {
            ExpressionNode::ObjectLiteral(entries) => {
                assert_eq!(entries[0].0, "name");
                assert_eq!(entries[1].0, "age");
            }
            other => panic!("expected object literal, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            parse_source("1 + 2 3"),
            Err(ParseError::TrailingTokens { .. })
        ));
        assert!(matches!(
            parse_source("a b"),
            Err(ParseError::TrailingTokens { .. })
        ));
    }

    #[test]
    fn test_incomplete_expressions_rejected() {
        assert!(matches!(parse_source("1 +"), Err(ParseError::UnexpectedEof)));
        assert!(matches!(parse_source("("), Err(ParseError::UnexpectedEof)));
        assert!(parse_source("a ? 1").is_err());
        assert!(parse_source("[1, 2").is_err());
    }

    #[test]
    fn test_short_circuit_operators_parse() {
        let ast = parse_source("a && b || c ?? d").unwrap();
        // `??` binds loosest: ((a && b) || c) ?? d
        match ast {
            ExpressionNode::Binary(data) => assert_eq!(data.op, Op::NullishCoalesce),
            other => panic!("expected binary, got {other:?}"),
        }
    }
}
