//! Parse error types

use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors produced while tokenizing or parsing an expression.
///
/// `Clone` matters here: failed parses are cached alongside successful ones
/// so repeated bad input does not pay the parse cost twice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Empty or whitespace-only input
    #[error("expression is empty")]
    EmptyExpression,

    /// Character the tokenizer cannot start a token with
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        ch: char,
        /// Byte offset in the source
        position: usize,
    },

    /// String literal without a closing quote
    #[error("unterminated string starting at position {position}")]
    UnterminatedString {
        /// Byte offset of the opening quote
        position: usize,
    },

    /// Malformed escape sequence inside a string literal
    #[error("invalid escape sequence at position {position}")]
    InvalidEscape {
        /// Byte offset of the backslash
        position: usize,
    },

    /// Number literal that fails the numeric grammar
    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber {
        /// The literal text as written
        text: String,
        /// Byte offset of the literal
        position: usize,
    },

    /// Token that cannot appear at this point in the grammar
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// Display form of the token
        token: String,
        /// Byte offset of the token
        position: usize,
    },

    /// Input ended where the grammar required more
    #[error("unexpected end of expression")]
    UnexpectedEof,

    /// A complete expression was parsed but input kept going — multiple
    /// statements and declarations are not part of the language
    #[error("expected end of expression, found '{token}' at position {position}")]
    TrailingTokens {
        /// Display form of the first extra token
        token: String,
        /// Byte offset of the token
        position: usize,
    },

    /// Arrow parameter list containing something other than identifiers
    #[error("invalid arrow function parameters at position {position}")]
    InvalidArrowParams {
        /// Byte offset of the parameter list
        position: usize,
    },
}
