//! Hand-written tokenizer for the expression language
//!
//! Single forward pass over the source, producing positioned tokens.
//! String escapes are resolved here so the parser only ever sees finished
//! literal values.

use super::error::{ParseError, ParseResult};

/// A token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token itself
    pub token: Token,
    /// Byte offset where the token starts
    pub start: usize,
}

/// Tokens of the expression language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Number literal, already parsed to `f64`
    Number(f64),
    /// String literal with escapes resolved
    String(String),
    /// Identifier
    Identifier(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `typeof`
    TypeOf,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `===`
    EqEqEq,
    /// `!==`
    NotEqEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `??`
    QuestionQuestion,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `=>`
    Arrow,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
}

impl Token {
    /// Display form used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::String(s) => format!("'{s}'"),
            Token::Identifier(name) => name.clone(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::Undefined => "undefined".to_string(),
            Token::TypeOf => "typeof".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::StarStar => "**".to_string(),
            Token::Slash => "/".to_string(),
            Token::Percent => "%".to_string(),
            Token::Bang => "!".to_string(),
            Token::EqEq => "==".to_string(),
            Token::NotEq => "!=".to_string(),
            Token::EqEqEq => "===".to_string(),
            Token::NotEqEq => "!==".to_string(),
            Token::Lt => "<".to_string(),
            Token::Le => "<=".to_string(),
            Token::Gt => ">".to_string(),
            Token::Ge => ">=".to_string(),
            Token::AmpAmp => "&&".to_string(),
            Token::PipePipe => "||".to_string(),
            Token::QuestionQuestion => "??".to_string(),
            Token::Question => "?".to_string(),
            Token::Colon => ":".to_string(),
            Token::Dot => ".".to_string(),
            Token::Comma => ",".to_string(),
            Token::Arrow => "=>".to_string(),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
            Token::LeftBracket => "[".to_string(),
            Token::RightBracket => "]".to_string(),
            Token::LeftBrace => "{".to_string(),
            Token::RightBrace => "}".to_string(),
        }
    }
}

/// Check if a character can start an identifier
pub fn is_identifier_start(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_start(c) || c == '_' || c == '$'
}

/// Check if a character can continue an identifier
pub fn is_identifier_continue(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_continue(c) || c == '$'
}

/// Tokenize a source string into positioned tokens.
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '0'..='9' => scan_number(source, &mut chars)?,
            '.' => {
                // A dot followed by a digit starts a number (`.5`)
                let next_is_digit = source[start + 1..]
                    .chars()
                    .next()
                    .is_some_and(|n| n.is_ascii_digit());
                if next_is_digit {
                    scan_number(source, &mut chars)?
                } else {
                    chars.next();
                    Token::Dot
                }
            }
            '\'' | '"' => scan_string(&mut chars)?,
            c if is_identifier_start(c) => scan_identifier(source, &mut chars),
            _ => scan_operator(&mut chars)?,
        };
        tokens.push(SpannedToken { token, start });
    }

    Ok(tokens)
}

fn scan_number(
    source: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> ParseResult<Token> {
    let (start, first) = *chars.peek().ok_or(ParseError::UnexpectedEof)?;

    // Radix-prefixed integer literals
    if first == '0' {
        let rest = &source[start + 1..];
        if let Some(marker) = rest.chars().next() {
            let radix = match marker {
                'x' | 'X' => Some(16),
                'o' | 'O' => Some(8),
                'b' | 'B' => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                chars.next(); // 0
                chars.next(); // marker
                let digits_start = start + 2;
                let mut end = digits_start;
                while let Some(&(pos, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() {
                        chars.next();
                        end = pos + c.len_utf8();
                    } else {
                        break;
                    }
                }
                let digits = &source[digits_start..end];
                return u128::from_str_radix(digits, radix)
                    .map(|v| Token::Number(v as f64))
                    .map_err(|_| ParseError::InvalidNumber {
                        text: source[start..end].to_string(),
                        position: start,
                    });
            }
        }
    }

    let mut end = start;
    let mut seen_exponent = false;
    while let Some(&(pos, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' | '.' => true,
            'e' | 'E' => {
                seen_exponent = true;
                true
            }
            '+' | '-' => {
                // Sign is only part of the literal right after the exponent
                seen_exponent && matches!(source[..pos].chars().last(), Some('e') | Some('E'))
            }
            _ => false,
        };
        if !accept {
            break;
        }
        chars.next();
        end = pos + c.len_utf8();
    }

    let text = &source[start..end];
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ParseError::InvalidNumber {
            text: text.to_string(),
            position: start,
        })
}

fn scan_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> ParseResult<Token> {
    let (start, quote) = chars.next().ok_or(ParseError::UnexpectedEof)?;
    let mut value = String::new();

    loop {
        let (pos, c) = chars
            .next()
            .ok_or(ParseError::UnterminatedString { position: start })?;
        match c {
            c if c == quote => return Ok(Token::String(value)),
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or(ParseError::UnterminatedString { position: start })?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{0008}'),
                    'f' => value.push('\u{000C}'),
                    'v' => value.push('\u{000B}'),
                    '0' => value.push('\0'),
                    'u' => value.push(scan_unicode_escape(chars, pos)?),
                    // Unknown escapes yield the character itself
                    other => value.push(other),
                }
            }
            _ => value.push(c),
        }
    }
}

// `\uXXXX` or `\u{X...}`
fn scan_unicode_escape(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    escape_pos: usize,
) -> ParseResult<char> {
    let braced = matches!(chars.peek(), Some(&(_, '{')));
    let mut digits = String::new();

    if braced {
        chars.next();
        loop {
            match chars.next() {
                Some((_, '}')) => break,
                Some((_, c)) if c.is_ascii_hexdigit() => digits.push(c),
                _ => {
                    return Err(ParseError::InvalidEscape {
                        position: escape_pos,
                    });
                }
            }
        }
    } else {
        for _ in 0..4 {
            match chars.next() {
                Some((_, c)) if c.is_ascii_hexdigit() => digits.push(c),
                _ => {
                    return Err(ParseError::InvalidEscape {
                        position: escape_pos,
                    });
                }
            }
        }
    }

    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(ParseError::InvalidEscape {
            position: escape_pos,
        })
}

fn scan_identifier(
    source: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Token {
    let (start, first) = *chars.peek().expect("caller checked");
    let mut end = start + first.len_utf8();
    chars.next();

    while let Some(&(pos, c)) = chars.peek() {
        if is_identifier_continue(c) {
            chars.next();
            end = pos + c.len_utf8();
        } else {
            break;
        }
    }

    match &source[start..end] {
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        "undefined" => Token::Undefined,
        "typeof" => Token::TypeOf,
        name => Token::Identifier(name.to_string()),
    }
}

fn scan_operator(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> ParseResult<Token> {
    let (start, c) = chars.next().ok_or(ParseError::UnexpectedEof)?;
    let mut next_is = |expected: char| -> bool {
        if matches!(chars.peek(), Some(&(_, c)) if c == expected) {
            chars.next();
            true
        } else {
            false
        }
    };

    let token = match c {
        '+' => Token::Plus,
        '-' => Token::Minus,
        '*' => {
            if next_is('*') {
                Token::StarStar
            } else {
                Token::Star
            }
        }
        '/' => Token::Slash,
        '%' => Token::Percent,
        '(' => Token::LeftParen,
        ')' => Token::RightParen,
        '[' => Token::LeftBracket,
        ']' => Token::RightBracket,
        '{' => Token::LeftBrace,
        '}' => Token::RightBrace,
        ',' => Token::Comma,
        ':' => Token::Colon,
        '!' => {
            if next_is('=') {
                if next_is('=') {
                    Token::NotEqEq
                } else {
                    Token::NotEq
                }
            } else {
                Token::Bang
            }
        }
        '=' => {
            if next_is('>') {
                Token::Arrow
            } else if next_is('=') {
                if next_is('=') {
                    Token::EqEqEq
                } else {
                    Token::EqEq
                }
            } else {
                return Err(ParseError::UnexpectedCharacter {
                    ch: '=',
                    position: start,
                });
            }
        }
        '<' => {
            if next_is('=') {
                Token::Le
            } else {
                Token::Lt
            }
        }
        '>' => {
            if next_is('=') {
                Token::Ge
            } else {
                Token::Gt
            }
        }
        '&' => {
            if next_is('&') {
                Token::AmpAmp
            } else {
                return Err(ParseError::UnexpectedCharacter {
                    ch: '&',
                    position: start,
                });
            }
        }
        '|' => {
            if next_is('|') {
                Token::PipePipe
            } else {
                return Err(ParseError::UnexpectedCharacter {
                    ch: '|',
                    position: start,
                });
            }
        }
        '?' => {
            if next_is('?') {
                Token::QuestionQuestion
            } else {
                Token::Question
            }
        }
        other => {
            return Err(ParseError::UnexpectedCharacter {
                ch: other,
                position: start,
            });
        }
    };
    Ok(token)
}
