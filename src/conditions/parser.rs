//! expression parser - converts a rule expression string to an AST
//!
//! grammar (keywords and identifiers are case-insensitive):
//!
//! ```text
//! expr    := and ( OR and )*
//! and     := unary ( AND unary )*
//! unary   := NOT unary | primary
//! primary := IDENT | "(" expr ")"
//! ```
//!
//! anything else (numbers, quotes, comparison or arithmetic operators) is
//! rejected at lexing time.

use std::fmt;

use super::types::Expr;

/// nesting limit for parentheses and NOT chains
const MAX_DEPTH: usize = 64;

/// error type for parsing expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// byte offset into the expression string
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::And => write!(f, "AND"),
            TokenKind::Or => write!(f, "OR"),
            TokenKind::Not => write!(f, "NOT"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '(' || c == ')' {
            chars.next();
            let kind = if c == '(' {
                TokenKind::LParen
            } else {
                TokenKind::RParen
            };
            tokens.push(Token {
                kind,
                position: pos,
            });
            continue;
        }

        if is_ident_start(c) {
            let mut end = pos;
            while let Some(&(i, c)) = chars.peek() {
                if !is_ident_continue(c) {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }

            let word = &input[pos..end];
            let kind = match word.to_ascii_lowercase().as_str() {
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                lower => TokenKind::Ident(lower.to_string()),
            };
            tokens.push(Token {
                kind,
                position: pos,
            });
            continue;
        }

        return Err(unsupported_character(input, pos, c));
    }

    Ok(tokens)
}

fn unsupported_character(input: &str, pos: usize, c: char) -> ParseError {
    let rest = &input[pos..];

    if c.is_ascii_digit() {
        let literal: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        return ParseError::new(
            format!("numeric literals are not supported: '{}'", literal),
            pos,
        );
    }

    if c == '"' || c == '\'' {
        return ParseError::new("string literals are not supported", pos);
    }

    // symbolic spellings of the supported operators
    for (op, keyword) in [
        ("&&", "AND"),
        ("||", "OR"),
        ("&", "AND"),
        ("|", "OR"),
    ] {
        if rest.starts_with(op) {
            return ParseError::new(
                format!("unsupported operator '{}', use {} instead", op, keyword),
                pos,
            );
        }
    }
    if c == '!' && !rest.starts_with("!=") {
        return ParseError::new("unsupported operator '!', use NOT instead", pos);
    }

    for op in ["==", "!=", "<=", ">=", "<", ">", "=", "+", "-", "*", "/", "%"] {
        if rest.starts_with(op) {
            return ParseError::new(format!("unsupported operator '{}'", op), pos);
        }
    }

    ParseError::new(format!("unexpected character '{}'", c), pos)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next_if(&mut self, kind: &TokenKind) -> bool {
        match self.peek() {
            Some(t) if &t.kind == kind => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn enter(&mut self, position: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(
                format!("expression nested deeper than {} levels", MAX_DEPTH),
                position,
            ));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut children = vec![self.parse_and()?];
        while self.next_if(&TokenKind::Or) {
            children.push(self.parse_and()?);
        }

        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Expr::Any(children)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut children = vec![self.parse_unary()?];
        while self.next_if(&TokenKind::And) {
            children.push(self.parse_unary()?);
        }

        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Expr::All(children)
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Not {
                self.pos += 1;
                self.enter(token.position)?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                return Ok(Expr::Not(Box::new(inner)));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self
            .peek()
            .ok_or_else(|| ParseError::new("unexpected end of expression", self.end))?;
        self.pos += 1;

        match &token.kind {
            TokenKind::Ident(name) => Ok(Expr::Ident(name.clone())),
            TokenKind::LParen => {
                self.enter(token.position)?;
                let inner = self.parse_or()?;
                if !self.next_if(&TokenKind::RParen) {
                    let at = self.peek().map(|t| t.position).unwrap_or(self.end);
                    return Err(ParseError::new(
                        format!("unclosed '(' opened at position {}", token.position),
                        at,
                    ));
                }
                self.depth -= 1;
                Ok(inner)
            }
            other => Err(ParseError::new(
                format!("expected identifier or '(', found {}", other),
                token.position,
            )),
        }
    }
}

/// parse an expression string into an AST
///
/// # Returns
/// * `Ok(Expr)` - the parsed expression, identifiers lower-cased
/// * `Err(ParseError)` - if the string is empty or outside the grammar
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new("empty expression", 0));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };
    let expr = parser.parse_or()?;

    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            format!("unexpected {} after end of expression", token.kind),
            token.position,
        ));
    }

    Ok(expr)
}
