//! Recursive-descent parser from tokens to an [`Expr`] tree.
//!
//! The token stream first goes through the [layout filter](layout),
//! which leaves only significant tokens and the line breaks that
//! separate expressions. The parser then needs one token of lookahead.
//! Infix operators are handled by precedence climbing over
//! [`binding_power`].
//!
//! Parsing is fail-fast: the first error is returned and no partial tree
//! is produced.

use std::fmt;

use tracing::debug;

use crate::ast::{Expr, ExprKind};
use crate::span::Span;
use crate::token::{Token, TokenKind};

mod declarations;
mod expressions;
mod layout;
mod patterns;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was required here.
    ExpectedToken { expected: TokenKind, found: String },
    /// Nothing here can start an expression.
    ExpectedExpression { found: String },
    /// Nothing here can start a pattern.
    ExpectedPattern { found: String },
    /// An identifier was required here.
    ExpectedName { found: String },
    /// Input ended inside a construct that was never closed.
    MissingEnd { construct: &'static str },
    /// `~` used with no enclosing quote left to escape from.
    UnquoteOutsideQuote,
    /// A record, record pattern, or class names the same field twice.
    DuplicateField { name: String },
    /// Subtracted integer literal that has no positive `i64` value.
    IntegerOutOfRange { text: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::ExpectedExpression { found } => {
                write!(f, "expected expression, found {found}")
            }
            Self::ExpectedPattern { found } => {
                write!(f, "expected pattern, found {found}")
            }
            Self::ExpectedName { found } => {
                write!(f, "expected name, found {found}")
            }
            Self::MissingEnd { construct } => {
                write!(f, "input ended inside unclosed {construct}")
            }
            Self::UnquoteOutsideQuote => {
                write!(f, "unquote outside of a quotation")
            }
            Self::DuplicateField { name } => {
                write!(f, "duplicate field '{name}'")
            }
            Self::IntegerOutOfRange { text } => {
                write!(f, "integer literal out of range: {text}")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parse a token stream into a single root expression.
///
/// The tokens are the full lexer output, trivia included. The root is
/// the program's top-level block: `Nothing` when empty, the expression
/// itself when there is one, a `Sequence` otherwise.
///
/// # Errors
///
/// Returns the first `ParseError` found.
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    Parser::new(layout::significant_tokens(tokens))
        .parse_program()
        .inspect(|program| {
            let items = match program.kind() {
                ExprKind::Sequence(items) => items.len(),
                ExprKind::Nothing => 0,
                _ => 1,
            };
            debug!(items, "parsed source unit");
        })
        .inspect_err(|err| debug!(error = %err, "parsing failed"))
}

/// Binding power for infix operators.
///
/// Higher values bind tighter. Every operator is left-associative, so
/// the right side is parsed at one more than the left.
#[derive(Debug, Clone, Copy)]
struct BindingPower {
    left: u8,
    right: u8,
}

impl BindingPower {
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Precedence of an infix operator, loosest first:
///
/// | Level | Operators |
/// |-------|-----------|
/// | 10 | `or` |
/// | 20 | `and` |
/// | 30 | `is` |
/// | 40 | `==` `!=` |
/// | 50 | `<` `>` `<=` `>=` |
/// | 55 | any other operator name |
/// | 60 | `+` `-` |
/// | 70 | `*` `/` `%` |
fn binding_power(op: &str) -> BindingPower {
    match op {
        "or" => BindingPower::left_assoc(10),
        "and" => BindingPower::left_assoc(20),
        "is" => BindingPower::left_assoc(30),
        "==" | "!=" => BindingPower::left_assoc(40),
        "<" | ">" | "<=" | ">=" => BindingPower::left_assoc(50),
        "+" | "-" => BindingPower::left_assoc(60),
        "*" | "/" | "%" => BindingPower::left_assoc(70),
        _ => BindingPower::left_assoc(55),
    }
}

/// Human-readable description of a token for error messages.
fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Name | TokenKind::Int | TokenKind::Field => format!("'{}'", token.text),
        kind => kind.to_string(),
    }
}

pub(super) struct Parser {
    /// Significant tokens, always ending with `Eof`.
    tokens: Vec<Token>,
    pos: usize,
    /// Doc comment lines waiting for the next declaration.
    pending_doc: String,
    /// How many quotes enclose the current position.
    quote_depth: usize,
    /// Counter for naming `for` loop iterators.
    for_loops: usize,
}

impl Parser {
    const fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            pending_doc: String::new(),
            quote_depth: 0,
            for_loops: 0,
        }
    }

    fn parse_program(mut self) -> Result<Expr, ParseError> {
        self.parse_block(&[TokenKind::Eof], "program")
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token and return it. `Eof` is never consumed.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.at(kind).then(|| self.advance())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(ParseErrorKind::ExpectedToken {
                expected: kind,
                found: describe(self.current()),
            }))
        }
    }

    /// Consume a plain identifier.
    fn expect_name(&mut self) -> Result<Token, ParseError> {
        let token = self.current();
        if token.kind == TokenKind::Name && !token.is_operator_name() {
            Ok(self.advance())
        } else {
            Err(self.error(ParseErrorKind::ExpectedName {
                found: describe(token),
            }))
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            span: self.current().span.clone(),
        }
    }

    fn skip_lines(&mut self) {
        while self.at(TokenKind::Line) {
            self.advance();
        }
    }

    /// Gather consecutive doc comment lines into `pending_doc`.
    fn collect_docs(&mut self) {
        while let Some(token) = self.eat(TokenKind::DocComment) {
            if !self.pending_doc.is_empty() {
                self.pending_doc.push('\n');
            }
            self.pending_doc.push_str(token.string_value().unwrap_or_default());
            self.skip_lines();
        }
    }

    fn take_doc(&mut self) -> String {
        std::mem::take(&mut self.pending_doc)
    }

    /// Parse line-separated expressions up to (not including) one of the
    /// `terminators`. `construct` names the enclosing form for the error
    /// raised when input ends first.
    fn parse_block(
        &mut self,
        terminators: &[TokenKind],
        construct: &'static str,
    ) -> Result<Expr, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_lines();
            self.collect_docs();
            if terminators.contains(&self.kind()) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.error(ParseErrorKind::MissingEnd { construct }));
            }

            if !takes_doc(self.kind()) {
                self.pending_doc.clear();
            }
            items.push(self.parse_expression()?);
            self.pending_doc.clear();

            match self.kind() {
                TokenKind::Line => {}
                kind if terminators.contains(&kind) => break,
                TokenKind::Eof => {
                    return Err(self.error(ParseErrorKind::MissingEnd { construct }));
                }
                _ => {
                    return Err(self.error(ParseErrorKind::ExpectedToken {
                        expected: TokenKind::Line,
                        found: describe(self.current()),
                    }));
                }
            }
        }
        self.pending_doc.clear();
        Ok(Expr::sequence(items))
    }
}

/// Keywords that start an expression able to carry documentation.
const fn takes_doc(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Def | TokenKind::Defclass | TokenKind::Var | TokenKind::Val | TokenKind::Fn
    )
}

/// Span from the start of `first` to the end of `last`.
fn between(first: &Token, last: &Token) -> Option<Span> {
    Some(first.span.union(&last.span))
}
