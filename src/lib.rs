//! Lexer, parser, and expression tree for the Magpie language.
//!
//! Source text becomes a stream of tokens, then a single [`Expr`] tree.
//! Because code is data in Magpie, the same tree is what quoted code
//! evaluates to, and [`format`] turns any tree back into source text.
//!
//! # Quick start
//!
//! ## Parse and re-format a program
//!
//! ```
//! use magpie_syntax::{tokenize, parse, format};
//!
//! let input = "val x = (1 + 2)\nprint(x)\n";
//! let tokens = tokenize("main.mag", input).unwrap();
//! let program = parse(&tokens).unwrap();
//! assert_eq!(format(&program), input);
//! ```
//!
//! ## Build a tree programmatically
//!
//! ```
//! use magpie_syntax::{Expr, Pattern, format};
//!
//! let square = Expr::fn_(
//!     None,
//!     "",
//!     Some(Pattern::Variable("n".into())),
//!     Expr::binary_call(Expr::name(None, "n"), "*", Expr::name(None, "n")),
//! );
//! assert_eq!(format(&square), "fn(n)\n\t(n * n)\nend\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod source;
pub mod span;
pub mod token;

pub use ast::{Expr, ExprKind, ExprVisitor, Field, ImportDeclaration, ImportParts};
pub use formatter::format;
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use pattern::{MatchCase, Pattern};
pub use source::{SourceReader, StringReader};
pub use span::Span;
pub use token::{Literal, Token, TokenKind};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Where in the source the error was found.
    #[must_use]
    pub const fn span(&self) -> &Span {
        match self {
            Self::Lex(err) => &err.span,
            Self::Parse(err) => &err.span,
        }
    }
}

/// Tokenize and parse a named source unit in one step.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_str(source_name: &str, input: &str) -> Result<Expr, Error> {
    let tokens = tokenize(source_name, input)?;
    Ok(parse(&tokens)?)
}
