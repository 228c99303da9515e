//! Layout filter: turns the raw token stream into the significant one.

use std::sync::Arc;

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Keep only the tokens the grammar cares about.
///
/// Trivia is dropped. A line break is dropped when it cannot end an
/// expression (after an operator, an opening bracket, a comma, and so
/// on) or when a `\` continues the line. Doc comments survive only at
/// the start of a line. The result always ends with `Eof`.
pub(super) fn significant_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut kept: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut continued = false;

    for token in tokens {
        match token.kind {
            kind if kind.is_trivia() => {}
            TokenKind::LineContinuation => continued = true,
            TokenKind::Line => {
                if std::mem::take(&mut continued) || !ends_line(kept.last()) {
                    continue;
                }
                kept.push(token.clone());
            }
            TokenKind::DocComment => {
                continued = false;
                if starts_line(kept.last()) {
                    kept.push(token.clone());
                }
            }
            TokenKind::Eof => {
                kept.push(token.clone());
                break;
            }
            _ => {
                continued = false;
                kept.push(token.clone());
            }
        }
    }

    if kept.last().is_none_or(|t| t.kind != TokenKind::Eof) {
        let span = kept.last().map_or_else(
            || Span::new(Arc::from(""), 1, 1, 1, 1),
            |t| t.span.clone(),
        );
        kept.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            value: None,
            span,
        });
    }
    kept
}

/// Whether a line break after `previous` separates two expressions.
fn ends_line(previous: Option<&Token>) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    if previous.is_operator_name() {
        // `~name` is a complete operand; a bare `~` still wants one.
        let unquoted = previous.text.trim_start_matches('~');
        return previous.text.starts_with('~') && !unquoted.is_empty();
    }
    !matches!(
        previous.kind,
        TokenKind::Line
            | TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace
            | TokenKind::Comma
            | TokenKind::Backtick
            | TokenKind::Field
            | TokenKind::And
            | TokenKind::Or
            | TokenKind::Is
            | TokenKind::DocComment
    ) && !previous.kind.is_operator()
}

fn starts_line(previous: Option<&Token>) -> bool {
    previous.is_none_or(|t| matches!(t.kind, TokenKind::Line | TokenKind::DocComment))
}
