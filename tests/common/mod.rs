#![allow(dead_code)]

use magpie_syntax::{Expr, ParseErrorKind, Token, TokenKind, format, parse_str, tokenize};

/// Parse a source string, panicking with the error on failure.
pub fn parse_ok(input: &str) -> Expr {
    parse_str("test.mag", input).unwrap_or_else(|e| panic!("failed to parse: {e}\n{input}"))
}

/// Parse a source string that must be rejected by the parser.
pub fn parse_err(input: &str) -> ParseErrorKind {
    match parse_str("test.mag", input) {
        Ok(expr) => panic!("expected a parse error, got {expr:?}"),
        Err(magpie_syntax::Error::Parse(err)) => err.kind,
        Err(err) => panic!("expected a parse error, got {err}"),
    }
}

/// Tokens of `input` without trivia and the final `Eof`.
pub fn significant(input: &str) -> Vec<Token> {
    tokenize("test.mag", input)
        .expect("should tokenize")
        .into_iter()
        .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
        .collect()
}

pub fn kinds(input: &str) -> Vec<TokenKind> {
    significant(input).iter().map(|t| t.kind).collect()
}

/// Parse then format, and require the output to equal the input.
pub fn roundtrip(input: &str) {
    let output = format(&parse_ok(input));
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Format a tree, parse it back, and require the same tree and the same
/// text.
pub fn assert_tree_roundtrip(original: &Expr) {
    let formatted = format(original);
    let parsed = parse_str("test.mag", &formatted).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    });
    assert_eq!(
        &parsed, original,
        "tree mismatch\n--- formatted ---\n{formatted}"
    );
    assert_eq!(format(&parsed), formatted);
}

pub fn name(text: &str) -> Expr {
    Expr::name(None, text)
}

pub fn int(value: i64) -> Expr {
    Expr::int(None, value)
}
