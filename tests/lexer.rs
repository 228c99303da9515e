//! Lexer edge cases and error tests.

mod common;

use common::{kinds, significant};
use magpie_syntax::{
    LexErrorKind, Lexer, Literal, SourceReader, StringReader, TokenKind, tokenize,
};

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    let tokens = tokenize("empty", "").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn lex_only_whitespace() {
    let tokens = tokenize("blank", "   \t  \n\n  ").expect("tokenize");
    assert!(tokens.iter().all(|t| matches!(
        t.kind,
        TokenKind::Whitespace | TokenKind::Line | TokenKind::Eof
    )));
}

#[test]
fn token_text_covers_the_input() {
    let input = "val x = \"hi\\n\" // note\nprint(x, -3)";
    let tokens = tokenize("t", input).expect("tokenize");
    let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(rebuilt, input);
}

#[test]
fn keywords_operators_and_names() {
    assert_eq!(
        kinds("if x.y then a <= b else not end"),
        vec![
            TokenKind::If,
            TokenKind::Name,
            TokenKind::Then,
            TokenKind::Name,
            TokenKind::Lte,
            TokenKind::Name,
            TokenKind::Else,
            TokenKind::Name,
            TokenKind::End,
        ]
    );
}

#[test]
fn labels_are_fields_even_for_keywords() {
    let tokens = significant("if: 1, 0: 2");
    assert_eq!(tokens[0].kind, TokenKind::Field);
    assert_eq!(tokens[0].string_value(), Some("if"));
    assert_eq!(tokens[3].kind, TokenKind::Field);
    assert_eq!(tokens[3].string_value(), Some("0"));
}

#[test]
fn booleans_carry_values() {
    let tokens = significant("true false");
    assert_eq!(tokens[0].value, Some(Literal::Bool(true)));
    assert_eq!(tokens[1].value, Some(Literal::Bool(false)));
}

#[test]
fn custom_operator_run() {
    let tokens = significant("a |> b");
    assert_eq!(tokens[1].kind, TokenKind::Name);
    assert_eq!(tokens[1].text, "|>");
    assert!(tokens[1].is_operator_name());
}

#[test]
fn unquote_lexes_as_one_name() {
    let tokens = significant("~value");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "~value");
}

// -----------------------------------------------------------
// Comments.
// -----------------------------------------------------------

#[test]
fn line_and_doc_comments() {
    let tokens = tokenize("c", "// a comment\n/// a doc\n").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::LineComment);
    assert_eq!(tokens[0].string_value(), Some("a comment"));
    assert_eq!(tokens[2].kind, TokenKind::DocComment);
    assert_eq!(tokens[2].string_value(), Some("a doc"));
}

#[test]
fn block_comment_spans_lines() {
    let tokens = tokenize("c", "/* one\ntwo */x").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::BlockComment);
    assert_eq!(tokens[1].span.start_line(), 2);
    assert_eq!(tokens[1].span.start_col(), 7);
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn unterminated_string_is_an_error() {
    let err = tokenize("s", "\"abc").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
}

#[test]
fn bad_escape() {
    let err = tokenize("s", "\"\\q\"").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::InvalidEscape('q'));
}

#[test]
fn bad_hex_escape() {
    let err = tokenize("s", "\"\\x4g\"").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::InvalidHexDigit('g'));
}

#[test]
fn unknown_character_position() {
    let err = tokenize("s", "x\n  #").expect_err("should fail");
    assert_eq!(err.kind, LexErrorKind::UnknownCharacter('#'));
    assert_eq!(err.span.start_line(), 2);
    assert_eq!(err.span.start_col(), 3);
    assert_eq!(err.to_string(), "unknown character: '#' at s (line 2, col 3-4)");
}

#[test]
fn integer_overflow() {
    let err = tokenize("n", "99999999999999999999").expect_err("should fail");
    assert!(matches!(err.kind, LexErrorKind::MalformedNumber(_)));
}

// -----------------------------------------------------------
// Pull-based use.
// -----------------------------------------------------------

#[test]
fn read_token_after_eof_keeps_returning_eof() {
    let mut lexer = Lexer::new(StringReader::new("pull", "x"));
    assert_eq!(lexer.read_token().expect("token").kind, TokenKind::Name);
    for _ in 0..3 {
        assert_eq!(lexer.read_token().expect("token").kind, TokenKind::Eof);
    }
}

/// A reader over a fixed list of lines, as a host might provide.
struct LineReader {
    chars: Vec<char>,
    pos: usize,
}

impl SourceReader for LineReader {
    fn description(&self) -> &str {
        "lines"
    }

    fn current(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

#[test]
fn custom_reader() {
    let reader = LineReader {
        chars: "a\nb".chars().collect(),
        pos: 0,
    };
    let tokens: Vec<_> = Lexer::new(reader)
        .collect::<Result<_, _>>()
        .expect("tokenize");
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[2].span.source(), "lines");
}
