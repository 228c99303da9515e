use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::source::{SourceReader, StringReader};
use crate::span::Span;
use crate::token::{Literal, Token, TokenKind, is_name_char, is_operator_char};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Character that cannot start any token.
    UnknownCharacter(char),
    /// End of input before the closing `"`.
    UnterminatedString,
    /// End of input before the closing `*/`.
    UnterminatedBlockComment,
    /// Backslash followed by a character that is not an escape.
    InvalidEscape(char),
    /// Non-hex character in a `\xHH` escape.
    InvalidHexDigit(char),
    /// Digits that do not fit in an integer.
    MalformedNumber(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCharacter(ch) => {
                write!(f, "unknown character: {ch:?}")
            }
            Self::UnterminatedString => {
                write!(f, "unterminated string")
            }
            Self::UnterminatedBlockComment => {
                write!(f, "unterminated block comment")
            }
            Self::InvalidEscape(ch) => {
                write!(f, "unknown string escape: \\{ch}")
            }
            Self::InvalidHexDigit(ch) => {
                write!(f, "expected hex digit, got {ch:?}")
            }
            Self::MalformedNumber(text) => {
                write!(f, "integer literal out of range: {text}")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a source string into a sequence of tokens ending with `Eof`.
///
/// Whitespace, comment, and layout tokens are included; the parser
/// filters them.
///
/// # Errors
///
/// Returns the first `LexError` found. No tokens are returned then.
pub fn tokenize(source_name: &str, input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(StringReader::new(source_name, input))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| debug!(error = %err, "lexing failed"))
}

/// Pull-based tokenizer over a [`SourceReader`].
///
/// Each call to [`Lexer::read_token`] consumes exactly the characters of
/// one token. Once the input is exhausted every call returns `Eof`.
pub struct Lexer<R> {
    reader: R,
    source: Arc<str>,
    line: usize,
    col: usize,
    start_line: usize,
    start_col: usize,
    read: String,
    done: bool,
}

impl<R: SourceReader> Lexer<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        let source = Arc::from(reader.description());
        Self {
            reader,
            source,
            line: 1,
            col: 1,
            start_line: 1,
            start_col: 1,
            read: String::new(),
            done: false,
        }
    }

    /// Read the next token.
    ///
    /// # Errors
    ///
    /// Returns `LexError` on an unknown character, a bad escape, an
    /// unterminated string or block comment, or an out-of-range integer.
    pub fn read_token(&mut self) -> Result<Token, LexError> {
        let c = self.advance();
        match c {
            ' ' | '\t' => Ok(self.read_whitespace()),

            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),
            '[' => Ok(self.make_token(TokenKind::LeftBracket)),
            ']' => Ok(self.make_token(TokenKind::RightBracket)),
            '{' => Ok(self.make_token(TokenKind::LeftBrace)),
            '}' => Ok(self.make_token(TokenKind::RightBrace)),
            '`' => Ok(self.make_token(TokenKind::Backtick)),
            ',' => Ok(self.make_token(TokenKind::Comma)),

            ';' | '\n' | '\r' => Ok(self.make_token(TokenKind::Line)),

            '"' => self.read_string(),

            '/' => match self.peek() {
                '/' => Ok(self.read_line_comment()),
                '*' => self.read_block_comment(),
                _ => Ok(self.read_operator()),
            },

            '-' => {
                let next = self.peek();
                if next.is_ascii_digit() {
                    self.read_number()
                } else if is_operator_char(next) {
                    Ok(self.read_operator())
                } else {
                    Ok(self.make_token(TokenKind::Name))
                }
            }

            '\\' => Ok(self.make_token(TokenKind::LineContinuation)),

            '\0' => Ok(self.make_token(TokenKind::Eof)),

            c if is_name_char(c) => Ok(self.read_name()),
            c if is_operator_char(c) => Ok(self.read_operator()),
            c if c.is_ascii_digit() => self.read_number(),
            c => Err(self.error(LexErrorKind::UnknownCharacter(c))),
        }
    }

    fn peek(&self) -> char {
        self.reader.current()
    }

    fn advance(&mut self) -> char {
        let c = self.reader.current();
        if c == '\0' {
            return c;
        }
        self.reader.advance();
        self.read.push(c);

        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        c
    }

    fn current_span(&self) -> Span {
        Span::new(
            Arc::clone(&self.source),
            self.start_line,
            self.start_col,
            self.line,
            self.col,
        )
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            span: self.current_span(),
        }
    }

    fn make_token(&mut self, kind: TokenKind) -> Token {
        self.make_token_with(kind, None)
    }

    fn make_token_with(&mut self, kind: TokenKind, value: Option<Literal>) -> Token {
        let (kind, value) = if kind == TokenKind::Name {
            match self.read.as_str() {
                "true" => (TokenKind::Bool, Some(Literal::Bool(true))),
                "false" => (TokenKind::Bool, Some(Literal::Bool(false))),
                text => (TokenKind::reserved(text).unwrap_or(kind), value),
            }
        } else {
            (kind, value)
        };

        let token = Token {
            kind,
            text: std::mem::take(&mut self.read),
            value,
            span: self.current_span(),
        };
        trace!(kind = ?token.kind, span = %token.span, "token");

        self.start_line = self.line;
        self.start_col = self.col;
        token
    }

    fn read_whitespace(&mut self) -> Token {
        while matches!(self.peek(), ' ' | '\t') {
            self.advance();
        }
        self.make_token(TokenKind::Whitespace)
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        let mut value = String::new();

        loop {
            match self.advance() {
                '\\' => {
                    let escaped = match self.advance() {
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '"' => '"',
                        '\\' => '\\',
                        '0' => '\0',
                        'x' => {
                            let high = self.read_hex_digit()?;
                            let low = self.read_hex_digit()?;
                            char::from((high << 4) | low)
                        }
                        '\0' => return Err(self.error(LexErrorKind::UnterminatedString)),
                        other => return Err(self.error(LexErrorKind::InvalidEscape(other))),
                    };
                    value.push(escaped);
                }
                '"' => {
                    return Ok(self.make_token_with(TokenKind::String, Some(Literal::String(value))));
                }
                '\0' => return Err(self.error(LexErrorKind::UnterminatedString)),
                c => value.push(c),
            }
        }
    }

    fn read_hex_digit(&mut self) -> Result<u8, LexError> {
        let c = self.advance();
        if c == '\0' {
            return Err(self.error(LexErrorKind::UnterminatedString));
        }
        c.to_digit(16)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| self.error(LexErrorKind::InvalidHexDigit(c)))
    }

    fn read_line_comment(&mut self) -> Token {
        self.advance(); // second "/"

        let mut slashes = 2;
        while self.peek() == '/' {
            self.advance();
            slashes += 1;
        }

        while !matches!(self.peek(), '\n' | '\r' | '\0') {
            self.advance();
        }

        let kind = if slashes >= 3 {
            TokenKind::DocComment
        } else {
            TokenKind::LineComment
        };
        let body = self.read[slashes..].trim().to_string();
        self.make_token_with(kind, Some(Literal::String(body)))
    }

    fn read_block_comment(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening "*"

        loop {
            match self.advance() {
                '*' if self.peek() == '/' => {
                    self.advance();
                    return Ok(self.make_token(TokenKind::BlockComment));
                }
                '\0' => return Err(self.error(LexErrorKind::UnterminatedBlockComment)),
                _ => {}
            }
        }
    }

    fn read_name(&mut self) -> Token {
        loop {
            let c = self.peek();
            if is_name_char(c) || c.is_ascii_digit() {
                self.advance();
            } else if c == ':' {
                return self.read_field();
            } else {
                return self.make_token(TokenKind::Name);
            }
        }
    }

    fn read_operator(&mut self) -> Token {
        loop {
            let c = self.peek();
            if is_name_char(c) || is_operator_char(c) {
                self.advance();
            } else if c == ':' {
                return self.read_field();
            } else {
                return self.make_token(TokenKind::Name);
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        loop {
            let c = self.peek();
            if c.is_ascii_digit() {
                self.advance();
            } else if c == ':' {
                return Ok(self.read_field());
            } else {
                return match self.read.parse::<i64>() {
                    Ok(n) => Ok(self.make_token_with(TokenKind::Int, Some(Literal::Int(n)))),
                    Err(_) => Err(self.error(LexErrorKind::MalformedNumber(self.read.clone()))),
                };
            }
        }
    }

    /// Consume the trailing `:` and emit the text before it as a label.
    fn read_field(&mut self) -> Token {
        let label = self.read.clone();
        self.advance();
        self.make_token_with(TokenKind::Field, Some(Literal::String(label)))
    }
}

impl<R: SourceReader> Iterator for Lexer<R> {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to and including `Eof`, or up to the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.read_token();
        if !matches!(&result, Ok(token) if token.kind != TokenKind::Eof) {
            self.done = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        tokenize("test", input).expect("should tokenize")
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn names_and_whitespace() {
        assert_eq!(
            kinds("foo bar"),
            vec![
                TokenKind::Name,
                TokenKind::Whitespace,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            kinds("()[]{}`,"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Backtick,
                TokenKind::Comma,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn line_separators() {
        assert_eq!(
            kinds("a;b\nc"),
            vec![
                TokenKind::Name,
                TokenKind::Line,
                TokenKind::Name,
                TokenKind::Line,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keywords_and_bools() {
        let tokens = lex("if true then nothing");
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[2].kind, TokenKind::Bool);
        assert_eq!(tokens[2].bool_value(), Some(true));
        assert_eq!(tokens[4].kind, TokenKind::Then);
        assert_eq!(tokens[6].kind, TokenKind::Nothing);
    }

    #[test]
    fn field_labels() {
        let tokens = lex("x: if: 0:");
        assert_eq!(tokens[0].kind, TokenKind::Field);
        assert_eq!(tokens[0].string_value(), Some("x"));
        assert_eq!(tokens[0].text, "x:");
        // Reserved words are only looked up for names.
        assert_eq!(tokens[2].kind, TokenKind::Field);
        assert_eq!(tokens[2].string_value(), Some("if"));
        assert_eq!(tokens[4].kind, TokenKind::Field);
        assert_eq!(tokens[4].string_value(), Some("0"));
    }

    #[test]
    fn minus_forms() {
        let tokens = lex("-12 - -> -x");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].int_value(), Some(-12));
        assert_eq!(tokens[2].kind, TokenKind::Minus);
        assert_eq!(tokens[4].kind, TokenKind::Name);
        assert_eq!(tokens[4].text, "->");
        assert_eq!(tokens[6].kind, TokenKind::Minus);
        assert_eq!(tokens[7].text, "x");
    }

    #[test]
    fn operator_runs_absorb_names() {
        let tokens = lex("+b ++ <=");
        assert_eq!(tokens[0].kind, TokenKind::Name);
        assert_eq!(tokens[0].text, "+b");
        assert_eq!(tokens[2].text, "++");
        assert_eq!(tokens[4].kind, TokenKind::Lte);
    }

    #[test]
    fn slash_operator() {
        let tokens = lex("a / b /= c");
        assert_eq!(tokens[2].kind, TokenKind::Slash);
        assert_eq!(tokens[6].kind, TokenKind::Name);
        assert_eq!(tokens[6].text, "/=");
    }

    #[test]
    fn string_escapes() {
        let tokens = lex(r#""a\tb\x41\"\\""#);
        assert_eq!(tokens[0].string_value(), Some("a\tbA\"\\"));
        assert_eq!(tokens[0].text, r#""a\tb\x41\"\\""#);
    }

    #[test]
    fn string_spanning_lines() {
        let tokens = lex("\"a\nb\" c");
        assert_eq!(tokens[0].string_value(), Some("a\nb"));
        assert_eq!(tokens[2].span.start_line(), 2);
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("test", "\"abc").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn invalid_escape() {
        let err = tokenize("test", r#""\q""#).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidEscape('q'));
    }

    #[test]
    fn invalid_hex_digit() {
        let err = tokenize("test", r#""\x4g""#).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidHexDigit('g'));
    }

    #[test]
    fn comments() {
        let tokens = lex("// plain \n///  doc  \n//// also doc");
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        assert_eq!(tokens[0].string_value(), Some("plain"));
        assert_eq!(tokens[2].kind, TokenKind::DocComment);
        assert_eq!(tokens[2].string_value(), Some("doc"));
        assert_eq!(tokens[4].kind, TokenKind::DocComment);
        assert_eq!(tokens[4].string_value(), Some("also doc"));
    }

    #[test]
    fn block_comment() {
        assert_eq!(
            kinds("a /* x * / y */ b"),
            vec![
                TokenKind::Name,
                TokenKind::Whitespace,
                TokenKind::BlockComment,
                TokenKind::Whitespace,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_block_comment() {
        let err = tokenize("test", "/*/").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedBlockComment);
    }

    #[test]
    fn number_overflow() {
        let err = tokenize("test", "99999999999999999999").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::MalformedNumber(_)));
    }

    #[test]
    fn unknown_character() {
        let err = tokenize("test", "a # b").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnknownCharacter('#'));
        assert_eq!(err.span.start_col(), 3);
    }

    #[test]
    fn line_continuation() {
        assert_eq!(
            kinds("a \\\nb"),
            vec![
                TokenKind::Name,
                TokenKind::Whitespace,
                TokenKind::LineContinuation,
                TokenKind::Line,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new(StringReader::new("test", ""));
        assert_eq!(lexer.read_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.read_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn iterator_stops_after_eof() {
        let lexer = Lexer::new(StringReader::new("test", "x"));
        assert_eq!(lexer.count(), 2);
    }

    #[test]
    fn span_tracking() {
        let tokens = lex("ab\n  cd");
        assert_eq!(tokens[0].span.to_string(), "test (line 1, col 1-3)");
        // newline token ends on the next line
        assert_eq!(tokens[1].span.end_line(), 2);
        assert_eq!(tokens[3].span.start_line(), 2);
        assert_eq!(tokens[3].span.start_col(), 3);
        assert_eq!(tokens[3].span.end_col(), 5);
    }
}
