use std::fmt;

use crate::span::Span;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation.
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Backtick,
    Comma,

    /// Statement separator: `;` or a line ending.
    Line,
    /// A `\` that makes the following line ending insignificant.
    LineContinuation,
    /// Run of spaces and tabs.
    Whitespace,

    /// `// ...`
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `/// ...`
    DocComment,

    // Literals.
    Int,
    Bool,
    String,
    /// Label with a trailing colon, such as `x:` or `0:`.
    Field,

    /// Identifier or operator name.
    Name,

    // Keywords.
    And,
    As,
    Break,
    Case,
    Catch,
    Def,
    Defclass,
    Do,
    Else,
    End,
    Export,
    Fn,
    For,
    Import,
    If,
    In,
    Is,
    Match,
    Nothing,
    Only,
    Or,
    Return,
    Then,
    Throw,
    Val,
    Var,
    While,
    With,

    // Built-in operators.
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    EqEq,
    NotEq,

    Eof,
}

impl TokenKind {
    /// Kind for a reserved word or built-in operator text, if any.
    ///
    /// `true` and `false` are not here: they become `Bool` literals.
    #[must_use]
    pub fn reserved(text: &str) -> Option<Self> {
        let kind = match text {
            "and" => Self::And,
            "as" => Self::As,
            "break" => Self::Break,
            "case" => Self::Case,
            "catch" => Self::Catch,
            "def" => Self::Def,
            "defclass" => Self::Defclass,
            "do" => Self::Do,
            "else" => Self::Else,
            "end" => Self::End,
            "export" => Self::Export,
            "fn" => Self::Fn,
            "for" => Self::For,
            "import" => Self::Import,
            "if" => Self::If,
            "in" => Self::In,
            "is" => Self::Is,
            "match" => Self::Match,
            "nothing" => Self::Nothing,
            "only" => Self::Only,
            "or" => Self::Or,
            "return" => Self::Return,
            "then" => Self::Then,
            "throw" => Self::Throw,
            "val" => Self::Val,
            "var" => Self::Var,
            "while" => Self::While,
            "with" => Self::With,

            "+" => Self::Plus,
            "-" => Self::Minus,
            "*" => Self::Asterisk,
            "/" => Self::Slash,
            "%" => Self::Percent,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Lte,
            ">=" => Self::Gte,
            "=" => Self::Eq,
            "==" => Self::EqEq,
            "!=" => Self::NotEq,
            _ => return None,
        };
        Some(kind)
    }

    /// True for the built-in operator kinds, including `=`.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Asterisk
                | Self::Slash
                | Self::Percent
                | Self::Lt
                | Self::Gt
                | Self::Lte
                | Self::Gte
                | Self::Eq
                | Self::EqEq
                | Self::NotEq
        )
    }

    /// True for tokens the parser never sees.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::Backtick => "'`'",
            Self::Comma => "','",
            Self::Line => "end of line",
            Self::LineContinuation => "'\\'",
            Self::Whitespace => "whitespace",
            Self::LineComment | Self::BlockComment => "comment",
            Self::DocComment => "doc comment",
            Self::Int => "integer",
            Self::Bool => "boolean",
            Self::String => "string",
            Self::Field => "field label",
            Self::Name => "name",
            Self::And => "'and'",
            Self::As => "'as'",
            Self::Break => "'break'",
            Self::Case => "'case'",
            Self::Catch => "'catch'",
            Self::Def => "'def'",
            Self::Defclass => "'defclass'",
            Self::Do => "'do'",
            Self::Else => "'else'",
            Self::End => "'end'",
            Self::Export => "'export'",
            Self::Fn => "'fn'",
            Self::For => "'for'",
            Self::Import => "'import'",
            Self::If => "'if'",
            Self::In => "'in'",
            Self::Is => "'is'",
            Self::Match => "'match'",
            Self::Nothing => "'nothing'",
            Self::Only => "'only'",
            Self::Or => "'or'",
            Self::Return => "'return'",
            Self::Then => "'then'",
            Self::Throw => "'throw'",
            Self::Val => "'val'",
            Self::Var => "'var'",
            Self::While => "'while'",
            Self::With => "'with'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Asterisk => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::Lte => "'<='",
            Self::Gte => "'>='",
            Self::Eq => "'='",
            Self::EqEq => "'=='",
            Self::NotEq => "'!='",
            Self::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// Typed payload carried by literal, label, and comment tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    /// String contents with escapes resolved, a field label without its
    /// colon, or a trimmed comment body.
    String(String),
}

/// A single token with its kind, raw text, payload, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exactly the source text consumed for this token.
    pub text: String,
    pub value: Option<Literal>,
    pub span: Span,
}

impl Token {
    /// The string payload, if the token has one.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            Some(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn int_value(&self) -> Option<i64> {
        match self.value {
            Some(Literal::Int(n)) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn bool_value(&self) -> Option<bool> {
        match self.value {
            Some(Literal::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// True for a name made of operator characters, like `++` or `->`.
    #[must_use]
    pub fn is_operator_name(&self) -> bool {
        self.kind == TokenKind::Name && self.text.starts_with(is_operator_char)
    }
}

/// Characters that can begin an identifier.
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '.'
}

/// Characters that make up operator names.
#[must_use]
pub const fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '~' | '!' | '$' | '%' | '^' | '&' | '*' | '-' | '=' | '+' | '|' | '/' | '?' | '<' | '>'
    )
}

/// True if `text` lexes as a single plain name token.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_name_char)
        && chars.all(|c| is_name_char(c) || c.is_ascii_digit())
        && TokenKind::reserved(text).is_none()
        && !matches!(text, "true" | "false")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_reserved() {
        assert_eq!(TokenKind::reserved("defclass"), Some(TokenKind::Defclass));
        assert_eq!(TokenKind::reserved("while"), Some(TokenKind::While));
        assert_eq!(TokenKind::reserved("Defclass"), None);
    }

    #[test]
    fn operators_are_reserved() {
        assert_eq!(TokenKind::reserved("<="), Some(TokenKind::Lte));
        assert_eq!(TokenKind::reserved("!="), Some(TokenKind::NotEq));
        assert_eq!(TokenKind::reserved("++"), None);
    }

    #[test]
    fn booleans_are_not_keywords() {
        assert_eq!(TokenKind::reserved("true"), None);
        assert_eq!(TokenKind::reserved("false"), None);
    }

    #[test]
    fn operator_chars() {
        assert!("~!$%^&*-=+|/?<>".chars().all(is_operator_char));
        assert!(!is_operator_char(':'));
        assert!(!is_operator_char('#'));
    }
}
