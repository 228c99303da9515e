//! Pattern grammar.

use std::collections::HashSet;

use super::expressions::label_text;
use super::{ParseError, ParseErrorKind, Parser, describe};
use crate::ast::Expr;
use crate::builder::positional_label;
use crate::pattern::Pattern;
use crate::token::{Token, TokenKind};

impl Parser {
    /// A pattern, or a record of comma-separated, optionally labelled
    /// patterns. Labels follow the same rules as record expressions.
    pub(super) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let mut entries: Vec<(Option<Token>, Pattern)> = Vec::new();
        loop {
            let label = self.eat(TokenKind::Field);
            let pattern = self.parse_pattern_entry()?;
            entries.push((label, pattern));
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        if entries.len() == 1 && entries[0].0.is_none() {
            return Ok(entries.remove(0).1);
        }

        let mut seen = HashSet::new();
        let mut positional = 0;
        let mut fields = Vec::with_capacity(entries.len());
        for (label, pattern) in entries {
            let name = if let Some(label) = &label {
                label_text(label)
            } else {
                positional += 1;
                positional_label(positional - 1)
            };
            if !seen.insert(name.clone()) {
                let span = label.map_or_else(|| self.current().span.clone(), |t| t.span);
                return Err(ParseError {
                    kind: ParseErrorKind::DuplicateField { name },
                    span,
                });
            }
            fields.push((name, pattern));
        }
        Ok(Pattern::Record(fields))
    }

    /// `(pattern)` as written after `fn` or `def`. Empty parentheses mean
    /// no pattern.
    pub(super) fn parse_parameter(&mut self) -> Result<Option<Pattern>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        self.skip_lines();
        let pattern = if self.at(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_pattern()?)
        };
        self.skip_lines();
        self.expect(TokenKind::RightParen)?;
        Ok(pattern)
    }

    fn parse_pattern_entry(&mut self) -> Result<Pattern, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Name if !token.is_operator_name() => {
                self.advance();
                let name = token.text;
                Ok(match self.parse_type_annotation()? {
                    None if name == "_" => Pattern::Wildcard,
                    None => Pattern::Variable(name),
                    Some(type_expr) => Pattern::typed(name, type_expr),
                })
            }
            TokenKind::Int | TokenKind::Bool | TokenKind::String | TokenKind::Nothing => {
                Ok(Pattern::value(self.parse_primary()?))
            }
            TokenKind::EqEq => {
                self.advance();
                Ok(Pattern::value(self.parse_unary()?))
            }
            TokenKind::Is => {
                self.advance();
                Ok(Pattern::typed("_".to_string(), self.parse_primary()?))
            }
            TokenKind::LeftParen => {
                self.advance();
                self.skip_lines();
                let pattern = self.parse_pattern()?;
                self.skip_lines();
                self.expect(TokenKind::RightParen)?;
                Ok(pattern)
            }
            _ => Err(self.error(ParseErrorKind::ExpectedPattern {
                found: describe(&token),
            })),
        }
    }

    /// Type after a bound name: `x Int`, `x (A | B)`, or `x is Int`.
    fn parse_type_annotation(&mut self) -> Result<Option<Expr>, ParseError> {
        let token = self.current();
        let starts_type = (token.kind == TokenKind::Name && !token.is_operator_name())
            || token.kind == TokenKind::LeftParen;
        if self.eat(TokenKind::Is).is_some() || starts_type {
            Ok(Some(self.parse_primary()?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Expr;
    use crate::lexer::tokenize;
    use crate::parser::{ParseErrorKind, parse};
    use crate::pattern::Pattern;

    /// Parse `val <pattern> = 0` and return the pattern.
    fn pattern(text: &str) -> Result<Pattern, ParseErrorKind> {
        let source = format!("val {text} = 0");
        let tokens = tokenize("test", &source).expect("should tokenize");
        let expr = parse(&tokens).map_err(|e| e.kind)?;
        match expr.into_kind() {
            crate::ast::ExprKind::Var { pattern, .. } => Ok(pattern),
            other => panic!("expected var, got {other:?}"),
        }
    }

    fn var(name: &str) -> Pattern {
        Pattern::Variable(name.to_string())
    }

    #[test]
    fn wildcard_and_variable() {
        assert_eq!(pattern("_"), Ok(Pattern::Wildcard));
        assert_eq!(pattern("x"), Ok(var("x")));
    }

    #[test]
    fn typed_forms() {
        let int = Expr::name(None, "Int");
        assert_eq!(pattern("x Int"), Ok(Pattern::typed("x".to_string(), int.clone())));
        assert_eq!(pattern("x is Int"), Ok(Pattern::typed("x".to_string(), int.clone())));
        assert_eq!(pattern("is Int"), Ok(Pattern::typed("_".to_string(), int.clone())));
        assert_eq!(pattern("_ Int"), Ok(Pattern::typed("_".to_string(), int)));
    }

    #[test]
    fn generic_type_is_a_call() {
        assert_eq!(
            pattern("xs List(Int)"),
            Ok(Pattern::typed(
                "xs".to_string(),
                Expr::call(None, "List", Expr::name(None, "Int"))
            ))
        );
    }

    #[test]
    fn literal_values() {
        assert_eq!(pattern("1"), Ok(Pattern::value(Expr::int(None, 1))));
        assert_eq!(
            pattern("\"a\""),
            Ok(Pattern::value(Expr::string(None, "a")))
        );
        assert_eq!(pattern("nothing"), Ok(Pattern::value(Expr::nothing(None))));
        assert_eq!(
            pattern("== limit"),
            Ok(Pattern::value(Expr::name(None, "limit")))
        );
    }

    #[test]
    fn record_pattern_labels() {
        assert_eq!(
            pattern("a, y: b, c"),
            Ok(Pattern::Record(vec![
                ("0".to_string(), var("a")),
                ("y".to_string(), var("b")),
                ("1".to_string(), var("c")),
            ]))
        );
    }

    #[test]
    fn nested_record_pattern() {
        assert_eq!(
            pattern("(a, b), c"),
            Ok(Pattern::Record(vec![
                (
                    "0".to_string(),
                    Pattern::Record(vec![("0".to_string(), var("a")), ("1".to_string(), var("b"))])
                ),
                ("1".to_string(), var("c")),
            ]))
        );
    }

    #[test]
    fn duplicate_pattern_label() {
        assert_eq!(
            pattern("x: a, x: b"),
            Err(ParseErrorKind::DuplicateField {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn not_a_pattern() {
        assert!(matches!(
            pattern("+"),
            Err(ParseErrorKind::ExpectedPattern { .. })
        ));
    }
}
