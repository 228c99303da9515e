//! Expression grammar: records, operators, unary forms, and primaries.

use std::collections::HashSet;

use super::{ParseError, ParseErrorKind, Parser, between, binding_power, describe};
use crate::ast::Expr;
use crate::builder::positional_label;
use crate::pattern::{MatchCase, Pattern};
use crate::span::{Span, surrounding};
use crate::token::{Literal, Token, TokenKind, is_identifier};

/// Tokens after which a bare `return` has no value.
const fn ends_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Line
            | TokenKind::Eof
            | TokenKind::End
            | TokenKind::Else
            | TokenKind::Catch
            | TokenKind::Case
            | TokenKind::RightParen
            | TokenKind::RightBracket
            | TokenKind::Comma
    )
}

/// Text of `token` when it can sit between two operands.
fn infix_operator(token: &Token) -> Option<&str> {
    let infix = match token.kind {
        TokenKind::And | TokenKind::Or | TokenKind::Is => true,
        TokenKind::Eq => false,
        kind if kind.is_operator() => true,
        TokenKind::Name => token.is_operator_name() && !token.text.starts_with('~'),
        _ => false,
    };
    infix.then_some(token.text.as_str())
}

/// Text of `token` when it can start a prefix call.
fn prefix_operator(token: &Token) -> Option<&str> {
    let prefix = (token.kind.is_operator() && token.kind != TokenKind::Eq)
        || (token.is_operator_name() && !token.text.starts_with('~'));
    prefix.then_some(token.text.as_str())
}

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        match self.kind() {
            TokenKind::Var | TokenKind::Val => self.parse_var(),
            TokenKind::Def => self.parse_def(),
            TokenKind::Defclass => self.parse_class(),
            TokenKind::Import => self.parse_import(),
            // A bare `return` is an operand, parsed in `parse_primary`.
            TokenKind::Return if !ends_expression(self.peek_kind()) => {
                let keyword = self.advance();
                let value = self.parse_expression()?;
                let span = surrounding(Some(&keyword.span), value.span());
                Ok(Expr::return_(span, value))
            }
            TokenKind::Throw => {
                let keyword = self.advance();
                let value = self.parse_expression()?;
                let span = surrounding(Some(&keyword.span), value.span());
                Ok(Expr::throw(span, value))
            }
            TokenKind::Break => {
                let keyword = self.advance();
                Ok(Expr::break_(Some(keyword.span)))
            }
            _ => self.parse_assignment(),
        }
    }

    fn parse_var(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let doc = self.take_doc();
        let is_mutable = keyword.kind == TokenKind::Var;
        let pattern = self.parse_pattern()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = surrounding(Some(&keyword.span), value.span());
        Ok(Expr::var(span, is_mutable, pattern, value).with_doc(doc))
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let token = self.current();
        if token.kind == TokenKind::Name
            && !token.is_operator_name()
            && self.peek_kind() == TokenKind::Eq
        {
            let name = self.advance();
            self.advance();
            let value = self.parse_expression()?;
            let span = surrounding(Some(&name.span), value.span());
            return Ok(Expr::assign(span, name.text, value));
        }
        self.parse_record()
    }

    /// Comma-separated, optionally labelled entries. A lone unlabelled
    /// entry is returned as itself.
    fn parse_record(&mut self) -> Result<Expr, ParseError> {
        let mut entries = Vec::new();
        loop {
            let label = self.eat(TokenKind::Field);
            let value = self.parse_operator(0)?;
            entries.push((label, value));
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        if entries.len() == 1 && entries[0].0.is_none() {
            return Ok(entries.remove(0).1);
        }

        let start = entries.first().and_then(|(label, value)| entry_span(label.as_ref(), value));
        let end = entries.last().and_then(|(_, value)| value.span().cloned());
        let span = surrounding(start.as_ref(), end.as_ref());

        let mut seen = HashSet::new();
        let mut positional = 0;
        let mut fields = Vec::with_capacity(entries.len());
        for (label, value) in entries {
            let name = if let Some(label) = &label {
                label_text(label)
            } else {
                positional += 1;
                positional_label(positional - 1)
            };
            if !seen.insert(name.clone()) {
                return Err(ParseError {
                    kind: ParseErrorKind::DuplicateField { name },
                    span: entry_span(label.as_ref(), &value)
                        .unwrap_or_else(|| self.current().span.clone()),
                });
            }
            fields.push((name, value));
        }
        Ok(Expr::record(span, fields))
    }

    /// Precedence climbing over infix operators.
    pub(super) fn parse_operator(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            if self.at(TokenKind::Int) && self.current().text.starts_with('-') {
                // `a -1` lexes as `a` and `-1`: read it as `a - 1`.
                if binding_power("-").left < min_bp {
                    break;
                }
                self.split_negative_int()?;
            }

            let Some(op) = infix_operator(self.current()).map(str::to_string) else {
                break;
            };
            let bp = binding_power(&op);
            if bp.left < min_bp {
                break;
            }
            self.advance();

            let right = self.parse_operator(bp.right)?;
            left = match op.as_str() {
                "and" => Expr::and(left, right),
                "or" => Expr::or(left, right),
                _ => Expr::binary_call(left, op, right),
            };
        }

        Ok(left)
    }

    /// Replace a negative integer token with a `-` operator followed by
    /// the positive literal.
    fn split_negative_int(&mut self) -> Result<(), ParseError> {
        let token = self.current().clone();
        let Some(value) = token.int_value().and_then(i64::checked_neg) else {
            return Err(self.error(ParseErrorKind::IntegerOutOfRange {
                text: token.text[1..].to_string(),
            }));
        };
        let span = token.span;
        let minus = Token {
            kind: TokenKind::Minus,
            text: "-".to_string(),
            value: None,
            span: Span::new(
                span.source().into(),
                span.start_line(),
                span.start_col(),
                span.start_line(),
                span.start_col() + 1,
            ),
        };
        let literal = Token {
            kind: TokenKind::Int,
            text: token.text[1..].to_string(),
            value: Some(Literal::Int(value)),
            span: Span::new(
                span.source().into(),
                span.start_line(),
                span.start_col() + 1,
                span.end_line(),
                span.end_col(),
            ),
        };
        self.tokens[self.pos] = literal;
        self.tokens.insert(self.pos, minus);
        Ok(())
    }

    pub(super) fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();

        if token.kind == TokenKind::Backtick {
            self.advance();
            self.quote_depth += 1;
            let body = self.parse_unary();
            self.quote_depth -= 1;
            let body = body?;
            let span = surrounding(Some(&token.span), body.span());
            return Ok(Expr::quote(span, body));
        }

        if token.kind == TokenKind::Name && token.text.starts_with('~') {
            return self.parse_unquote(&token);
        }

        if self.peek_kind() != TokenKind::LeftParen {
            if let Some(op) = prefix_operator(&token) {
                let op = op.to_string();
                self.advance();
                let operand = self.parse_unary()?;
                return Ok(Expr::unary_call(Some(token.span), op, operand));
            }
        }

        self.parse_primary()
    }

    /// `~name`, `~(expr)`, and `~~...` for escaping nested quotes. Each
    /// `~` leaves one level of quotation while the operand is parsed.
    fn parse_unquote(&mut self, token: &Token) -> Result<Expr, ParseError> {
        let levels = token.text.chars().take_while(|&c| c == '~').count();
        if levels > self.quote_depth {
            return Err(self.error(ParseErrorKind::UnquoteOutsideQuote));
        }
        self.advance();

        let rest = &token.text[levels..];
        self.quote_depth -= levels;
        let operand = if rest.is_empty() {
            self.parse_unary()
        } else if !is_identifier(rest) {
            Err(ParseError {
                kind: ParseErrorKind::ExpectedExpression {
                    found: describe(token),
                },
                span: token.span.clone(),
            })
        } else {
            let span = Span::new(
                token.span.source().into(),
                token.span.start_line(),
                token.span.start_col() + levels,
                token.span.end_line(),
                token.span.end_col(),
            );
            Ok(Expr::name(Some(span), rest))
        };
        self.quote_depth += levels;

        let mut expr = operand?;
        for _ in 0..levels {
            let span = surrounding(Some(&token.span), expr.span());
            expr = Expr::unquote(span, expr);
        }
        Ok(expr)
    }

    pub(super) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int => {
                self.advance();
                let value = token.int_value().unwrap_or_default();
                Ok(Expr::int(Some(token.span), value))
            }
            TokenKind::Bool => {
                self.advance();
                let value = token.bool_value().unwrap_or_default();
                Ok(Expr::bool(Some(token.span), value))
            }
            TokenKind::String => {
                self.advance();
                let text = token.string_value().unwrap_or_default().to_string();
                Ok(Expr::string(Some(token.span), text))
            }
            TokenKind::Nothing => {
                self.advance();
                Ok(Expr::nothing(Some(token.span)))
            }
            TokenKind::Return if ends_expression(self.peek_kind()) => {
                self.advance();
                Ok(Expr::return_(Some(token.span), Expr::nothing(None)))
            }
            TokenKind::Name => {
                self.advance();
                if self.at(TokenKind::LeftParen) {
                    self.parse_call(token)
                } else {
                    Ok(Expr::name(Some(token.span), token.text))
                }
            }
            kind if kind.is_operator() && kind != TokenKind::Eq => {
                self.advance();
                self.parse_call(token)
            }
            TokenKind::LeftParen => {
                self.advance();
                let body = self.parse_block(&[TokenKind::RightParen], "parentheses")?;
                self.expect(TokenKind::RightParen)?;
                Ok(body)
            }
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::Fn => self.parse_fn(),
            TokenKind::If => self.parse_if(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Do => self.parse_do(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            _ => Err(self.error(ParseErrorKind::ExpectedExpression {
                found: describe(&token),
            })),
        }
    }

    /// `name(args)`, with the name already consumed.
    fn parse_call(&mut self, name: Token) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let argument = self.parse_block(&[TokenKind::RightParen], "argument list")?;
        let close = self.expect(TokenKind::RightParen)?;
        Ok(Expr::call(between(&name, &close), name.text, argument))
    }

    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let mut elements = Vec::new();
        self.skip_lines();
        while !self.at(TokenKind::RightBracket) {
            elements.push(self.parse_operator(0)?);
            self.skip_lines();
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
            self.skip_lines();
        }
        let close = self.expect(TokenKind::RightBracket)?;
        Ok(Expr::array(between(&open, &close), elements))
    }

    fn parse_fn(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let doc = self.take_doc();
        let pattern = if self.at(TokenKind::LeftParen) {
            self.parse_parameter()?
        } else {
            None
        };
        let body = self.parse_block(&[TokenKind::End], "fn")?;
        let end = self.expect(TokenKind::End)?;
        Ok(Expr::fn_(between(&keyword, &end), doc, pattern, body))
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let condition = self.parse_expression()?;
        self.skip_lines();
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_block(&[TokenKind::Else, TokenKind::End], "if")?;
        let else_branch = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_block(&[TokenKind::End], "if")?)
        } else {
            None
        };
        let end = self.expect(TokenKind::End)?;
        Ok(Expr::if_(
            between(&keyword, &end),
            condition,
            then_branch,
            else_branch,
        ))
    }

    fn parse_match(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let value = self.parse_expression()?;
        self.skip_lines();

        let mut cases = Vec::new();
        while self.eat(TokenKind::Case).is_some() {
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::Then)?;
            let body = self.parse_block(
                &[TokenKind::Case, TokenKind::Else, TokenKind::End],
                "match",
            )?;
            cases.push(MatchCase::new(Some(pattern), body));
        }
        if cases.is_empty() {
            return Err(self.error(ParseErrorKind::ExpectedToken {
                expected: TokenKind::Case,
                found: describe(self.current()),
            }));
        }
        if self.eat(TokenKind::Else).is_some() {
            let body = self.parse_block(&[TokenKind::End], "match")?;
            cases.push(MatchCase::catch_all(body));
        }
        let end = self.expect(TokenKind::End)?;
        Ok(Expr::match_(between(&keyword, &end), value, cases))
    }

    fn parse_do(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let body = self.parse_block(&[TokenKind::Catch, TokenKind::End], "do")?;
        let mut catches = Vec::new();
        while self.eat(TokenKind::Catch).is_some() {
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::Then)?;
            let handler = self.parse_block(&[TokenKind::Catch, TokenKind::End], "catch")?;
            catches.push(MatchCase::new(Some(pattern), handler));
        }
        let end = self.expect(TokenKind::End)?;
        Ok(Expr::scope(between(&keyword, &end), body, catches))
    }

    fn parse_while(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let condition = self.parse_expression()?;
        self.skip_lines();
        self.expect(TokenKind::Do)?;
        let body = self.parse_block(&[TokenKind::End], "while")?;
        let end = self.expect(TokenKind::End)?;
        Ok(Expr::while_(between(&keyword, &end), condition, body))
    }

    /// `for p in xs do body end` becomes a scope that asks `xs` for an
    /// iterator and loops while `next` says there is another element.
    fn parse_for(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let pattern = self.parse_pattern()?;
        self.expect(TokenKind::In)?;
        let sequence = self.parse_expression()?;
        self.skip_lines();
        self.expect(TokenKind::Do)?;
        let body = self.parse_block(&[TokenKind::End], "for")?;
        let end = self.expect(TokenKind::End)?;

        let iterator = format!("__for_iterator_{}", self.for_loops);
        self.for_loops += 1;

        let setup = Expr::var(
            None,
            false,
            Pattern::Variable(iterator.clone()),
            Expr::call(None, "iterate", sequence),
        );
        let bind = Expr::var(
            None,
            false,
            pattern,
            Expr::call(None, "current", Expr::name(None, iterator.as_str())),
        );
        let step = Expr::if_(
            None,
            Expr::call(None, "next", Expr::name(None, iterator)),
            Expr::sequence(vec![bind, body]),
            Some(Expr::break_(None)),
        );
        Ok(Expr::scope(
            between(&keyword, &end),
            Expr::sequence(vec![setup, Expr::loop_(None, step)]),
            Vec::new(),
        ))
    }
}

/// Where a record entry starts: its label if it has one.
fn entry_span(label: Option<&Token>, value: &Expr) -> Option<Span> {
    label.map(|t| t.span.clone()).or_else(|| value.span().cloned())
}

/// Label text of a FIELD token, without its colon.
pub(super) fn label_text(token: &Token) -> String {
    token
        .string_value()
        .map_or_else(|| token.text.trim_end_matches(':').to_string(), str::to_string)
}
