//! Named constructors for every node kind.
//!
//! These are the only way to make an [`Expr`]. Shorthand forms (infix
//! calls, positional records, `if`, `while`, `and`/`or`) and the
//! collapsing of short sequences happen here and nowhere else.

use crate::ast::{Expr, ExprKind, Field, ImportDeclaration};
use crate::pattern::{MatchCase, Pattern};
use crate::span::{Span, surrounding};

impl Expr {
    const fn new(span: Option<Span>, kind: ExprKind) -> Self {
        Self {
            kind,
            span,
            doc: String::new(),
        }
    }

    /// Attach documentation to the node.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub const fn array(span: Option<Span>, elements: Vec<Self>) -> Self {
        Self::new(span, ExprKind::Array(elements))
    }

    #[must_use]
    pub fn assign(span: Option<Span>, name: impl Into<String>, value: Self) -> Self {
        Self::new(
            span,
            ExprKind::Assign {
                name: name.into(),
                value: Box::new(value),
            },
        )
    }

    #[must_use]
    pub const fn bool(span: Option<Span>, value: bool) -> Self {
        Self::new(span, ExprKind::Bool(value))
    }

    #[must_use]
    pub const fn break_(span: Option<Span>) -> Self {
        Self::new(span, ExprKind::Break)
    }

    #[must_use]
    pub fn call(span: Option<Span>, name: impl Into<String>, argument: Self) -> Self {
        Self::new(
            span,
            ExprKind::Call {
                name: name.into(),
                argument: Box::new(argument),
            },
        )
    }

    /// `left op right`: a call whose argument is the record `(left, right)`.
    #[must_use]
    pub fn binary_call(left: Self, op: impl Into<String>, right: Self) -> Self {
        let span = surrounding(left.span(), right.span());
        Self::call(span, op, Self::positional_record(vec![left, right]))
    }

    /// Prefix `op operand`: the record is `(operand, nothing)`.
    #[must_use]
    pub fn unary_call(op_span: Option<Span>, op: impl Into<String>, operand: Self) -> Self {
        let span = surrounding(op_span.as_ref(), operand.span());
        Self::call(
            span,
            op,
            Self::positional_record(vec![operand, Self::nothing(None)]),
        )
    }

    #[must_use]
    pub fn class(
        span: Option<Span>,
        doc: impl Into<String>,
        name: impl Into<String>,
        parents: Vec<String>,
        fields: Vec<Field>,
    ) -> Self {
        Self::new(
            span,
            ExprKind::Class {
                name: name.into(),
                parents,
                fields,
            },
        )
        .with_doc(doc)
    }

    #[must_use]
    pub fn fn_(
        span: Option<Span>,
        doc: impl Into<String>,
        pattern: Option<Pattern>,
        body: Self,
    ) -> Self {
        Self::new(
            span,
            ExprKind::Fn {
                pattern,
                body: Box::new(body),
            },
        )
        .with_doc(doc)
    }

    /// `if condition then then_branch else else_branch end`, as a
    /// two-case match. A missing else branch is `nothing`.
    #[must_use]
    pub fn if_(
        span: Option<Span>,
        condition: Self,
        then_branch: Self,
        else_branch: Option<Self>,
    ) -> Self {
        let else_branch = else_branch.unwrap_or_else(|| Self::nothing(None));
        let span = span.or_else(|| surrounding(condition.span(), else_branch.span()));
        let cases = vec![
            MatchCase::new(Some(Pattern::value(Self::bool(None, true))), then_branch),
            MatchCase::catch_all(else_branch),
        ];
        Self::match_(span, condition, cases)
    }

    /// `left and right`: `right` only runs when `left` is true.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        let span = surrounding(left.span(), right.span());
        Self::if_(span, left, right, Some(Self::bool(None, false)))
    }

    /// `left or right`: `right` only runs when `left` is not true.
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        let span = surrounding(left.span(), right.span());
        Self::if_(span, left, Self::bool(None, true), Some(right))
    }

    #[must_use]
    pub fn import(
        span: Option<Span>,
        scheme: impl Into<String>,
        module: impl Into<String>,
        prefix: impl Into<String>,
        only: bool,
        declarations: Vec<ImportDeclaration>,
    ) -> Self {
        Self::new(
            span,
            ExprKind::Import {
                scheme: scheme.into(),
                module: module.into(),
                prefix: prefix.into(),
                only,
                declarations,
            },
        )
    }

    #[must_use]
    pub const fn int(span: Option<Span>, value: i64) -> Self {
        Self::new(span, ExprKind::Int(value))
    }

    #[must_use]
    pub fn loop_(span: Option<Span>, body: Self) -> Self {
        Self::new(span, ExprKind::Loop(Box::new(body)))
    }

    /// `while condition do body end`: loop until the condition is not true.
    #[must_use]
    pub fn while_(span: Option<Span>, condition: Self, body: Self) -> Self {
        let test = Self::if_(
            span.clone(),
            condition,
            body,
            Some(Self::break_(None)),
        );
        Self::loop_(span, test)
    }

    #[must_use]
    pub fn match_(span: Option<Span>, value: Self, cases: Vec<MatchCase>) -> Self {
        Self::new(
            span,
            ExprKind::Match {
                value: Box::new(value),
                cases,
            },
        )
    }

    #[must_use]
    pub fn method(
        span: Option<Span>,
        doc: impl Into<String>,
        name: impl Into<String>,
        pattern: Option<Pattern>,
        body: Option<Self>,
    ) -> Self {
        Self::new(
            span,
            ExprKind::Method {
                name: name.into(),
                pattern,
                body: body.map(Box::new),
            },
        )
        .with_doc(doc)
    }

    #[must_use]
    pub fn name(span: Option<Span>, name: impl Into<String>) -> Self {
        Self::new(span, ExprKind::Name(name.into()))
    }

    #[must_use]
    pub const fn nothing(span: Option<Span>) -> Self {
        Self::new(span, ExprKind::Nothing)
    }

    #[must_use]
    pub fn quote(span: Option<Span>, body: Self) -> Self {
        Self::new(span, ExprKind::Quote(Box::new(body)))
    }

    /// Record with explicit labels, kept in the given order.
    #[must_use]
    pub const fn record(span: Option<Span>, fields: Vec<(String, Self)>) -> Self {
        Self::new(span, ExprKind::Record(fields))
    }

    /// Record labelled `"0"`, `"1"`, ... in order. The span surrounds
    /// the first and last values.
    #[must_use]
    pub fn positional_record(values: Vec<Self>) -> Self {
        let span = surrounding(
            values.first().and_then(Self::span),
            values.last().and_then(Self::span),
        );
        let fields = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| (positional_label(i), value))
            .collect();
        Self::record(span, fields)
    }

    #[must_use]
    pub fn return_(span: Option<Span>, value: Self) -> Self {
        Self::new(span, ExprKind::Return(Box::new(value)))
    }

    /// A `do` block. The span is the body's unless one is given.
    #[must_use]
    pub fn scope(span: Option<Span>, body: Self, catches: Vec<MatchCase>) -> Self {
        let span = span.or_else(|| body.span.clone());
        Self::new(
            span,
            ExprKind::Scope {
                body: Box::new(body),
                catches,
            },
        )
    }

    /// No items is `nothing`; one item is that item itself.
    #[must_use]
    pub fn sequence(mut items: Vec<Self>) -> Self {
        match items.len() {
            0 => Self::nothing(None),
            1 => items.remove(0),
            _ => {
                let span = surrounding(
                    items.first().and_then(Self::span),
                    items.last().and_then(Self::span),
                );
                Self::new(span, ExprKind::Sequence(items))
            }
        }
    }

    #[must_use]
    pub fn string(span: Option<Span>, text: impl Into<String>) -> Self {
        Self::new(span, ExprKind::String(text.into()))
    }

    #[must_use]
    pub fn throw(span: Option<Span>, value: Self) -> Self {
        Self::new(span, ExprKind::Throw(Box::new(value)))
    }

    #[must_use]
    pub fn unquote(span: Option<Span>, value: Self) -> Self {
        Self::new(span, ExprKind::Unquote(Box::new(value)))
    }

    #[must_use]
    pub fn var(span: Option<Span>, is_mutable: bool, pattern: Pattern, value: Self) -> Self {
        Self::new(
            span,
            ExprKind::Var {
                is_mutable,
                pattern,
                value: Box::new(value),
            },
        )
    }
}

/// Label of the `index`th positional record field.
#[must_use]
pub fn positional_label(index: usize) -> String {
    index.to_string()
}

impl Pattern {
    /// Matches values equal to `value`.
    #[must_use]
    pub fn value(value: Expr) -> Self {
        Self::Value(Box::new(value))
    }

    /// Binds `name` after checking the value against `type_expr`.
    #[must_use]
    pub fn typed(name: impl Into<String>, type_expr: Expr) -> Self {
        Self::Typed(name.into(), Box::new(type_expr))
    }
}

impl MatchCase {
    #[must_use]
    pub const fn new(pattern: Option<Pattern>, body: Expr) -> Self {
        Self { pattern, body }
    }

    /// The arm taken when no other case matches.
    #[must_use]
    pub const fn catch_all(body: Expr) -> Self {
        Self::new(None, body)
    }
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, is_mutable: bool) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            is_mutable,
            type_expr: None,
            initializer: None,
        }
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub fn type_expr(mut self, type_expr: Expr) -> Self {
        self.type_expr = Some(type_expr);
        self
    }

    #[must_use]
    pub fn initializer(mut self, initializer: Expr) -> Self {
        self.initializer = Some(initializer);
        self
    }
}

impl ImportDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            is_exported: false,
            name: name.into(),
            rename: None,
        }
    }

    #[must_use]
    pub const fn exported(mut self) -> Self {
        self.is_exported = true;
        self
    }

    #[must_use]
    pub fn rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }
}
