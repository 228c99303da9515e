//! Expression tree produced by the parser.
//!
//! Every construct of the language is one [`ExprKind`] variant. Nodes
//! are built only through the named constructors in the builder module,
//! so sugar such as `if` or infix calls is resolved once, when the node
//! is made.

use crate::pattern::{MatchCase, Pattern};
use crate::span::Span;

/// An expression node: a kind, its source span, and documentation.
///
/// Equality compares kind and doc only. Spans are metadata, so a parsed
/// tree equals the same tree built by hand.
#[derive(Debug, Clone)]
pub struct Expr {
    pub(crate) kind: ExprKind,
    pub(crate) span: Option<Span>,
    pub(crate) doc: String,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.doc == other.doc
    }
}

impl Eq for Expr {}

/// The closed set of expression variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `name = value`
    Assign { name: String, value: Box<Expr> },
    Bool(bool),
    Break,
    /// `name(argument)`. Infix and prefix operator uses are calls whose
    /// argument is a two-field record.
    Call { name: String, argument: Box<Expr> },
    /// `defclass Name is Parent ... end`
    Class {
        name: String,
        parents: Vec<String>,
        fields: Vec<Field>,
    },
    /// `fn(pattern) body end`
    Fn {
        pattern: Option<Pattern>,
        body: Box<Expr>,
    },
    /// `import scheme: module as prefix only with ... end`
    Import {
        scheme: String,
        module: String,
        prefix: String,
        only: bool,
        declarations: Vec<ImportDeclaration>,
    },
    Int(i64),
    Loop(Box<Expr>),
    Match {
        value: Box<Expr>,
        cases: Vec<MatchCase>,
    },
    /// `def name(pattern) body end`. A bare `def name` declares the
    /// method without a pattern or body.
    Method {
        name: String,
        pattern: Option<Pattern>,
        body: Option<Box<Expr>>,
    },
    Name(String),
    Nothing,
    Quote(Box<Expr>),
    /// Ordered, uniquely labelled fields.
    Record(Vec<(String, Expr)>),
    Return(Box<Expr>),
    /// `do body catch pattern then handler end`
    Scope {
        body: Box<Expr>,
        catches: Vec<MatchCase>,
    },
    /// Always two or more items.
    Sequence(Vec<Expr>),
    String(String),
    Throw(Box<Expr>),
    Unquote(Box<Expr>),
    /// `var pattern = value` (mutable) or `val pattern = value`.
    Var {
        is_mutable: bool,
        pattern: Pattern,
        value: Box<Expr>,
    },
}

/// Field declaration inside a `defclass`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub doc: String,
    pub is_mutable: bool,
    pub type_expr: Option<Expr>,
    pub initializer: Option<Expr>,
}

/// One name pulled in by an `import ... with` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub is_exported: bool,
    pub name: String,
    pub rename: Option<String>,
}

impl Expr {
    #[must_use]
    pub const fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Source span, or `None` for machine-built nodes.
    #[must_use]
    pub const fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    /// Documentation attached by a `///` comment, or empty.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Take the node apart, keeping its kind.
    #[must_use]
    pub fn into_kind(self) -> ExprKind {
        self.kind
    }

    /// Direct sub-expressions, in source order.
    ///
    /// Includes expressions embedded in patterns, cases, and class
    /// fields.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match &self.kind {
            ExprKind::Bool(_)
            | ExprKind::Break
            | ExprKind::Import { .. }
            | ExprKind::Int(_)
            | ExprKind::Name(_)
            | ExprKind::Nothing
            | ExprKind::String(_) => Vec::new(),

            ExprKind::Array(items) | ExprKind::Sequence(items) => items.iter().collect(),

            ExprKind::Assign { value, .. }
            | ExprKind::Call {
                argument: value, ..
            }
            | ExprKind::Loop(value)
            | ExprKind::Quote(value)
            | ExprKind::Return(value)
            | ExprKind::Throw(value)
            | ExprKind::Unquote(value) => vec![value.as_ref()],

            ExprKind::Class { fields, .. } => fields
                .iter()
                .flat_map(|f| f.type_expr.iter().chain(f.initializer.iter()))
                .collect(),

            ExprKind::Fn { pattern, body } => {
                let mut children = pattern.iter().flat_map(Pattern::expressions).collect::<Vec<_>>();
                children.push(body);
                children
            }

            ExprKind::Match { value, cases } => {
                let mut children = vec![value.as_ref()];
                push_cases(&mut children, cases);
                children
            }

            ExprKind::Method { pattern, body, .. } => {
                let mut children = pattern.iter().flat_map(Pattern::expressions).collect::<Vec<_>>();
                children.extend(body.as_deref());
                children
            }

            ExprKind::Record(fields) => fields.iter().map(|(_, value)| value).collect(),

            ExprKind::Scope { body, catches } => {
                let mut children = vec![body.as_ref()];
                push_cases(&mut children, catches);
                children
            }

            ExprKind::Var { pattern, value, .. } => {
                let mut children = pattern.expressions();
                children.push(value);
                children
            }
        }
    }

    /// Visit this node and every descendant in pre-order.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&Self),
    {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Dispatch to the visitor method for this node's variant.
    pub fn accept<R, C, V>(&self, visitor: &mut V, context: C) -> R
    where
        V: ExprVisitor<R, C> + ?Sized,
    {
        match &self.kind {
            ExprKind::Array(elements) => visitor.visit_array(self, elements, context),
            ExprKind::Assign { name, value } => visitor.visit_assign(self, name, value, context),
            ExprKind::Bool(value) => visitor.visit_bool(self, *value, context),
            ExprKind::Break => visitor.visit_break(self, context),
            ExprKind::Call { name, argument } => visitor.visit_call(self, name, argument, context),
            ExprKind::Class {
                name,
                parents,
                fields,
            } => visitor.visit_class(self, name, parents, fields, context),
            ExprKind::Fn { pattern, body } => {
                visitor.visit_fn(self, pattern.as_ref(), body, context)
            }
            ExprKind::Import {
                scheme,
                module,
                prefix,
                only,
                declarations,
            } => visitor.visit_import(
                self,
                &ImportParts {
                    scheme,
                    module,
                    prefix,
                    only: *only,
                    declarations,
                },
                context,
            ),
            ExprKind::Int(value) => visitor.visit_int(self, *value, context),
            ExprKind::Loop(body) => visitor.visit_loop(self, body, context),
            ExprKind::Match { value, cases } => visitor.visit_match(self, value, cases, context),
            ExprKind::Method {
                name,
                pattern,
                body,
            } => visitor.visit_method(self, name, pattern.as_ref(), body.as_deref(), context),
            ExprKind::Name(name) => visitor.visit_name(self, name, context),
            ExprKind::Nothing => visitor.visit_nothing(self, context),
            ExprKind::Quote(body) => visitor.visit_quote(self, body, context),
            ExprKind::Record(fields) => visitor.visit_record(self, fields, context),
            ExprKind::Return(value) => visitor.visit_return(self, value, context),
            ExprKind::Scope { body, catches } => visitor.visit_scope(self, body, catches, context),
            ExprKind::Sequence(items) => visitor.visit_sequence(self, items, context),
            ExprKind::String(text) => visitor.visit_string(self, text, context),
            ExprKind::Throw(value) => visitor.visit_throw(self, value, context),
            ExprKind::Unquote(value) => visitor.visit_unquote(self, value, context),
            ExprKind::Var {
                is_mutable,
                pattern,
                value,
            } => visitor.visit_var(self, *is_mutable, pattern, value, context),
        }
    }
}

fn push_cases<'a>(children: &mut Vec<&'a Expr>, cases: &'a [MatchCase]) {
    for case in cases {
        if let Some(pattern) = &case.pattern {
            children.extend(pattern.expressions());
        }
        children.push(&case.body);
    }
}

/// Borrowed fields of an `Import` node, handed to [`ExprVisitor::visit_import`].
#[derive(Debug, Clone, Copy)]
pub struct ImportParts<'a> {
    pub scheme: &'a str,
    pub module: &'a str,
    pub prefix: &'a str,
    pub only: bool,
    pub declarations: &'a [ImportDeclaration],
}

/// Double-dispatch traversal over [`Expr`], returning `R` and threading
/// a caller-chosen context `C`.
///
/// Each method receives the node itself (for its span and doc) followed
/// by the variant's fields.
pub trait ExprVisitor<R, C> {
    fn visit_array(&mut self, expr: &Expr, elements: &[Expr], context: C) -> R;
    fn visit_assign(&mut self, expr: &Expr, name: &str, value: &Expr, context: C) -> R;
    fn visit_bool(&mut self, expr: &Expr, value: bool, context: C) -> R;
    fn visit_break(&mut self, expr: &Expr, context: C) -> R;
    fn visit_call(&mut self, expr: &Expr, name: &str, argument: &Expr, context: C) -> R;
    fn visit_class(
        &mut self,
        expr: &Expr,
        name: &str,
        parents: &[String],
        fields: &[Field],
        context: C,
    ) -> R;
    fn visit_fn(&mut self, expr: &Expr, pattern: Option<&Pattern>, body: &Expr, context: C) -> R;
    fn visit_import(&mut self, expr: &Expr, import: &ImportParts<'_>, context: C) -> R;
    fn visit_int(&mut self, expr: &Expr, value: i64, context: C) -> R;
    fn visit_loop(&mut self, expr: &Expr, body: &Expr, context: C) -> R;
    fn visit_match(&mut self, expr: &Expr, value: &Expr, cases: &[MatchCase], context: C) -> R;
    fn visit_method(
        &mut self,
        expr: &Expr,
        name: &str,
        pattern: Option<&Pattern>,
        body: Option<&Expr>,
        context: C,
    ) -> R;
    fn visit_name(&mut self, expr: &Expr, name: &str, context: C) -> R;
    fn visit_nothing(&mut self, expr: &Expr, context: C) -> R;
    fn visit_quote(&mut self, expr: &Expr, body: &Expr, context: C) -> R;
    fn visit_record(&mut self, expr: &Expr, fields: &[(String, Expr)], context: C) -> R;
    fn visit_return(&mut self, expr: &Expr, value: &Expr, context: C) -> R;
    fn visit_scope(&mut self, expr: &Expr, body: &Expr, catches: &[MatchCase], context: C) -> R;
    fn visit_sequence(&mut self, expr: &Expr, items: &[Expr], context: C) -> R;
    fn visit_string(&mut self, expr: &Expr, text: &str, context: C) -> R;
    fn visit_throw(&mut self, expr: &Expr, value: &Expr, context: C) -> R;
    fn visit_unquote(&mut self, expr: &Expr, value: &Expr, context: C) -> R;
    fn visit_var(
        &mut self,
        expr: &Expr,
        is_mutable: bool,
        pattern: &Pattern,
        value: &Expr,
        context: C,
    ) -> R;
}
