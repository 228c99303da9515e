//! Pretty-printer that serializes an expression tree back into canonical
//! source text.
//!
//! Output is tab-indented with one statement per line. Every infix call
//! is fully parenthesized, so printing never depends on precedence, and
//! printing the parse of printed text gives the same text again.

use std::fmt::Write as _;

use crate::ast::{Expr, ExprKind, ExprVisitor, Field, ImportParts};
use crate::builder::positional_label;
use crate::pattern::{MatchCase, Pattern};
use crate::token::{is_identifier, is_operator_char};

/// Format an expression tree as source text.
///
/// The root is printed as a top-level block: a `Sequence` puts each item
/// on its own line and `Nothing` prints as empty text.
#[must_use]
pub fn format(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.statements(expr, 0);
    printer.out
}

/// Render `text` as a string literal, escaping quotes, backslashes and
/// control characters.
#[must_use]
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// True for call names printed between their operands.
fn is_infix_name(name: &str) -> bool {
    name == "is" || (name.starts_with(is_operator_char) && !name.starts_with('~') && name != "=")
}

/// Whether `fields` is labelled `0`, `1`, ... and long enough to print
/// without labels.
fn is_positional<T>(fields: &[(String, T)]) -> bool {
    fields.len() >= 2
        && fields
            .iter()
            .enumerate()
            .all(|(i, (label, _))| *label == positional_label(i))
}

/// The two operands of an infix call, if the argument has that shape.
fn infix_operands<'a>(name: &str, argument: &'a Expr) -> Option<(&'a Expr, &'a Expr)> {
    if !is_infix_name(name) {
        return None;
    }
    match argument.kind() {
        ExprKind::Record(fields) if fields.len() == 2 && is_positional(fields) => {
            Some((&fields[0].1, &fields[1].1))
        }
        _ => None,
    }
}

/// Condition and branches of a match built by `if`.
fn if_shape<'a>(value: &'a Expr, cases: &'a [MatchCase]) -> Option<(&'a Expr, &'a Expr, &'a Expr)> {
    match cases {
        [
            MatchCase {
                pattern: Some(Pattern::Value(test)),
                body: then_branch,
            },
            MatchCase {
                pattern: None,
                body: else_branch,
            },
        ] if test.kind() == &ExprKind::Bool(true) && test.doc().is_empty() => {
            Some((value, then_branch, else_branch))
        }
        _ => None,
    }
}

/// Whether the expression can be printed as an operand without
/// surrounding parentheses.
fn is_atomic(expr: &Expr) -> bool {
    match expr.kind() {
        ExprKind::Name(name) => is_identifier(name),
        ExprKind::Assign { .. }
        | ExprKind::Break
        | ExprKind::Class { .. }
        | ExprKind::Import { .. }
        | ExprKind::Method { .. }
        | ExprKind::Return(_)
        | ExprKind::Throw(_)
        | ExprKind::Var { .. } => false,
        _ => true,
    }
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push('\t');
        }
    }

    fn expr(&mut self, expr: &Expr, indent: usize) {
        expr.accept(self, indent);
    }

    fn operand(&mut self, expr: &Expr, indent: usize) {
        if is_atomic(expr) {
            self.expr(expr, indent);
        } else {
            self.push("(");
            self.expr(expr, indent);
            self.push(")");
        }
    }

    /// Print a block's items, one per line, each preceded by its doc.
    fn statements(&mut self, expr: &Expr, indent: usize) {
        let items = match expr.kind() {
            ExprKind::Sequence(items) => items.iter().collect(),
            ExprKind::Nothing if expr.doc().is_empty() => Vec::new(),
            _ => vec![expr],
        };
        for item in items {
            self.doc(item.doc(), indent);
            self.indent(indent);
            self.expr(item, indent);
            self.out.push('\n');
        }
    }

    /// Body of a keyword form: a line break, the indented statements, and
    /// the indentation for the closing keyword.
    fn block(&mut self, expr: &Expr, indent: usize) {
        self.out.push('\n');
        self.statements(expr, indent + 1);
        self.indent(indent);
    }

    fn doc(&mut self, doc: &str, indent: usize) {
        for line in doc.lines() {
            self.indent(indent);
            if line.is_empty() {
                self.push("///\n");
            } else {
                let _ = writeln!(self.out, "/// {line}");
            }
        }
    }

    /// Type annotation: a name or generic call prints bare, anything
    /// else in parentheses.
    fn type_expr(&mut self, expr: &Expr, indent: usize) {
        let bare = match expr.kind() {
            ExprKind::Name(name) => is_identifier(name),
            ExprKind::Call { name, .. } => is_identifier(name),
            _ => false,
        };
        if bare {
            self.expr(expr, indent);
        } else {
            self.push("(");
            self.expr(expr, indent);
            self.push(")");
        }
    }

    fn record_fields(&mut self, fields: &[(String, Expr)], indent: usize) {
        let positional = is_positional(fields);
        for (i, (label, value)) in fields.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if !positional {
                let _ = write!(self.out, "{label}: ");
            }
            self.operand(value, indent);
        }
    }

    /// Print a pattern. Top-level record patterns need no parentheses.
    fn pattern(&mut self, pattern: &Pattern, indent: usize, nested: bool) {
        match pattern {
            Pattern::Wildcard => self.push("_"),
            Pattern::Variable(name) => self.push(name),
            Pattern::Value(value) => {
                if matches!(
                    value.kind(),
                    ExprKind::Int(_) | ExprKind::Bool(_) | ExprKind::String(_) | ExprKind::Nothing
                ) {
                    self.expr(value, indent);
                } else {
                    self.push("== ");
                    self.operand(value, indent);
                }
            }
            Pattern::Typed(name, type_expr) => {
                if name != "_" {
                    self.push(name);
                    self.push(" ");
                }
                self.push("is ");
                self.type_expr(type_expr, indent);
            }
            Pattern::Record(fields) => {
                if nested {
                    self.push("(");
                }
                let positional = is_positional(fields);
                for (i, (label, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    if !positional {
                        let _ = write!(self.out, "{label}: ");
                    }
                    self.pattern(field, indent, true);
                }
                if nested {
                    self.push(")");
                }
            }
        }
    }

    fn cases(&mut self, keyword: &str, cases: &[MatchCase], indent: usize) {
        for case in cases {
            self.indent(indent);
            if let Some(pattern) = &case.pattern {
                self.push(keyword);
                self.push(" ");
                self.pattern(pattern, indent, false);
                self.push(" then");
            } else {
                self.push("else");
            }
            self.out.push('\n');
            self.statements(&case.body, indent + 1);
        }
    }

    fn if_form(&mut self, condition: &Expr, then_branch: &Expr, else_branch: &Expr, indent: usize) {
        self.push("if ");
        self.expr(condition, indent);
        self.push(" then");
        self.block(then_branch, indent);
        let no_else =
            else_branch.kind() == &ExprKind::Nothing && else_branch.doc().is_empty();
        if !no_else {
            self.push("else");
            self.block(else_branch, indent);
        }
        self.push("end");
    }
}

impl ExprVisitor<(), usize> for Printer {
    fn visit_array(&mut self, _: &Expr, elements: &[Expr], indent: usize) {
        self.push("[");
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.operand(element, indent);
        }
        self.push("]");
    }

    fn visit_assign(&mut self, _: &Expr, name: &str, value: &Expr, indent: usize) {
        self.push(name);
        self.push(" = ");
        self.expr(value, indent);
    }

    fn visit_bool(&mut self, _: &Expr, value: bool, _: usize) {
        self.push(if value { "true" } else { "false" });
    }

    fn visit_break(&mut self, _: &Expr, _: usize) {
        self.push("break");
    }

    fn visit_call(&mut self, _: &Expr, name: &str, argument: &Expr, indent: usize) {
        if let Some((left, right)) = infix_operands(name, argument) {
            self.push("(");
            self.operand(left, indent);
            let _ = write!(self.out, " {name} ");
            self.operand(right, indent);
            self.push(")");
            return;
        }

        self.push(name);
        self.push("(");
        match argument.kind() {
            ExprKind::Nothing if argument.doc().is_empty() => {}
            ExprKind::Record(fields) if !fields.is_empty() => self.record_fields(fields, indent),
            ExprKind::Sequence(_) => self.block(argument, indent),
            _ => self.expr(argument, indent),
        }
        self.push(")");
    }

    fn visit_class(
        &mut self,
        _: &Expr,
        name: &str,
        parents: &[String],
        fields: &[Field],
        indent: usize,
    ) {
        self.push("defclass ");
        self.push(name);
        if !parents.is_empty() {
            self.push(" is ");
            self.push(&parents.join(", "));
        }
        self.out.push('\n');
        for field in fields {
            self.doc(&field.doc, indent + 1);
            self.indent(indent + 1);
            self.push(if field.is_mutable { "var " } else { "val " });
            self.push(&field.name);
            if let Some(type_expr) = &field.type_expr {
                self.push(" ");
                self.type_expr(type_expr, indent + 1);
            }
            if let Some(initializer) = &field.initializer {
                self.push(" = ");
                self.expr(initializer, indent + 1);
            }
            self.out.push('\n');
        }
        self.indent(indent);
        self.push("end");
    }

    fn visit_fn(&mut self, _: &Expr, pattern: Option<&Pattern>, body: &Expr, indent: usize) {
        self.push("fn(");
        if let Some(pattern) = pattern {
            self.pattern(pattern, indent, false);
        }
        self.push(")");
        self.block(body, indent);
        self.push("end");
    }

    fn visit_import(&mut self, _: &Expr, import: &ImportParts<'_>, indent: usize) {
        self.push("import ");
        if !import.scheme.is_empty() {
            let _ = write!(self.out, "{}: ", import.scheme);
        }
        if is_identifier(import.module) {
            self.push(import.module);
        } else {
            let quoted = quote_string(import.module);
            self.push(&quoted);
        }
        if !import.prefix.is_empty() {
            let _ = write!(self.out, " as {}", import.prefix);
        }
        if import.only {
            self.push(" only");
        }
        if !import.declarations.is_empty() {
            self.push(" with\n");
            for declaration in import.declarations {
                self.indent(indent + 1);
                if declaration.is_exported {
                    self.push("export ");
                }
                self.push(&declaration.name);
                if let Some(rename) = &declaration.rename {
                    let _ = write!(self.out, " as {rename}");
                }
                self.out.push('\n');
            }
            self.indent(indent);
            self.push("end");
        }
    }

    fn visit_int(&mut self, _: &Expr, value: i64, _: usize) {
        let _ = write!(self.out, "{value}");
    }

    fn visit_loop(&mut self, _: &Expr, body: &Expr, indent: usize) {
        let while_shape = match body.kind() {
            ExprKind::Match { value, cases } => if_shape(value, cases)
                .filter(|(_, _, otherwise)| otherwise.kind() == &ExprKind::Break),
            _ => None,
        };

        self.push("while ");
        if let Some((condition, then_branch, _)) = while_shape {
            self.expr(condition, indent);
            self.push(" do");
            self.block(then_branch, indent);
        } else {
            self.push("true do");
            self.block(body, indent);
        }
        self.push("end");
    }

    fn visit_match(&mut self, _: &Expr, value: &Expr, cases: &[MatchCase], indent: usize) {
        if let Some((condition, then_branch, else_branch)) = if_shape(value, cases) {
            self.if_form(condition, then_branch, else_branch, indent);
            return;
        }
        self.push("match ");
        self.expr(value, indent);
        self.out.push('\n');
        self.cases("case", cases, indent);
        self.indent(indent);
        self.push("end");
    }

    fn visit_method(
        &mut self,
        _: &Expr,
        name: &str,
        pattern: Option<&Pattern>,
        body: Option<&Expr>,
        indent: usize,
    ) {
        self.push("def ");
        self.push(name);
        if let Some(body) = body {
            self.push("(");
            if let Some(pattern) = pattern {
                self.pattern(pattern, indent, false);
            }
            self.push(")");
            self.block(body, indent);
            self.push("end");
        }
    }

    fn visit_name(&mut self, _: &Expr, name: &str, _: usize) {
        self.push(name);
    }

    fn visit_nothing(&mut self, _: &Expr, _: usize) {
        self.push("nothing");
    }

    fn visit_quote(&mut self, _: &Expr, body: &Expr, indent: usize) {
        self.push("`");
        self.operand(body, indent);
    }

    fn visit_record(&mut self, _: &Expr, fields: &[(String, Expr)], indent: usize) {
        self.push("(");
        self.record_fields(fields, indent);
        self.push(")");
    }

    fn visit_return(&mut self, _: &Expr, value: &Expr, indent: usize) {
        self.push("return");
        if value.kind() != &ExprKind::Nothing {
            self.push(" ");
            self.expr(value, indent);
        }
    }

    fn visit_scope(&mut self, _: &Expr, body: &Expr, catches: &[MatchCase], indent: usize) {
        self.push("do\n");
        self.statements(body, indent + 1);
        self.cases("catch", catches, indent);
        self.indent(indent);
        self.push("end");
    }

    fn visit_sequence(&mut self, expr: &Expr, _: &[Expr], indent: usize) {
        self.push("(");
        self.block(expr, indent);
        self.push(")");
    }

    fn visit_string(&mut self, _: &Expr, text: &str, _: usize) {
        let quoted = quote_string(text);
        self.push(&quoted);
    }

    fn visit_throw(&mut self, _: &Expr, value: &Expr, indent: usize) {
        self.push("throw ");
        self.expr(value, indent);
    }

    fn visit_unquote(&mut self, _: &Expr, value: &Expr, indent: usize) {
        match value.kind() {
            ExprKind::Name(name) if is_identifier(name) => {
                self.push("~");
                self.push(name);
            }
            _ => {
                self.push("~(");
                self.expr(value, indent);
                self.push(")");
            }
        }
    }

    fn visit_var(
        &mut self,
        _: &Expr,
        is_mutable: bool,
        pattern: &Pattern,
        value: &Expr,
        indent: usize,
    ) {
        self.push(if is_mutable { "var " } else { "val " });
        self.pattern(pattern, indent, false);
        self.push(" = ");
        self.expr(value, indent);
    }
}
