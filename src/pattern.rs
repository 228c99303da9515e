//! Destructuring templates used by `match`, `fn`, `def`, `var` and `val`.

use crate::ast::Expr;

/// A template a value is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `_`: matches anything, binds nothing.
    Wildcard,
    /// Binds the whole value to a name.
    Variable(String),
    /// Matches values equal to the expression.
    Value(Box<Expr>),
    /// Matches a record with these fields, in declaration order.
    Record(Vec<(String, Pattern)>),
    /// Binds a name after checking the value against a type expression.
    /// The name is `_` when nothing is bound.
    Typed(String, Box<Expr>),
}

impl Pattern {
    /// Names this pattern binds, in order of appearance.
    #[must_use]
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Variable(name) | Self::Typed(name, _) if name != "_" => names.push(name),
            Self::Record(fields) => {
                for (_, field) in fields {
                    field.collect_names(names);
                }
            }
            _ => {}
        }
    }

    /// Expressions embedded in the pattern (values and types).
    pub(crate) fn expressions(&self) -> Vec<&Expr> {
        match self {
            Self::Wildcard | Self::Variable(_) => Vec::new(),
            Self::Value(expr) | Self::Typed(_, expr) => vec![&**expr],
            Self::Record(fields) => fields.iter().flat_map(|(_, p)| p.expressions()).collect(),
        }
    }
}

/// One arm of a `match`, or one `catch` clause of a `do` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCase {
    /// `None` marks the catch-all (`else`) arm.
    pub pattern: Option<Pattern>,
    pub body: Expr,
}
