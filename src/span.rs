//! Source location tracking.
//!
//! Tokens and AST nodes carry a `Span` naming the region of the source
//! unit they came from. Machine-built nodes have no span at all, so
//! every span that exists points at real text.

use std::fmt;
use std::sync::Arc;

/// Rendering used for nodes that have no source position.
pub const UNKNOWN_POSITION: &str = "(unknown position)";

/// A region of text in a named source unit.
///
/// Lines and columns are 1-based. The end column is exclusive: it is
/// the column just past the last character of the region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    source: Arc<str>,
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

impl Span {
    #[must_use]
    pub const fn new(
        source: Arc<str>,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            source,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Name of the source unit this span points into.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn start_line(&self) -> usize {
        self.start_line
    }

    #[must_use]
    pub const fn start_col(&self) -> usize {
        self.start_col
    }

    #[must_use]
    pub const fn end_line(&self) -> usize {
        self.end_line
    }

    #[must_use]
    pub const fn end_col(&self) -> usize {
        self.end_col
    }

    /// Smallest span containing both `self` and `other`.
    ///
    /// Starts and ends are compared in document order, as
    /// `(line, column)` pairs. The source name is kept from `self`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let (start_line, start_col) =
            (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let (end_line, end_col) =
            (self.end_line, self.end_col).max((other.end_line, other.end_col));

        Self {
            source: Arc::clone(&self.source),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// True if `other` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        (self.start_line, self.start_col) <= (other.start_line, other.start_col)
            && (other.end_line, other.end_col) <= (self.end_line, self.end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.end_line {
            write!(
                f,
                "{} (line {}, col {}-{})",
                self.source, self.start_line, self.start_col, self.end_col
            )
        } else {
            write!(
                f,
                "{} (line {} col {} - line {} col {})",
                self.source, self.start_line, self.start_col, self.end_line, self.end_col
            )
        }
    }
}

/// Union of two optional spans, where an absent span is the identity.
#[must_use]
pub fn surrounding(first: Option<&Span>, last: Option<&Span>) -> Option<Span> {
    match (first, last) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Render an optional span, using [`UNKNOWN_POSITION`] when absent.
#[must_use]
pub fn describe(span: Option<&Span>) -> String {
    span.map_or_else(|| UNKNOWN_POSITION.to_string(), ToString::to_string)
}
