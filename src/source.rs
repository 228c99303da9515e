//! Text acquisition for the lexer.
//!
//! The lexer never touches files. It pulls characters through a
//! [`SourceReader`], which also names the unit for diagnostics.

/// A cursor over the characters of one source unit.
pub trait SourceReader {
    /// Human-readable name of the unit (usually a file path).
    fn description(&self) -> &str;

    /// The character under the cursor, or `'\0'` at end of input.
    fn current(&self) -> char;

    /// Move past the current character. Does nothing at end of input.
    fn advance(&mut self);
}

/// In-memory [`SourceReader`] over a string.
#[derive(Debug, Clone)]
pub struct StringReader {
    description: String,
    chars: Vec<char>,
    pos: usize,
}

impl StringReader {
    /// Create a reader over `text`. A leading byte-order mark is skipped.
    #[must_use]
    pub fn new(description: &str, text: &str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        Self {
            description: description.to_string(),
            chars: text.chars().collect(),
            pos: 0,
        }
    }
}

impl SourceReader for StringReader {
    fn description(&self) -> &str {
        &self.description
    }

    fn current(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if self.pos < self.chars.len() {
            self.pos += 1;
        }
    }
}
