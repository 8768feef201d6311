//! Line/column positions.
//!
//! Byte offsets are what the tree stores; line/column pairs are what error
//! messages report. [`LineIndex`] converts between the two.

use text_size::{TextRange, TextSize};

/// A span representing a range in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Offsets of line starts, for offset → line/column conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Position of `offset`. Offsets past the end clamp to the end of text.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        Position::new(line, u32::from(column) as usize)
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
