//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where nodes and diagnostics occur in source code.

use std::fmt;

/// A position in source code.
///
/// The upstream parser always knows the line of a node; the column is
/// optional and left at `0` when the producer does not track it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, `0` when unknown).
    pub col: u32,
}

impl Span {
    /// Create a new span from a line and column.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create a span that only knows its line.
    #[inline]
    pub fn line(line: u32) -> Self {
        Self { line, col: 0 }
    }

    /// Whether the column of this span is known.
    #[inline]
    pub fn has_col(&self) -> bool {
        self.col != 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_col() {
            write!(f, "line {}:{}", self.line, self.col)
        } else {
            write!(f, "line {}", self.line)
        }
    }
}
