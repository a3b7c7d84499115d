//! Byte-level cursor for navigating WAT source.
//!
//! The cursor walks raw bytes so that string literals can carry arbitrary
//! byte sequences through untouched, while still tracking line and column
//! for error reporting.

use super::token::Span;

/// A saved position in source text.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    /// Byte offset from start of source.
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, counts characters).
    pub column: u32,
}

impl Position {
    /// Create a span from this position to another position.
    #[must_use]
    pub fn span_to(self, end: &Position) -> Span {
        Span::new(self.offset, end.offset, self.line, self.column)
    }

    /// Create a zero-length span at this position.
    #[must_use]
    pub fn span_here(self) -> Span {
        Span::new(self.offset, self.offset, self.line, self.column)
    }
}

/// A cursor over source bytes.
///
/// Columns advance once per UTF-8 scalar: continuation bytes do not move the
/// column, so error positions line up with what an editor shows.
pub struct Cursor<'a> {
    source: &'a [u8],
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Peek at the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.offset).copied()
    }

    /// Peek at the byte after the next one.
    pub fn peek_second(&self) -> Option<u8> {
        self.source.get(self.offset + 1).copied()
    }

    /// Whether the unread input starts with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.source[self.offset..].starts_with(prefix)
    }

    /// Consume and return the next byte, updating line and column.
    pub fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.offset += 1;

        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if b & 0xC0 != 0x80 {
            self.column += 1;
        }

        Some(b)
    }

    /// Consume bytes while the predicate holds, returning how many were consumed.
    pub fn skip_while(&mut self, predicate: impl Fn(u8) -> bool) -> usize {
        let mut count = 0;
        while let Some(b) = self.peek() {
            if !predicate(b) {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }

    /// Consume bytes while the predicate holds, returning them.
    pub fn take_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.offset;
        self.skip_while(predicate);
        &self.source[start..self.offset]
    }

    /// The bytes between a saved position and the current one.
    pub fn slice_from(&self, start: &Position) -> &'a [u8] {
        &self.source[start.offset..self.offset]
    }
}
