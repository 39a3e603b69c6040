//! Byte cursor for XML input

use crate::error::Pos;

/// Read position in a document, tracking line starts so error positions can
/// report a line and column
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
    line: u32,
    line_start: usize,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }

    pub fn current(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    /// Whether the unread input begins with `pattern`
    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.rest().starts_with(pattern)
    }

    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Move forward `count` bytes, stopping at the end of input
    pub fn advance_by(&mut self, count: usize) {
        let end = self.offset.saturating_add(count).min(self.input.len());
        let skipped = self.input.get(self.offset..end).unwrap_or_default();
        for (i, b) in skipped.iter().enumerate() {
            if *b == b'\n' {
                self.line = self.line.saturating_add(1);
                self.line_start = self.offset + i + 1;
            }
        }
        self.offset = end;
    }

    /// Skip XML whitespace (space, tab, CR, LF)
    pub fn skip_whitespace(&mut self) {
        let count = self
            .rest()
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .count();
        self.advance_by(count);
    }

    /// Advance past `expected` if it is the current byte
    pub fn consume(&mut self, expected: u8) -> bool {
        let found = self.current() == Some(expected);
        if found {
            self.advance();
        }
        found
    }

    /// Line and column of the current byte, both 1-based
    pub fn position(&self) -> Pos {
        let col = u32::try_from(self.offset - self.line_start + 1).unwrap_or(u32::MAX);
        Pos::new(self.offset, self.line, col)
    }

    pub fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    /// Current byte offset, for use with [`Cursor::slice_from`]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes from `start` up to the current offset
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.offset).unwrap_or_default()
    }

    fn rest(&self) -> &'a [u8] {
        self.input.get(self.offset..).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_after_newlines() {
        let mut cursor = Cursor::new(b"<a>\n  <b/>\n</a>");
        cursor.advance_by(6);
        let pos = cursor.position();
        assert_eq!((pos.offset, pos.line, pos.col), (6, 2, 3));
        assert_eq!(cursor.current(), Some(b'<'));
    }

    #[test]
    fn test_skip_whitespace_counts_lines() {
        let mut cursor = Cursor::new(b"  \r\n\t<deployment/>");
        cursor.skip_whitespace();
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().col, 2);
    }

    #[test]
    fn test_starts_with_and_consume() {
        let mut cursor = Cursor::new(b"<!-- x -->");
        assert!(cursor.starts_with(b"<!--"));
        assert!(!cursor.consume(b'!'));
        assert!(cursor.consume(b'<'));
        assert!(!cursor.starts_with(b"!-- x --> and more"));
    }

    #[test]
    fn test_slice_and_eof() {
        let mut cursor = Cursor::new(b"cluster");
        let start = cursor.offset();
        cursor.advance_by(100);
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.slice_from(start), b"cluster");
    }
}
