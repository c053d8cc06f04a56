//! Positioned view over an immutable byte buffer
//!
//! [`ByteCursor`] is the only component that touches raw offsets. Every read
//! is bounds-checked: reading at the end of the buffer yields `None` instead
//! of failing. Backtracking goes through [`ByteCursor::checkpoint`] and
//! [`ByteCursor::restore`] so ambiguous productions stay auditable.

use super::{ParseError, ParseResult};
use bytes::Bytes;
use std::fmt;
use std::sync::OnceLock;

/// Location inside the parsed buffer, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// 0-based byte offset
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line, self.column, self.offset
        )
    }
}

/// Saved cursor offset, handed back to [`ByteCursor::restore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Checkpoint {
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Byte buffer plus a read position
#[derive(Debug, Clone)]
pub struct ByteCursor {
    bytes: Bytes,
    offset: usize,
    // Offsets where lines start, built on first use
    line_starts: OnceLock<Vec<usize>>,
}

impl ByteCursor {
    /// Create a cursor positioned at the start of `bytes`
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            offset: 0,
            line_starts: OnceLock::new(),
        }
    }

    /// Byte at the current position
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_ahead(0)
    }

    /// Byte `steps` positions after the current one
    #[inline]
    pub fn peek_ahead(&self, steps: usize) -> Option<u8> {
        self.offset
            .checked_add(steps)
            .and_then(|idx| self.bytes.get(idx))
            .copied()
    }

    /// Consume and return the current byte
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.offset += 1;
        Some(byte)
    }

    /// Whether the cursor is at or past the end of the buffer
    #[inline]
    pub fn done(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    /// Consume one byte, failing if it is not `expected`
    pub fn assert_next(&mut self, expected: u8) -> ParseResult<()> {
        let offset = self.offset;
        match self.next_byte() {
            Some(byte) if byte == expected => Ok(()),
            found => Err(ParseError::NextByteAssertion {
                position: self.position_at(offset),
                expected,
                found,
            }),
        }
    }

    /// Set the absolute position; `offset` may equal the buffer length
    pub fn move_to(&mut self, offset: usize) -> ParseResult<()> {
        if offset > self.bytes.len() {
            return Err(ParseError::InvalidOffset {
                offset,
                len: self.bytes.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.offset)
    }

    /// Return to a previously taken checkpoint
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint.0.min(self.bytes.len());
    }

    /// Shared view of `[start, end)`, clamped to the buffer
    pub fn slice(&self, start: usize, end: usize) -> Bytes {
        let end = end.min(self.bytes.len());
        let start = start.min(end);
        self.bytes.slice(start..end)
    }

    /// Current absolute offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Line/column/offset of the current position
    pub fn position(&self) -> Position {
        self.position_at(self.offset)
    }

    /// Line/column/offset of an arbitrary offset
    ///
    /// Lines are terminated by LF, CR, or CRLF. The line index is built
    /// once per buffer, so each lookup is a binary search and backtracking
    /// never leaves stale line counters behind.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.bytes.len());
        let starts = self.line_starts();
        // starts[0] == 0, so at least one line start precedes `offset`
        let mut line = starts.partition_point(|&start| start <= offset);
        let mut line_start = starts[line - 1];

        // On the LF of a CRLF the CR has already ended the line
        if offset > 0
            && self.bytes[offset - 1] == b'\r'
            && self.bytes.get(offset) == Some(&b'\n')
        {
            line += 1;
            line_start = offset;
        }
        Position::new(line, offset - line_start + 1, offset)
    }

    fn line_starts(&self) -> &[usize] {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            let mut idx = 0;
            while idx < self.bytes.len() {
                match self.bytes[idx] {
                    b'\n' => starts.push(idx + 1),
                    b'\r' => {
                        if self.bytes.get(idx + 1) == Some(&b'\n') {
                            idx += 1;
                        }
                        starts.push(idx + 1);
                    }
                    _ => {}
                }
                idx += 1;
            }
            starts
        })
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether `keyword` occurs at the current position, without consuming it
    pub fn starts_with(&self, keyword: &[u8]) -> bool {
        self.bytes
            .get(self.offset..)
            .is_some_and(|rest| rest.starts_with(keyword))
    }

    /// Advance past `count` bytes, stopping at the end of the buffer
    pub fn skip(&mut self, count: usize) {
        self.offset = self.offset.saturating_add(count).min(self.bytes.len());
    }
}
