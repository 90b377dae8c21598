//! Byte-offset to line/column mapping
//!
//! A `LineIndex` is built once per document and shared by every scanner that
//! needs to turn byte offsets into positions. `LocationOffset` translates
//! positions of inline documents into parent-document coordinates.

use crate::warnings::SourcePosition;

#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. Always begins with 0.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// 0-based position of a byte offset. Offsets past the end clamp to the
    /// end of the text.
    pub fn position(&self, offset: usize) -> SourcePosition {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        SourcePosition::new(line, offset - self.line_starts[line])
    }
}

/// Offset of an inline document's content inside its parent document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationOffset {
    pub line: usize,
    pub column: usize,
}

impl LocationOffset {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Translate an inline-document position into parent coordinates. The
    /// column offset only applies on the inline document's first line.
    pub fn translate(&self, pos: SourcePosition) -> SourcePosition {
        if pos.line == 0 {
            SourcePosition::new(self.line, self.column + pos.column)
        } else {
            SourcePosition::new(self.line + pos.line, pos.column)
        }
    }
}
