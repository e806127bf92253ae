//! Rope-based text buffer abstraction and the host-buffer interface.
//!
//! All offsets are *char* offsets into the whole buffer. A line's end offset is
//! the offset of its terminator (or the buffer length for an unterminated final
//! line), so `line_end(l) + 1` is the first offset of the next line.

use anyhow::Result;
use ropey::Rope;

pub mod motion;

/// Read-only view of a text buffer as consumed by the yank engine and motions.
///
/// Object safe so observers can receive a `&dyn TextHost` regardless of the
/// concrete editor type.
pub trait TextHost {
    /// Total length in chars.
    fn len(&self) -> usize;
    /// Number of lines. A trailing terminator produces a final empty line.
    fn line_count(&self) -> usize;
    /// Line index containing `offset` (clamped to the buffer).
    fn line_of(&self, offset: usize) -> usize;
    /// Offset of the first char of `line` (clamped to the last line).
    fn line_start(&self, line: usize) -> usize;
    /// Offset of the terminator of `line`, or buffer length for the final line.
    fn line_end(&self, line: usize) -> usize;
    /// Text in `[start, end)`, clamped to the buffer. Empty when `start >= end`.
    fn slice(&self, start: usize, end: usize) -> String;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.slice(offset, offset + 1).chars().next()
    }

    fn line_start_of(&self, offset: usize) -> usize {
        self.line_start(self.line_of(offset))
    }

    fn line_end_of(&self, offset: usize) -> usize {
        self.line_end(self.line_of(offset))
    }

    /// Zero-based char column of `offset` within its line.
    fn column_of(&self, offset: usize) -> usize {
        offset.min(self.len()) - self.line_start_of(offset)
    }

    /// Line content without its terminator.
    fn line_text(&self, line: usize) -> String {
        self.slice(self.line_start(line), self.line_end(line))
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Debug, Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    // Char length of the terminator ending `idx` ("\r\n" counts as two).
    fn terminator_len(&self, idx: usize) -> usize {
        let line = self.rope.line(idx);
        let n = line.len_chars();
        if n == 0 {
            return 0;
        }
        match line.char(n - 1) {
            '\n' => {
                if n >= 2 && line.char(n - 2) == '\r' {
                    2
                } else {
                    1
                }
            }
            '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => 1,
            _ => 0,
        }
    }
}

impl TextHost for Buffer {
    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    fn line_start(&self, line: usize) -> usize {
        let last = self.rope.len_lines().saturating_sub(1);
        self.rope.line_to_char(line.min(last))
    }

    fn line_end(&self, line: usize) -> usize {
        let last = self.rope.len_lines().saturating_sub(1);
        let line = line.min(last);
        let start = self.rope.line_to_char(line);
        start + self.rope.line(line).len_chars() - self.terminator_len(line)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_chars();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        self.rope.slice(s..e).to_string()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }
}

/// Grapheme helpers operating on a single line (byte indices).
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Naive word classification: alphanumeric or underscore.
    pub fn is_word_char(c: char) -> bool {
        c == '_' || c.is_alphanumeric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_text(0), "hello");
        assert_eq!(b.line_text(1), "world");
    }

    #[test]
    fn line_boundaries_in_char_offsets() {
        let b = Buffer::from_str("t", "abcde\nabcde\n").unwrap();
        assert_eq!(b.len(), 12);
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.line_start_of(8), 6);
        assert_eq!(b.line_end_of(8), 11);
        assert_eq!(b.line_end(0), 5);
        assert_eq!(b.column_of(8), 2);
        // trailing empty line after the final terminator
        assert_eq!(b.line_start(2), 12);
        assert_eq!(b.line_end(2), 12);
    }

    #[test]
    fn multibyte_offsets_are_chars() {
        let b = Buffer::from_str("t", "κα\nλη").unwrap();
        assert_eq!(b.len(), 5);
        assert_eq!(b.line_start(1), 3);
        assert_eq!(b.slice(3, 5), "λη");
        assert_eq!(b.char_at(1), Some('α'));
    }

    #[test]
    fn crlf_terminator_excluded_from_line_end() {
        let b = Buffer::from_str("t", "ab\r\ncd").unwrap();
        assert_eq!(b.line_end(0), 2);
        assert_eq!(b.line_start(1), 4);
        assert_eq!(b.line_text(0), "ab");
    }

    #[test]
    fn slice_clamps_and_handles_inverted_bounds() {
        let b = Buffer::from_str("t", "abc").unwrap();
        assert_eq!(b.slice(1, 99), "bc");
        assert_eq!(b.slice(2, 1), "");
        assert_eq!(b.slice(5, 9), "");
    }

    #[test]
    fn grapheme_combining_mark() {
        let s = "e\u{301}x";
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(nb, 3);
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
    }
}
