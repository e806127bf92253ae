//! Cursor motion helpers over char offsets.
//!
//! These operate purely on a `TextHost` + offset pair and are free of editor state.
//! Each helper leaves `pos` untouched when the motion cannot move, which lets the
//! resolver in `core-actions` report "no motion possible" by comparing offsets.

use crate::{TextHost, grapheme};

/// Number of lines a cursor may occupy. A trailing terminator does not open a
/// new addressable line.
pub fn effective_line_count<T: TextHost + ?Sized>(text: &T) -> usize {
    let count = text.line_count();
    if count > 1 && text.line_start(count - 1) == text.len() {
        count - 1
    } else {
        count
    }
}

fn byte_of_col(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(b, _)| b)
        .unwrap_or(line.len())
}

fn col_of_byte(line: &str, byte: usize) -> usize {
    line[..byte.min(line.len())].chars().count()
}

fn line_chars<T: TextHost + ?Sized>(text: &T, line: usize) -> Vec<char> {
    text.line_text(line).chars().collect()
}

/// Move left one grapheme boundary (stops at line start).
pub fn left<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let line = text.line_of(*pos);
    let start = text.line_start(line);
    let col = *pos - start;
    if col == 0 {
        return;
    }
    let content = text.line_text(line);
    let prev = grapheme::prev_boundary(&content, byte_of_col(&content, col));
    *pos = start + col_of_byte(&content, prev);
}

/// Move right one grapheme boundary (may land on the line end).
pub fn right<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let line = text.line_of(*pos);
    let start = text.line_start(line);
    let content = text.line_text(line);
    let byte = byte_of_col(&content, *pos - start);
    let next = grapheme::next_boundary(&content, byte);
    if next > byte {
        *pos = start + col_of_byte(&content, next);
    }
}

/// Move to start of line.
pub fn line_start<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    *pos = text.line_start_of(*pos);
}

/// Move to end of line (after last char, before the terminator).
pub fn line_end<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    *pos = text.line_end_of(*pos);
}

/// Move to the first non-blank char of the current line (line end if all blank).
pub fn first_non_blank<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let line = text.line_of(*pos);
    let chars = line_chars(text, line);
    let col = chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len());
    *pos = text.line_start(line) + col;
}

/// Move up one line keeping the char column (clamped to the target line length).
pub fn up<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let line = text.line_of(*pos);
    if line == 0 {
        return;
    }
    let col = text.column_of(*pos);
    let target = line - 1;
    let len = text.line_end(target) - text.line_start(target);
    *pos = text.line_start(target) + col.min(len);
}

/// Move down one line keeping the char column (clamped to the target line length).
pub fn down<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let line = text.line_of(*pos);
    if line + 1 >= effective_line_count(text) {
        return;
    }
    let col = text.column_of(*pos);
    let target = line + 1;
    let len = text.line_end(target) - text.line_start(target);
    *pos = text.line_start(target) + col.min(len);
}

/// Move forward to the start of the next word. Semantics (naive):
/// - If currently on a word char, advance past the current word, then skip any non-word chars,
///   landing on the first char of the next word.
/// - Empty lines are skipped; past the last word of the buffer the cursor lands on the final
///   line end.
pub fn word_forward<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let last_line = effective_line_count(text) - 1;
    let mut line = text.line_of(*pos);
    let mut chars = line_chars(text, line);
    let mut col = *pos - text.line_start(line);
    if col >= chars.len() {
        if line >= last_line {
            return;
        }
        line += 1;
        col = 0;
        chars = line_chars(text, line);
    }
    if col < chars.len() && grapheme::is_word_char(chars[col]) {
        while col < chars.len() && grapheme::is_word_char(chars[col]) {
            col += 1;
        }
    }
    loop {
        if col >= chars.len() {
            if line >= last_line {
                *pos = text.line_start(line) + chars.len();
                return;
            }
            line += 1;
            col = 0;
            chars = line_chars(text, line);
            continue;
        }
        if grapheme::is_word_char(chars[col]) {
            *pos = text.line_start(line) + col;
            return;
        }
        col += 1;
    }
}

/// Move forward to the last char of the current or next word. Does not move when no
/// further word exists.
pub fn word_end<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let len = text.len();
    let mut p = *pos + 1;
    while p < len && !text.char_at(p).is_some_and(grapheme::is_word_char) {
        p += 1;
    }
    if p >= len {
        return;
    }
    while p + 1 < len && text.char_at(p + 1).is_some_and(grapheme::is_word_char) {
        p += 1;
    }
    *pos = p;
}

/// Move backward to the start of the previous word. If currently at start of a word, move to
/// start of previous word.
pub fn word_backward<T: TextHost + ?Sized>(text: &T, pos: &mut usize) {
    let mut line = text.line_of(*pos);
    let mut chars = line_chars(text, line);
    let mut col = (*pos - text.line_start(line)).min(chars.len());
    loop {
        // Skip non-word chars backwards, wrapping to previous lines.
        while col > 0 && !grapheme::is_word_char(chars[col - 1]) {
            col -= 1;
        }
        if col > 0 {
            break;
        }
        if line == 0 {
            *pos = 0;
            return;
        }
        line -= 1;
        chars = line_chars(text, line);
        col = chars.len();
    }
    while col > 0 && grapheme::is_word_char(chars[col - 1]) {
        col -= 1;
    }
    *pos = text.line_start(line) + col;
}
