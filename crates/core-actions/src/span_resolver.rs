//! Motion span resolver.
//!
//! Given a caret offset, a `MotionKind`, and a `count`, this module computes the
//! char range the motion moves over, suitable for a yank. The resolver does not touch
//! editor state: it copies the offset and replays `core_text::motion` primitives on
//! the copy.
//!
//! * Character-wise motions keep raw orientation: a backward motion returns
//!   `start > end`. Ranges are exclusive except `WordEnd`, whose end includes the
//!   final char of the word.
//! * Vertical motions (`Up`, `Down`, `+`, `-`, `_`) are linewise and cover whole lines,
//!   from the start of the first touched line to just past the terminator of the last
//!   one (capped at buffer end).
//! * A motion that cannot move yields `None`. `_` with count 1 always succeeds since it
//!   targets the current line.

use crate::{MotionKind, MotionResolver};
use core_state::TextRange;
use core_text::{TextHost, motion};

/// Resolver over any `TextHost` using the `core_text::motion` primitives.
#[derive(Debug, Default, Clone, Copy)]
pub struct BufferMotionResolver;

impl MotionResolver for BufferMotionResolver {
    fn resolve(
        &self,
        text: &dyn TextHost,
        caret_offset: usize,
        motion_kind: MotionKind,
        count: usize,
    ) -> Option<TextRange> {
        let count = count.max(1);
        let start = caret_offset.min(text.len());
        if motion_kind.is_linewise() {
            return resolve_linewise(text, start, motion_kind, count);
        }
        let mut pos = start;
        for _ in 0..count {
            let before = pos;
            apply_motion_once(text, &mut pos, motion_kind);
            if pos == before {
                break;
            }
        }
        if motion_kind == MotionKind::WordForward {
            pos = clamp_word_forward(text, start, pos);
        }
        if pos == start {
            return None;
        }
        let end = if motion_kind == MotionKind::WordEnd {
            pos + 1
        } else {
            pos
        };
        Some(TextRange::new(start, end))
    }
}

fn apply_motion_once(text: &dyn TextHost, pos: &mut usize, kind: MotionKind) {
    match kind {
        MotionKind::Left => motion::left(text, pos),
        MotionKind::Right => motion::right(text, pos),
        MotionKind::LineStart => motion::line_start(text, pos),
        MotionKind::LineEnd => motion::line_end(text, pos),
        MotionKind::FirstNonBlank => motion::first_non_blank(text, pos),
        MotionKind::WordForward => motion::word_forward(text, pos),
        MotionKind::WordEnd => motion::word_end(text, pos),
        MotionKind::WordBackward => motion::word_backward(text, pos),
        MotionKind::Up
        | MotionKind::Down
        | MotionKind::DownFirstNonBlank
        | MotionKind::UpFirstNonBlank
        | MotionKind::DownLess1FirstNonBlank => {}
    }
}

// `yw` over the last word of a line stops at that line's end instead of taking the
// line break and the indentation of the next line.
fn clamp_word_forward(text: &dyn TextHost, start: usize, pos: usize) -> usize {
    let line = text.line_of(pos);
    if line == text.line_of(start) {
        return pos;
    }
    let leading = text.slice(text.line_start(line), pos);
    if leading.chars().all(char::is_whitespace) {
        text.line_end(line - 1).max(start)
    } else {
        pos
    }
}

fn resolve_linewise(
    text: &dyn TextHost,
    start: usize,
    kind: MotionKind,
    count: usize,
) -> Option<TextRange> {
    let line = text.line_of(start);
    let last = motion::effective_line_count(text).saturating_sub(1);
    let target = match kind {
        MotionKind::Up | MotionKind::UpFirstNonBlank => {
            if line == 0 {
                return None;
            }
            line.saturating_sub(count)
        }
        MotionKind::Down | MotionKind::DownFirstNonBlank => {
            if line >= last {
                return None;
            }
            line.saturating_add(count).min(last)
        }
        MotionKind::DownLess1FirstNonBlank => {
            if count > 1 && line >= last {
                return None;
            }
            line.saturating_add(count - 1).min(last.max(line))
        }
        _ => line,
    };
    let (first, final_line) = (line.min(target), line.max(target));
    let range_start = text.line_start(first);
    let range_end = (text.line_end(final_line) + 1).min(text.len());
    Some(TextRange::new(range_start, range_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    fn resolve(text: &str, caret: usize, kind: MotionKind, count: usize) -> Option<Vec<(usize, usize)>> {
        let buf = Buffer::from_str("test", text).unwrap();
        BufferMotionResolver
            .resolve(&buf, caret, kind, count)
            .map(|r| r.spans().to_vec())
    }

    #[test]
    fn selection_right_multiple() {
        assert_eq!(resolve("abcdef\n", 0, MotionKind::Right, 3), Some(vec![(0, 3)]));
    }

    #[test]
    fn word_forward_stops_at_buffer_end_for_last_word() {
        assert_eq!(resolve("one two", 0, MotionKind::WordForward, 1), Some(vec![(0, 4)]));
        assert_eq!(resolve("one two", 4, MotionKind::WordForward, 1), Some(vec![(4, 7)]));
        assert_eq!(
            resolve("one two three\n", 0, MotionKind::WordForward, 2),
            Some(vec![(0, 8)])
        );
    }

    #[test]
    fn word_forward_does_not_take_the_line_break() {
        assert_eq!(resolve("one\n  two", 0, MotionKind::WordForward, 1), Some(vec![(0, 3)]));
    }

    #[test]
    fn selection_left_no_movement() {
        assert_eq!(resolve("abc\n", 0, MotionKind::Left, 5), None);
    }

    #[test]
    fn backward_motion_keeps_orientation() {
        assert_eq!(resolve("one two", 6, MotionKind::WordBackward, 1), Some(vec![(6, 4)]));
        assert_eq!(resolve("abc def", 5, MotionKind::LineStart, 1), Some(vec![(5, 0)]));
    }

    #[test]
    fn word_end_is_inclusive() {
        assert_eq!(resolve("qwe asd zxc", 4, MotionKind::WordEnd, 1), Some(vec![(4, 7)]));
        assert_eq!(resolve("qwe asd zxc", 8, MotionKind::WordEnd, 1), Some(vec![(8, 11)]));
        assert_eq!(resolve("qwe", 2, MotionKind::WordEnd, 1), None);
    }

    #[test]
    fn line_end_stops_before_terminator() {
        assert_eq!(resolve("abc\nd", 1, MotionKind::LineEnd, 1), Some(vec![(1, 3)]));
        assert_eq!(resolve("\nabc", 0, MotionKind::LineEnd, 1), None);
    }

    #[test]
    fn vertical_motions_cover_whole_lines() {
        let text = "qwe\nrty\nasd\n";
        assert_eq!(resolve(text, 1, MotionKind::Down, 1), Some(vec![(0, 8)]));
        assert_eq!(resolve(text, 9, MotionKind::Up, 1), Some(vec![(4, 12)]));
        assert_eq!(resolve(text, 0, MotionKind::Down, 9), Some(vec![(0, 12)]));
        assert_eq!(resolve(text, 9, MotionKind::Down, 1), None);
        assert_eq!(resolve(text, 2, MotionKind::UpFirstNonBlank, 1), None);
    }

    #[test]
    fn down_less_one_targets_current_line_with_count_one() {
        let text = "qwe\nrty\nasd\n";
        assert_eq!(
            resolve(text, 9, MotionKind::DownLess1FirstNonBlank, 1),
            Some(vec![(8, 12)])
        );
        assert_eq!(
            resolve(text, 1, MotionKind::DownLess1FirstNonBlank, 2),
            Some(vec![(0, 8)])
        );
        assert_eq!(resolve(text, 9, MotionKind::DownLess1FirstNonBlank, 2), None);
    }

    #[test]
    fn huge_count_stops_once_motion_is_stuck() {
        let started = std::time::Instant::now();
        assert_eq!(resolve("abc", 0, MotionKind::Right, usize::MAX), Some(vec![(0, 3)]));
        assert_eq!(
            resolve("one two", 0, MotionKind::WordForward, usize::MAX),
            Some(vec![(0, 7)])
        );
        assert_eq!(resolve("one two", 6, MotionKind::WordBackward, usize::MAX), Some(vec![(6, 0)]));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn huge_count_linewise_clamps() {
        let text = "qwe\nrty\nasd\n";
        assert_eq!(resolve(text, 1, MotionKind::Down, usize::MAX), Some(vec![(0, 12)]));
        assert_eq!(resolve(text, 9, MotionKind::Up, usize::MAX), Some(vec![(0, 12)]));
        assert_eq!(
            resolve(text, 1, MotionKind::DownLess1FirstNonBlank, usize::MAX),
            Some(vec![(0, 12)])
        );
    }

    #[test]
    fn unterminated_last_line_caps_at_buffer_end() {
        assert_eq!(resolve("ab\ncd", 0, MotionKind::Down, 1), Some(vec![(0, 5)]));
    }
}
