//! Multi-span offset ranges.
//!
//! A `TextRange` carries one `(start, end)` pair per caret (or per block line). Raw pairs
//! keep the orientation of the motion that produced them: a backward motion yields
//! `start > end`. `normalize` returns a canonical copy with every pair ascending and never
//! touches the original, so the caller can still tell which way the motion ran.

use core_text::TextHost;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    spans: SmallVec<[(usize, usize); 1]>,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        let mut spans = SmallVec::new();
        spans.push((start, end));
        Self { spans }
    }

    /// Build a range from one or more spans. Returns `None` for an empty input.
    pub fn from_spans<I>(spans: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let spans: SmallVec<[(usize, usize); 1]> = spans.into_iter().collect();
        if spans.is_empty() {
            None
        } else {
            Some(Self { spans })
        }
    }

    /// Rectangular range covering the lines between `anchor` and `head` and the columns
    /// between them inclusive of both corners. Short lines contribute a clamped (possibly
    /// empty) span.
    pub fn block<T: TextHost + ?Sized>(text: &T, anchor: usize, head: usize) -> Self {
        let (a_line, h_line) = (text.line_of(anchor), text.line_of(head));
        let (a_col, h_col) = (text.column_of(anchor), text.column_of(head));
        let (first, last) = (a_line.min(h_line), a_line.max(h_line));
        let (left, right) = (a_col.min(h_col), a_col.max(h_col) + 1);
        let spans = (first..=last).map(|line| {
            let start = text.line_start(line);
            let len = text.line_end(line) - start;
            (start + left.min(len), start + right.min(len))
        });
        Self {
            spans: spans.collect(),
        }
    }

    pub fn spans(&self) -> &[(usize, usize)] {
        &self.spans
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn is_multiple(&self) -> bool {
        self.spans.len() > 1
    }

    /// Raw start of the first span.
    pub fn start_offset(&self) -> usize {
        self.spans[0].0
    }

    /// Raw end of the last span.
    pub fn end_offset(&self) -> usize {
        self.spans[self.spans.len() - 1].1
    }

    /// Canonical copy with every span ascending.
    pub fn normalize(&self) -> TextRange {
        Self {
            spans: self
                .spans
                .iter()
                .map(|&(s, e)| (s.min(e), s.max(e)))
                .collect(),
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.spans.iter().all(|&(s, e)| s <= e)
    }

    /// Offset a caret lands on when repositioned to this range: the lower bound of the
    /// first span, whichever way it was produced.
    pub fn natural_start(&self) -> usize {
        let (s, e) = self.spans[0];
        s.min(e)
    }

    /// Sum of span lengths.
    pub fn total_len(&self) -> usize {
        self.spans.iter().map(|&(s, e)| s.abs_diff(e)).sum()
    }

    pub fn set_span(&mut self, idx: usize, start: usize, end: usize) {
        self.spans[idx] = (start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use proptest::prelude::*;

    #[test]
    fn backward_span_keeps_orientation() {
        let r = TextRange::new(7, 3);
        assert!(!r.is_normalized());
        assert_eq!(r.start_offset(), 7);
        assert_eq!(r.natural_start(), 3);
        let n = r.normalize();
        assert_eq!(n.spans(), &[(3, 7)]);
        assert_eq!(r.spans(), &[(7, 3)], "original untouched");
    }

    #[test]
    fn empty_span_list_is_rejected() {
        assert!(TextRange::from_spans(Vec::new()).is_none());
    }

    #[test]
    fn total_len_sums_all_spans() {
        let r = TextRange::from_spans([(0, 4), (9, 6)]).unwrap();
        assert_eq!(r.total_len(), 7);
        assert_eq!(r.end_offset(), 6);
    }

    #[test]
    fn block_range_clamps_short_lines() {
        let buf = Buffer::from_str("t", "abcdef\nab\nabcdef\n").unwrap();
        // anchor on line 0 col 1, head on line 2 col 3
        let r = TextRange::block(&buf, 1, 10 + 3);
        assert_eq!(r.spans(), &[(1, 4), (8, 9), (11, 14)]);
    }

    #[test]
    fn block_range_is_orientation_independent() {
        let buf = Buffer::from_str("t", "abcdef\nabcdef\n").unwrap();
        let a = TextRange::block(&buf, 2, 7 + 4);
        let b = TextRange::block(&buf, 7 + 4, 2);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(spans in prop::collection::vec((0usize..500, 0usize..500), 1..8)) {
            let r = TextRange::from_spans(spans).unwrap();
            let once = r.normalize();
            prop_assert!(once.is_normalized());
            prop_assert_eq!(once.normalize(), once.clone());
            prop_assert_eq!(once.total_len(), r.total_len());
            prop_assert_eq!(once.span_count(), r.span_count());
        }
    }
}
