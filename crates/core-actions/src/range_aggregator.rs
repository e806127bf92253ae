//! Folding per-caret motion ranges into one multi-span range.
//!
//! Input order is the caret collection's native order and the output keeps it: one
//! span per caret that produced a range. For a linewise operation every span but the
//! last has its end pulled back by one so internal line terminators are not counted
//! twice; the last span keeps its terminator. The rule is order sensitive, so callers
//! must not sort carets by offset first.

use core_state::{SelectionType, TextRange};

/// Combine per-caret ranges. Returns `None` when no caret produced a range.
///
/// # Panics
/// When any per-caret range carries more than one span. A resolver yields exactly one
/// span per caret per pass; anything else is a programming error.
pub fn aggregate(per_caret: &[TextRange], selection_type: SelectionType) -> Option<TextRange> {
    for range in per_caret {
        assert!(
            !range.is_multiple(),
            "caret range must be a single span, got {} spans",
            range.span_count()
        );
    }
    let last = per_caret.len().checked_sub(1)?;
    let linewise = selection_type.is_linewise();
    TextRange::from_spans(per_caret.iter().enumerate().map(|(i, range)| {
        let (start, end) = (range.start_offset(), range.end_offset());
        if linewise && i < last {
            (start, end.saturating_sub(1))
        } else {
            (start, end)
        }
    }))
}
