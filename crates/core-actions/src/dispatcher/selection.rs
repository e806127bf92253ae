//! Yank ranges built from the carets' pending visual selections.

use core_state::{CaretSet, SelectionType, TextRange};
use core_text::TextHost;

/// Range covered by the carets' pending selections.
///
/// Block selections use the primary caret's anchor/head rectangle. Otherwise each
/// selecting caret contributes one inclusive span in caret order; carets without a
/// selection are skipped. `None` when nothing is selected.
pub fn selection_range(
    text: &dyn TextHost,
    carets: &CaretSet,
    kind: SelectionType,
) -> Option<TextRange> {
    if kind == SelectionType::BlockWise {
        let (anchor, head) = carets.primary()?.selection?;
        return Some(TextRange::block(text, anchor, head));
    }
    let len = text.len();
    TextRange::from_spans(carets.iter().filter_map(|caret| {
        let (anchor, head) = caret.selection?;
        Some((anchor.min(head), (anchor.max(head) + 1).min(len)))
    }))
}
