//! Editor model: one buffer plus the carets placed in it.
//!
//! The yank engine reads text and moves carets within the same call, so the model
//! hands out both halves at once through `split_text_and_carets` instead of asking
//! callers to juggle two borrows of `EditorModel`.
//!
//! Invariants (hold after every public call):
//! * Every caret offset is within `0..=buffer.len_chars()`.
//! * A model built with `new` has exactly one caret, at offset 0.

use core_state::{CaretHost, CaretId, CaretSet};
use core_text::{Buffer, TextHost};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EditorModel {
    buffer: Buffer,
    carets: CaretSet,
}

impl EditorModel {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            carets: CaretSet::from_offsets([0]),
        }
    }

    /// Model with carets at `offsets` in the given (native) order. Offsets past the end
    /// of the buffer are clamped.
    pub fn with_carets<I: IntoIterator<Item = usize>>(buffer: Buffer, offsets: I) -> Self {
        let len = buffer.len_chars();
        let carets = CaretSet::from_offsets(offsets.into_iter().map(|o| o.min(len)));
        debug!(target: "state.carets", carets = carets.len(), "model_carets_seeded");
        Self { buffer, carets }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn carets(&self) -> &CaretSet {
        &self.carets
    }

    pub fn carets_mut(&mut self) -> &mut CaretSet {
        &mut self.carets
    }

    /// Disjoint borrows of the buffer (read) and the carets (write).
    pub fn split_text_and_carets(&mut self) -> (&Buffer, &mut CaretSet) {
        (&self.buffer, &mut self.carets)
    }
}

impl TextHost for EditorModel {
    fn len(&self) -> usize {
        self.buffer.len()
    }
    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }
    fn line_of(&self, offset: usize) -> usize {
        self.buffer.line_of(offset)
    }
    fn line_start(&self, line: usize) -> usize {
        self.buffer.line_start(line)
    }
    fn line_end(&self, line: usize) -> usize {
        self.buffer.line_end(line)
    }
    fn slice(&self, start: usize, end: usize) -> String {
        self.buffer.slice(start, end)
    }
}

impl CaretHost for EditorModel {
    fn caret_ids(&self) -> Vec<CaretId> {
        self.carets.caret_ids()
    }
    fn primary_caret(&self) -> Option<CaretId> {
        self.carets.primary_caret()
    }
    fn caret_offset(&self, id: CaretId) -> Option<usize> {
        self.carets.caret_offset(id)
    }
    fn move_caret(&mut self, id: CaretId, offset: usize) -> bool {
        let offset = offset.min(self.buffer.len_chars());
        self.carets.move_caret(id, offset)
    }
    fn merge_duplicate_carets(&mut self) -> usize {
        self.carets.merge_duplicate_carets()
    }
}
