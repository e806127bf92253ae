//! Editing state shared by the yank engine: ranges, selection kinds, carets and registers.
//!
//! Ownership model:
//! - `TextRange` values are built fresh per operation and are immutable once handed to
//!   the register store.
//! - The caret collection belongs to the host editor (`CaretHost`); `CaretSet` is the
//!   in-process implementation used by `core-model`.
//! - `RegisterStore` is an explicit object owned by whoever drives the engine, so two
//!   editing sessions never share register state.

use serde::{Deserialize, Serialize};

pub mod caret;
pub mod range;
pub mod registers;

pub use caret::{Caret, CaretHost, CaretId, CaretSet};
pub use range::TextRange;
pub use registers::{
    PendingWrite, Register, RegisterError, RegisterMetricsSnapshot, RegisterStore,
};

/// Classification of a range, governing line snapping and register storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    CharacterWise,
    LineWise,
    BlockWise,
}

impl SelectionType {
    pub fn is_linewise(self) -> bool {
        matches!(self, SelectionType::LineWise)
    }

    /// Effective type for storing `range`. A character-wise range carrying several
    /// sub-ranges is stored as a block: once stored the two are indistinguishable.
    pub fn for_range(self, range: &TextRange) -> SelectionType {
        if self == SelectionType::CharacterWise && range.is_multiple() {
            SelectionType::BlockWise
        } else {
            self
        }
    }

    /// Type of the result when `other` is appended onto a register of this type.
    pub fn merged_with(self, other: SelectionType) -> SelectionType {
        if self.is_linewise() || other.is_linewise() {
            SelectionType::LineWise
        } else if self == SelectionType::BlockWise || other == SelectionType::BlockWise {
            SelectionType::BlockWise
        } else {
            SelectionType::CharacterWise
        }
    }
}
