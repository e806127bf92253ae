//! Multi-caret yank actions.
//!
//! Layering, leaves first:
//! * `span_resolver` turns (caret offset, motion, count) into one raw range.
//! * `range_aggregator` folds the per-caret ranges of one operation into a single
//!   multi-span `TextRange`.
//! * `yank` drives the whole operation: resolve, aggregate, reposition carets, notify
//!   observers, then write the register once.
//! * `dispatcher` maps an `Action` onto the engine for an `EditorModel`.

use core_state::{SelectionType, TextRange};
use core_text::TextHost;

pub mod dispatcher;
pub mod observer;
pub mod range_aggregator;
pub mod span_resolver;
pub mod yank;

pub use dispatcher::{DispatchResult, dispatch};
pub use observer::{YankObserver, YankObservers};
pub use range_aggregator::aggregate;
pub use span_resolver::BufferMotionResolver;
pub use yank::{YankEngine, YankError, YankOperation, YankOptions, YankReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Left,
    Right,
    LineStart,
    LineEnd,
    FirstNonBlank,
    WordForward,
    WordEnd,
    WordBackward,
    Up,
    Down,
    /// `+`
    DownFirstNonBlank,
    /// `-`
    UpFirstNonBlank,
    /// `_`: first non-blank of the line `count - 1` below.
    DownLess1FirstNonBlank,
}

impl MotionKind {
    pub fn is_linewise(self) -> bool {
        matches!(
            self,
            MotionKind::Up
                | MotionKind::Down
                | MotionKind::DownFirstNonBlank
                | MotionKind::UpFirstNonBlank
                | MotionKind::DownLess1FirstNonBlank
        )
    }

    /// Whether a yank over this motion moves carets to the start of their ranges.
    /// `_` already leaves the caret where Vim wants it.
    pub fn repositions_carets(self) -> bool {
        self != MotionKind::DownLess1FirstNonBlank
    }
}

/// Source of per-caret motion ranges.
pub trait MotionResolver {
    /// Range moved over by `motion` from `caret_offset`, in raw orientation, or `None`
    /// when the motion cannot move. Must return a single span.
    fn resolve(
        &self,
        text: &dyn TextHost,
        caret_offset: usize,
        motion: MotionKind,
        count: usize,
    ) -> Option<TextRange>;

    fn is_linewise(&self, motion: MotionKind) -> bool {
        motion.is_linewise()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YankTarget {
    Motion { motion: MotionKind, count: usize },
    Lines { count: usize },
    /// Yank the carets' pending selections as `kind`.
    Selection { kind: SelectionType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Yank {
        target: YankTarget,
        register: Option<char>,
    },
}
