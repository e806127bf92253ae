//! Yank engine.
//!
//! Three entry points share one commit step:
//! * `yank_motion`: ask the resolver once per caret, skip carets without a result,
//!   aggregate, then commit with carets moved to the start of their ranges (except for
//!   the `_` motion).
//! * `yank_line`: one linewise range per caret from its line start through the end of
//!   the `count`-th line, clamped to the buffer.
//! * `yank_range`: an explicit range, linewise-snapped when needed, paired with carets.
//!
//! Commit order is fixed: move carets (then merge duplicates), notify observers once
//! with the aggregate range, then store every (caret, range) pair into one pending
//! register write and commit it. A failing store does not stop the others; the
//! operation reports `PartialStoreFailure` while the successful segments stay written.

use std::sync::Arc;

use core_config::Config;
use core_state::{
    CaretHost, CaretId, RegisterError, RegisterStore, SelectionType, TextRange,
};
use core_text::{TextHost, motion::effective_line_count};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::{MotionKind, MotionResolver, YankObservers, aggregate};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YankError {
    #[error("no carets to yank from")]
    NoCarets,
    #[error("no caret produced a range")]
    NoMotionResult,
    #[error("aggregated range is empty")]
    EmptyRange,
    #[error("{failed} of {total} register stores failed")]
    PartialStoreFailure { failed: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YankOperation {
    Motion,
    Line,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YankOptions {
    /// Drop zero-length per-caret motion results before aggregation.
    pub exclude_empty_caret_ranges: bool,
}

impl Default for YankOptions {
    fn default() -> Self {
        Self {
            exclude_empty_caret_ranges: true,
        }
    }
}

/// Outcome of a successful yank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YankReport {
    pub operation: YankOperation,
    /// Register the write was aimed at.
    pub register: char,
    /// Whether a register entry was written (false for the black hole register).
    pub committed: bool,
    pub selection_type: SelectionType,
    /// Aggregate range handed to observers.
    pub spans: Vec<(usize, usize)>,
    /// Number of (caret, range) pairs stored.
    pub stored: usize,
    pub carets_moved: bool,
    pub carets_merged: usize,
}

// Everything the commit step needs, computed before any state changes.
struct YankPlan {
    operation: YankOperation,
    pairs: Vec<(CaretId, TextRange)>,
    aggregate: TextRange,
    selection_type: SelectionType,
    start_offsets: Option<Vec<(CaretId, usize)>>,
}

#[derive(Debug)]
pub struct YankEngine {
    registers: RegisterStore,
    observers: Arc<YankObservers>,
    options: YankOptions,
}

impl Default for YankEngine {
    fn default() -> Self {
        Self::new(RegisterStore::new(), YankOptions::default())
    }
}

impl YankEngine {
    pub fn new(registers: RegisterStore, options: YankOptions) -> Self {
        Self {
            registers,
            observers: Arc::new(YankObservers::new()),
            options,
        }
    }

    /// Engine with the default register and yank options taken from `config`.
    pub fn from_config(config: &Config) -> Result<Self, RegisterError> {
        let registers = RegisterStore::with_default(config.file.registers.default)?;
        let options = YankOptions {
            exclude_empty_caret_ranges: config.file.yank.exclude_empty_caret_ranges,
        };
        Ok(Self::new(registers, options))
    }

    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    /// Select the register for the next yank only.
    pub fn select_register(&mut self, name: char) -> Result<(), RegisterError> {
        self.registers.select(name)
    }

    /// Shared observer list; observers may be added or removed at any time.
    pub fn observers(&self) -> &Arc<YankObservers> {
        &self.observers
    }

    pub fn try_yank_motion(
        &mut self,
        text: &dyn TextHost,
        carets: &mut dyn CaretHost,
        resolver: &dyn MotionResolver,
        motion: MotionKind,
        count: usize,
    ) -> Result<YankReport, YankError> {
        let ids = carets.caret_ids();
        if ids.is_empty() {
            return Err(YankError::NoCarets);
        }
        let selection_type = if resolver.is_linewise(motion) {
            SelectionType::LineWise
        } else {
            SelectionType::CharacterWise
        };
        let mut pairs = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(offset) = carets.caret_offset(id) else {
                continue;
            };
            let Some(range) = resolver.resolve(text, offset, motion, count) else {
                trace!(target: "actions.yank", caret = id.0, offset, ?motion, "caret_no_motion");
                continue;
            };
            if self.options.exclude_empty_caret_ranges && range.total_len() == 0 {
                trace!(target: "actions.yank", caret = id.0, offset, "caret_empty_range_skipped");
                continue;
            }
            pairs.push((id, range));
        }
        let per_caret: Vec<TextRange> = pairs.iter().map(|(_, r)| r.clone()).collect();
        let aggregate = aggregate(&per_caret, selection_type).ok_or(YankError::NoMotionResult)?;
        if aggregate.total_len() == 0 {
            return Err(YankError::EmptyRange);
        }
        let start_offsets = motion
            .repositions_carets()
            .then(|| pairs.iter().map(|(id, r)| (*id, r.natural_start())).collect());
        self.commit(
            text,
            carets,
            YankPlan {
                operation: YankOperation::Motion,
                selection_type: selection_type.for_range(&aggregate),
                pairs,
                aggregate,
                start_offsets,
            },
        )
    }

    pub fn yank_motion(
        &mut self,
        text: &dyn TextHost,
        carets: &mut dyn CaretHost,
        resolver: &dyn MotionResolver,
        motion: MotionKind,
        count: usize,
    ) -> bool {
        let result = self.try_yank_motion(text, carets, resolver, motion, count);
        succeeded(YankOperation::Motion, result)
    }

    pub fn try_yank_line(
        &mut self,
        text: &dyn TextHost,
        carets: &mut dyn CaretHost,
        count: usize,
    ) -> Result<YankReport, YankError> {
        let ids = carets.caret_ids();
        if ids.is_empty() {
            return Err(YankError::NoCarets);
        }
        let count = count.max(1);
        let last_line = effective_line_count(text).saturating_sub(1);
        let mut pairs = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(offset) = carets.caret_offset(id) else {
                continue;
            };
            let line = text.line_of(offset);
            let start = text.line_start(line);
            let end_line = line.saturating_add(count - 1).min(last_line);
            let end = (text.line_end(end_line) + 1).min(text.len());
            if end <= start {
                trace!(target: "actions.yank", caret = id.0, line, "caret_no_line");
                continue;
            }
            pairs.push((id, TextRange::new(start, end)));
        }
        let per_caret: Vec<TextRange> = pairs.iter().map(|(_, r)| r.clone()).collect();
        let aggregate = aggregate(&per_caret, SelectionType::LineWise)
            .ok_or(YankError::NoMotionResult)?;
        if aggregate.total_len() == 0 {
            return Err(YankError::EmptyRange);
        }
        self.commit(
            text,
            carets,
            YankPlan {
                operation: YankOperation::Line,
                pairs,
                aggregate,
                selection_type: SelectionType::LineWise,
                start_offsets: None,
            },
        )
    }

    pub fn yank_line(&mut self, text: &dyn TextHost, carets: &mut dyn CaretHost, count: usize) -> bool {
        let result = self.try_yank_line(text, carets, count);
        succeeded(YankOperation::Line, result)
    }

    /// Yank an explicit range. Linewise spans are first normalized and snapped out to
    /// whole lines. A block range, or a range whose span count differs from the caret
    /// count, is tracked as a single unit by the primary caret; otherwise caret `i`
    /// pairs with span `i`.
    pub fn try_yank_range(
        &mut self,
        text: &dyn TextHost,
        carets: &mut dyn CaretHost,
        range: &TextRange,
        selection_type: SelectionType,
        move_cursor: bool,
    ) -> Result<YankReport, YankError> {
        let ids = carets.caret_ids();
        if ids.is_empty() {
            return Err(YankError::NoCarets);
        }
        let effective = selection_type.for_range(range);
        let range = if selection_type.is_linewise() {
            snap_to_lines(text, range)
        } else {
            range.clone()
        };
        if range.total_len() == 0 {
            return Err(YankError::EmptyRange);
        }
        let pairs = if selection_type == SelectionType::BlockWise || range.span_count() != ids.len() {
            if selection_type != SelectionType::BlockWise {
                debug!(
                    target: "actions.yank",
                    spans = range.span_count(),
                    carets = ids.len(),
                    "range_tracked_by_primary"
                );
            }
            let primary = carets.primary_caret().ok_or(YankError::NoCarets)?;
            vec![(primary, range.clone())]
        } else {
            ids.iter()
                .zip(range.spans())
                .map(|(&id, &(start, end))| (id, TextRange::new(start, end)))
                .collect()
        };
        let start_offsets = move_cursor.then(|| {
            pairs
                .iter()
                .map(|(id, r)| (*id, r.natural_start()))
                .collect()
        });
        self.commit(
            text,
            carets,
            YankPlan {
                operation: YankOperation::Range,
                pairs,
                aggregate: range,
                selection_type: effective,
                start_offsets,
            },
        )
    }

    pub fn yank_range(
        &mut self,
        text: &dyn TextHost,
        carets: &mut dyn CaretHost,
        range: &TextRange,
        selection_type: SelectionType,
        move_cursor: bool,
    ) -> bool {
        let result = self.try_yank_range(text, carets, range, selection_type, move_cursor);
        succeeded(YankOperation::Range, result)
    }

    fn commit(
        &mut self,
        text: &dyn TextHost,
        carets: &mut dyn CaretHost,
        plan: YankPlan,
    ) -> Result<YankReport, YankError> {
        let mut carets_merged = 0;
        let carets_moved = plan.start_offsets.is_some();
        if let Some(starts) = &plan.start_offsets {
            let len = text.len();
            for &(id, offset) in starts {
                // Explicit ranges may point past the buffer; carets never do.
                let offset = offset.min(len);
                if !carets.move_caret(id, offset) {
                    debug!(target: "actions.yank", caret = id.0, offset, "caret_move_rejected");
                }
            }
            carets_merged = carets.merge_duplicate_carets();
        }

        self.observers.notify(text, &plan.aggregate);

        let total = plan.pairs.len();
        let mut failed = 0;
        let mut write = self.registers.begin_write(plan.selection_type);
        let register = write.target();
        for (id, range) in &plan.pairs {
            if let Err(e) = write.store(text, range) {
                warn!(target: "actions.yank", caret = id.0, error = %e, "store_failed");
                failed += 1;
            }
        }
        let committed = write.commit();
        info!(
            target: "actions.yank",
            operation = ?plan.operation,
            register = %register,
            selection_type = ?plan.selection_type,
            carets = total,
            failed,
            committed,
            carets_merged,
            "yank_committed"
        );
        if failed > 0 {
            return Err(YankError::PartialStoreFailure { failed, total });
        }
        Ok(YankReport {
            operation: plan.operation,
            register,
            committed,
            selection_type: plan.selection_type,
            spans: plan.aggregate.spans().to_vec(),
            stored: total,
            carets_moved,
            carets_merged,
        })
    }
}

// Whole-line view of `range`: a start off column 0 moves back to its line start, an
// end off column 0 moves forward past its line terminator (capped at buffer end).
fn snap_to_lines(text: &dyn TextHost, range: &TextRange) -> TextRange {
    let mut snapped = range.normalize();
    for idx in 0..snapped.span_count() {
        let (start, end) = snapped.spans()[idx];
        let start = if text.column_of(start) != 0 {
            text.line_start_of(start)
        } else {
            start
        };
        let end = if text.column_of(end) != 0 {
            (text.line_end_of(end) + 1).min(text.len())
        } else {
            end
        };
        snapped.set_span(idx, start, end);
    }
    snapped
}

fn succeeded(operation: YankOperation, result: Result<YankReport, YankError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            debug!(target: "actions.yank", ?operation, error = %e, "yank_failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferMotionResolver;
    use core_state::CaretSet;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn buffer(text: &str) -> Buffer {
        Buffer::from_str("test", text).unwrap()
    }

    #[test]
    fn no_carets_fails_every_entry_point() {
        let buf = buffer("abc");
        let mut carets = CaretSet::new();
        let mut engine = YankEngine::default();
        assert_eq!(
            engine.try_yank_line(&buf, &mut carets, 1),
            Err(YankError::NoCarets)
        );
        assert_eq!(
            engine.try_yank_motion(&buf, &mut carets, &BufferMotionResolver, MotionKind::Right, 1),
            Err(YankError::NoCarets)
        );
        assert!(!engine.yank_range(
            &buf,
            &mut carets,
            &TextRange::new(0, 1),
            SelectionType::CharacterWise,
            false
        ));
        assert_eq!(engine.registers().metrics().register_writes, 0);
    }

    #[test]
    fn motion_without_result_fails() {
        let buf = buffer("abc");
        let mut carets = CaretSet::from_offsets([0]);
        let mut engine = YankEngine::default();
        assert_eq!(
            engine.try_yank_motion(&buf, &mut carets, &BufferMotionResolver, MotionKind::Left, 1),
            Err(YankError::NoMotionResult)
        );
    }

    #[test]
    fn empty_explicit_range_fails_without_register_write() {
        let buf = buffer("abc");
        let mut carets = CaretSet::from_offsets([1]);
        let mut engine = YankEngine::default();
        assert_eq!(
            engine.try_yank_range(&buf, &mut carets, &TextRange::new(2, 2), SelectionType::CharacterWise, true),
            Err(YankError::EmptyRange)
        );
        assert!(engine.registers().last_register().is_none());
        assert_eq!(carets.offsets(), vec![1]);
    }

    #[test]
    fn linewise_snap_widens_to_whole_lines() {
        let buf = buffer("abc\ndef\nghi");
        let snapped = snap_to_lines(&buf, &TextRange::new(5, 1));
        assert_eq!(snapped.spans(), &[(0, 8)]);
        let tail = snap_to_lines(&buf, &TextRange::new(9, 10));
        assert_eq!(tail.spans(), &[(8, 11)]);
        let aligned = snap_to_lines(&buf, &TextRange::new(4, 8));
        assert_eq!(aligned.spans(), &[(4, 8)]);
    }

    #[test]
    fn empty_motion_results_can_be_kept() {
        struct Fixed;
        impl MotionResolver for Fixed {
            fn resolve(&self, _: &dyn TextHost, offset: usize, _: MotionKind, _: usize) -> Option<TextRange> {
                Some(if offset == 0 { TextRange::new(0, 0) } else { TextRange::new(offset, offset + 1) })
            }
        }
        let buf = buffer("abcdef");
        let mut keep = YankEngine::new(
            RegisterStore::new(),
            YankOptions {
                exclude_empty_caret_ranges: false,
            },
        );
        let mut carets = CaretSet::from_offsets([0, 3]);
        let report = keep
            .try_yank_motion(&buf, &mut carets, &Fixed, MotionKind::Right, 1)
            .unwrap();
        assert_eq!(report.spans, vec![(0, 0), (3, 4)]);
        assert_eq!(report.selection_type, SelectionType::BlockWise);

        let mut skip = YankEngine::default();
        let mut carets = CaretSet::from_offsets([0, 3]);
        let report = skip
            .try_yank_motion(&buf, &mut carets, &Fixed, MotionKind::Right, 1)
            .unwrap();
        assert_eq!(report.spans, vec![(3, 4)]);
        assert_eq!(report.selection_type, SelectionType::CharacterWise);
        assert_eq!(skip.registers().get('"').unwrap().text(), "d");
    }
}
