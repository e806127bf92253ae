//! Register store.
//!
//! A multi-caret operation produces exactly one register write. Callers open a
//! `PendingWrite`, hand it every (caret, range) pair through `store`, then `commit`
//! once. Per-caret `store` failures leave the other segments in place; nothing reaches
//! the register table until `commit`.
//!
//! Names:
//! - `"` unnamed; every commit is mirrored here.
//! - `0` yank register; receives unnamed yanks.
//! - `a`-`z` named; `A`-`Z` append to the lowercase slot.
//! - `1`-`9` plain writable slots.
//! - `_` black hole; accepts stores, commits nothing.
//! - `.`, `:`, `%`, `#` are read-only.

use std::collections::HashMap;

use core_text::TextHost;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{SelectionType, TextRange};

pub const UNNAMED: char = '"';
pub const YANK: char = '0';
pub const BLACK_HOLE: char = '_';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("invalid register name {0:?}")]
    Invalid(char),
    #[error("register {0:?} is read-only")]
    ReadOnly(char),
    #[error("range {start}..{end} exceeds buffer length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Captured text plus the selection type it was captured with.
///
/// `segments` hold one extracted span each, in caret order (or line order for a
/// block range). `text()` is their concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Register {
    name: char,
    selection_type: SelectionType,
    segments: Vec<String>,
}

impl Register {
    pub fn new(name: char, selection_type: SelectionType, segments: Vec<String>) -> Self {
        Self {
            name,
            selection_type,
            segments,
        }
    }

    pub fn name(&self) -> char {
        self.name
    }

    pub fn selection_type(&self) -> SelectionType {
        self.selection_type
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn text(&self) -> String {
        self.segments.concat()
    }

    fn renamed(&self, name: char) -> Register {
        Register {
            name,
            ..self.clone()
        }
    }

    fn append(&mut self, incoming: Register) {
        let merged = self.selection_type.merged_with(incoming.selection_type);
        if merged.is_linewise()
            && let Some(last) = self.segments.last_mut()
            && !last.ends_with('\n')
        {
            last.push('\n');
        }
        self.segments.extend(incoming.segments);
        self.selection_type = merged;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMetricsSnapshot {
    pub register_writes: u64,
    pub appends: u64,
    pub segments_stored: u64,
    pub store_failures: u64,
}

#[derive(Debug, Default, Clone)]
struct RegisterMetrics {
    register_writes: u64,
    appends: u64,
    segments_stored: u64,
    store_failures: u64,
}

impl RegisterMetrics {
    fn snapshot(&self) -> RegisterMetricsSnapshot {
        RegisterMetricsSnapshot {
            register_writes: self.register_writes,
            appends: self.appends,
            segments_stored: self.segments_stored,
            store_failures: self.store_failures,
        }
    }
}

fn validate(name: char) -> Result<(), RegisterError> {
    match name {
        UNNAMED | BLACK_HOLE | '0'..='9' | 'a'..='z' | 'A'..='Z' => Ok(()),
        '.' | ':' | '%' | '#' => Err(RegisterError::ReadOnly(name)),
        other => Err(RegisterError::Invalid(other)),
    }
}

#[derive(Debug, Clone)]
pub struct RegisterStore {
    slots: HashMap<char, Register>,
    default: char,
    pending: Option<char>,
    last: Option<char>,
    metrics: RegisterMetrics,
}

impl Default for RegisterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStore {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            default: UNNAMED,
            pending: None,
            last: None,
            metrics: RegisterMetrics::default(),
        }
    }

    /// Store whose commits go to `default` when no register was selected.
    pub fn with_default(default: char) -> Result<Self, RegisterError> {
        validate(default)?;
        Ok(Self {
            default,
            ..Self::new()
        })
    }

    /// Select the target of the next commit only (Vim's `"x` prefix).
    pub fn select(&mut self, name: char) -> Result<(), RegisterError> {
        validate(name)?;
        self.pending = Some(name);
        Ok(())
    }

    pub fn pending(&self) -> Option<char> {
        self.pending
    }

    /// Look up a register; uppercase names read their lowercase slot.
    pub fn get(&self, name: char) -> Option<&Register> {
        self.slots.get(&name.to_ascii_lowercase())
    }

    /// Most recently written register.
    pub fn last_register(&self) -> Option<&Register> {
        self.last.and_then(|name| self.slots.get(&name))
    }

    pub fn metrics(&self) -> RegisterMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Open the single write for one logical operation, consuming the selected register.
    pub fn begin_write(&mut self, selection_type: SelectionType) -> PendingWrite<'_> {
        let target = self.pending.take().unwrap_or(self.default);
        PendingWrite {
            store: self,
            target,
            selection_type,
            segments: Vec::new(),
            stored: 0,
        }
    }

    fn commit_entry(&mut self, target: char, entry: Register) {
        let slot = target.to_ascii_lowercase();
        let append = target.is_ascii_uppercase();
        if append && let Some(existing) = self.slots.get_mut(&slot) {
            existing.append(entry);
            self.metrics.appends += 1;
        } else {
            self.slots.insert(slot, entry.renamed(slot));
        }
        let written = self.slots[&slot].clone();
        if slot != UNNAMED {
            self.slots.insert(UNNAMED, written.renamed(UNNAMED));
        } else {
            self.slots.insert(YANK, written.renamed(YANK));
        }
        self.last = Some(slot);
        self.metrics.register_writes += 1;
        debug!(
            target: "state.registers",
            register = %slot,
            append,
            selection_type = ?written.selection_type,
            segments = written.segments.len(),
            "register_commit"
        );
    }
}

/// An open register write for one logical multi-caret operation.
pub struct PendingWrite<'store> {
    store: &'store mut RegisterStore,
    target: char,
    selection_type: SelectionType,
    segments: Vec<String>,
    stored: usize,
}

impl PendingWrite<'_> {
    pub fn target(&self) -> char {
        self.target
    }

    /// Extract the text bounded by `range` (one segment per span, normalized) into the
    /// pending entry. Fails without adding anything if any span leaves the buffer.
    pub fn store<T: TextHost + ?Sized>(
        &mut self,
        text: &T,
        range: &TextRange,
    ) -> Result<(), RegisterError> {
        let len = text.len();
        let normalized = range.normalize();
        if let Some(&(start, end)) = normalized.spans().iter().find(|&&(_, end)| end > len) {
            self.store.metrics.store_failures += 1;
            return Err(RegisterError::OutOfBounds { start, end, len });
        }
        for &(start, end) in normalized.spans() {
            self.segments.push(text.slice(start, end));
        }
        self.stored += 1;
        self.store.metrics.segments_stored += normalized.span_count() as u64;
        trace!(
            target: "state.registers",
            register = %self.target,
            spans = normalized.span_count(),
            "segment_stored"
        );
        Ok(())
    }

    /// Perform the register write. Returns false when nothing was stored or the target
    /// is the black hole register.
    pub fn commit(self) -> bool {
        if self.stored == 0 || self.target == BLACK_HOLE {
            return false;
        }
        let entry = Register::new(self.target, self.selection_type, self.segments);
        self.store.commit_entry(self.target, entry);
        true
    }
}
