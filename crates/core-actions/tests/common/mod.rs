#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{
    Action, BufferMotionResolver, DispatchResult, MotionKind, YankEngine, YankError,
    YankObserver, YankReport, YankTarget, dispatch,
};
use core_model::EditorModel;
use core_state::{CaretHost, CaretId, CaretSet, Register, SelectionType, TextRange};
use core_text::{Buffer, TextHost};
use std::sync::{Arc, Mutex};

pub fn buffer(text: &str) -> Buffer {
    Buffer::from_str("fixture", text).unwrap()
}

/// Editor model plus engine, driven the way a host editor would drive them.
pub struct Harness {
    pub model: EditorModel,
    pub engine: YankEngine,
}

impl Harness {
    pub fn new(text: &str, carets: &[usize]) -> Self {
        Self {
            model: EditorModel::with_carets(buffer(text), carets.iter().copied()),
            engine: YankEngine::default(),
        }
    }

    pub fn yank_motion(&mut self, motion: MotionKind, count: usize) -> Result<YankReport, YankError> {
        let (text, carets) = self.model.split_text_and_carets();
        self.engine
            .try_yank_motion(text, carets, &BufferMotionResolver, motion, count)
    }

    pub fn yank_line(&mut self, count: usize) -> Result<YankReport, YankError> {
        let (text, carets) = self.model.split_text_and_carets();
        self.engine.try_yank_line(text, carets, count)
    }

    pub fn yank_range(
        &mut self,
        range: &TextRange,
        selection_type: SelectionType,
        move_cursor: bool,
    ) -> Result<YankReport, YankError> {
        let (text, carets) = self.model.split_text_and_carets();
        self.engine
            .try_yank_range(text, carets, range, selection_type, move_cursor)
    }

    pub fn dispatch(&mut self, target: YankTarget, register: Option<char>) -> DispatchResult {
        dispatch(
            Action::Yank { target, register },
            &mut self.model,
            &mut self.engine,
            &BufferMotionResolver,
        )
    }

    pub fn unnamed(&self) -> &Register {
        self.engine
            .registers()
            .get('"')
            .expect("unnamed register written")
    }

    pub fn offsets(&self) -> Vec<usize> {
        self.model.carets().offsets()
    }
}

/// Ordered record of caret moves, merges and observer notifications.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Caret host that records every request before forwarding it to a `CaretSet`.
pub struct LoggingCarets {
    pub inner: CaretSet,
    pub log: EventLog,
}

impl CaretHost for LoggingCarets {
    fn caret_ids(&self) -> Vec<CaretId> {
        self.inner.caret_ids()
    }
    fn primary_caret(&self) -> Option<CaretId> {
        self.inner.primary_caret()
    }
    fn caret_offset(&self, id: CaretId) -> Option<usize> {
        self.inner.caret_offset(id)
    }
    fn move_caret(&mut self, id: CaretId, offset: usize) -> bool {
        self.log.lock().unwrap().push(format!("move {} {offset}", id.0));
        self.inner.move_caret(id, offset)
    }
    fn merge_duplicate_carets(&mut self) -> usize {
        let removed = self.inner.merge_duplicate_carets();
        self.log.lock().unwrap().push(format!("merge {removed}"));
        removed
    }
}

/// Observer that records the spans of every notification.
#[derive(Default)]
pub struct RecordingObserver {
    pub seen: Mutex<Vec<Vec<(usize, usize)>>>,
    pub log: Option<EventLog>,
}

impl RecordingObserver {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            log: Some(log),
        }
    }

    pub fn calls(&self) -> Vec<Vec<(usize, usize)>> {
        self.seen.lock().unwrap().clone()
    }
}

impl YankObserver for RecordingObserver {
    fn yank_performed(&self, _text: &dyn TextHost, range: &TextRange) {
        self.seen.lock().unwrap().push(range.spans().to_vec());
        if let Some(log) = &self.log {
            log.lock().unwrap().push("notify".to_string());
        }
    }
}
