//! Dispatcher applying `Action` to an `EditorModel`.
//!
//! Sub-modules:
//! * `selection` - building the range for a yank over pending caret selections
//!
//! `dispatch` selects the requested register (if any), splits the model into its
//! buffer and caret halves, and runs the matching engine entry point. Register
//! selection errors fail the action before any caret or register changes.

use crate::{Action, MotionResolver, YankEngine, YankTarget};
use core_model::EditorModel;
use tracing::{debug, warn};

mod selection;

pub use selection::selection_range;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub success: bool,
    /// Caret offsets or caret count differ from before the action.
    pub carets_changed: bool,
}

impl DispatchResult {
    pub fn failed() -> Self {
        Self {
            success: false,
            carets_changed: false,
        }
    }
    pub fn completed(success: bool, carets_changed: bool) -> Self {
        Self {
            success,
            carets_changed,
        }
    }
}

/// Apply an action to the model, routing yanks through `engine`.
pub fn dispatch(
    action: Action,
    model: &mut EditorModel,
    engine: &mut YankEngine,
    resolver: &dyn MotionResolver,
) -> DispatchResult {
    match action {
        Action::Yank { target, register } => {
            if let Some(name) = register
                && let Err(e) = engine.select_register(name)
            {
                warn!(target: "actions.dispatch", register = %name, error = %e, "register_select_failed");
                return DispatchResult::failed();
            }
            let before = model.carets().offsets();
            let (text, carets) = model.split_text_and_carets();
            let success = match target {
                YankTarget::Motion { motion, count } => {
                    engine.yank_motion(text, carets, resolver, motion, count)
                }
                YankTarget::Lines { count } => engine.yank_line(text, carets, count),
                YankTarget::Selection { kind } => match selection_range(text, carets, kind) {
                    Some(range) => {
                        let ok = engine.yank_range(text, carets, &range, kind, true);
                        carets.clear_selections();
                        ok
                    }
                    None => {
                        debug!(target: "actions.dispatch", "selection_missing");
                        false
                    }
                },
            };
            let carets_changed = model.carets().offsets() != before;
            debug!(
                target: "actions.dispatch",
                ?target,
                success,
                carets_changed,
                "yank_dispatched"
            );
            DispatchResult::completed(success, carets_changed)
        }
    }
}
