//! Recording implementations of the capability traits.
//!
//! Used by tests and the replay harness. Clones share one log, so a caller
//! can keep a handle after moving the recorder into a controller.

use crate::protocol::{ContentSize, DeleteRequest, DisplayPayload, EnterRequest, PasteRequest};
use crate::suggestions::{SuggestionKind, SuggestionProvider};
use crate::surface::{EditorHost, NativeSurface};
use richsync_core::CoreError;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One call the controller made on the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "surface", rename_all = "snake_case")]
pub enum SurfaceCall {
    Focus,
    Blur,
    SetContent { payload: DisplayPayload },
    SetActiveFormats { formats: Vec<&'static str> },
}

#[derive(Debug, Default)]
struct SurfaceLog {
    calls: Vec<SurfaceCall>,
    focused: bool,
}

/// [`NativeSurface`] that records every call and tracks focus.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.log.borrow().calls.clone()
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.log.borrow_mut().calls)
    }

    /// Every payload sent with `set_content`, oldest first.
    pub fn payloads(&self) -> Vec<DisplayPayload> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::SetContent { payload } => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_payload(&self) -> Option<DisplayPayload> {
        self.payloads().pop()
    }

    /// Simulates the user focusing or leaving the renderer directly.
    pub fn set_focused(&self, focused: bool) {
        self.log.borrow_mut().focused = focused;
    }
}

impl NativeSurface for RecordingSurface {
    fn focus(&mut self) {
        let mut log = self.log.borrow_mut();
        log.focused = true;
        log.calls.push(SurfaceCall::Focus);
    }

    fn blur(&mut self) {
        let mut log = self.log.borrow_mut();
        log.focused = false;
        log.calls.push(SurfaceCall::Blur);
    }

    fn is_focused(&self) -> bool {
        self.log.borrow().focused
    }

    fn set_content(&mut self, payload: DisplayPayload) {
        self.log
            .borrow_mut()
            .calls
            .push(SurfaceCall::SetContent { payload });
    }

    fn set_active_formats(&mut self, formats: &[&'static str]) {
        self.log.borrow_mut().calls.push(SurfaceCall::SetActiveFormats {
            formats: formats.to_vec(),
        });
    }
}

/// One callback the controller made on the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "host", rename_all = "snake_case")]
pub enum HostCall {
    Change { markup: String },
    SelectionChange { start: usize, end: usize },
    Enter { request: EnterRequest },
    Delete { request: DeleteRequest },
    Paste { request: PasteRequest },
    CreateUndoLevel,
    Focus,
    Blur,
    CaretVerticalPositionChange { caret_y: f32, previous: Option<f32> },
    ContentSizeChange { size: ContentSize },
}

/// [`EditorHost`] that records every callback.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    log: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.log.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Markup passed to `on_change`, oldest first.
    pub fn changes(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Change { markup } => Some(markup.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn selections(&self) -> Vec<(usize, usize)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::SelectionChange { start, end } => Some((*start, *end)),
                _ => None,
            })
            .collect()
    }

    pub fn undo_levels(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|call| matches!(call, HostCall::CreateUndoLevel))
            .count()
    }

    pub fn deletes(&self) -> Vec<DeleteRequest> {
        self.log
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Delete { request } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: HostCall) {
        self.log.borrow_mut().push(call);
    }
}

impl EditorHost for RecordingHost {
    fn on_change(&mut self, markup: &str) {
        self.push(HostCall::Change {
            markup: markup.to_string(),
        });
    }

    fn on_selection_change(&mut self, start: usize, end: usize) {
        self.push(HostCall::SelectionChange { start, end });
    }

    fn on_enter(&mut self, request: EnterRequest) {
        self.push(HostCall::Enter { request });
    }

    fn on_delete(&mut self, request: DeleteRequest) {
        self.push(HostCall::Delete { request });
    }

    fn on_paste(&mut self, request: PasteRequest) {
        self.push(HostCall::Paste { request });
    }

    fn on_create_undo_level(&mut self) {
        self.push(HostCall::CreateUndoLevel);
    }

    fn on_focus(&mut self) {
        self.push(HostCall::Focus);
    }

    fn on_blur(&mut self) {
        self.push(HostCall::Blur);
    }

    fn on_caret_vertical_position_change(&mut self, caret_y: f32, previous: Option<f32>) {
        self.push(HostCall::CaretVerticalPositionChange { caret_y, previous });
    }

    fn on_content_size_change(&mut self, size: ContentSize) {
        self.push(HostCall::ContentSizeChange { size });
    }
}

/// Suggestion provider answering from a fixed queue; dismisses once empty.
#[derive(Debug, Default)]
pub struct StaticSuggestions {
    answers: VecDeque<Result<Option<String>, CoreError>>,
}

impl StaticSuggestions {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Result<Option<String>, CoreError>>,
    {
        Self {
            answers: answers.into_iter().collect(),
        }
    }

    /// Resolves every lookup with `name`.
    pub fn always(name: &str) -> impl SuggestionProvider {
        let name = name.to_string();
        move |_kind: SuggestionKind| Ok::<_, CoreError>(Some(name.clone()))
    }
}

impl SuggestionProvider for StaticSuggestions {
    fn fetch(&mut self, _kind: SuggestionKind) -> Result<Option<String>, CoreError> {
        self.answers.pop_front().unwrap_or(Ok(None))
    }
}
