//! Key handling: delete/backspace, enter, and trigger characters.

use super::{LastEvent, SyncController};
use crate::protocol::{DeleteRequest, EnterRequest, EventOutcome};
use crate::suggestions::{enabled_kinds, SuggestionKind};
use crate::surface::{EditorHost, NativeSurface};
use richsync_core::constants::{KEY_BACKSPACE, KEY_DELETE, KEY_ENTER};
use richsync_core::text::is_trigger_position;
use tracing::debug;

impl<S: NativeSurface, H: EditorHost> SyncController<S, H> {
    /// Handles a key the renderer forwarded.
    ///
    /// Returns [`EventOutcome::Handled`] when the renderer must suppress its
    /// default handling.
    pub fn on_key_down(&mut self, key_code: u32, shift: bool, event_counter: Option<u64>) -> EventOutcome {
        match key_code {
            KEY_BACKSPACE => self.handle_delete(true, event_counter),
            KEY_DELETE => self.handle_delete(false, event_counter),
            KEY_ENTER => self.handle_enter(shift),
            _ => match self.trigger_for(key_code) {
                Some(kind) => self.handle_trigger(kind),
                None => EventOutcome::PassThrough,
            },
        }
    }

    /// Delete or backspace.
    ///
    /// Full-content deletion and line merges in multiline fields are done
    /// by the engine. Otherwise the host only hears about a collapsed caret
    /// at the edge matching the key's direction; anything else is an
    /// ordinary in-text edit left to the renderer.
    fn handle_delete(&mut self, reverse: bool, event_counter: Option<u64>) -> EventOutcome {
        if self.gate.should_drop(event_counter) {
            return EventOutcome::Stale;
        }
        self.gate.accept(event_counter);
        self.native_origin = true;
        self.fired_after_text_changed = false;

        let value = self.record();
        let len = value.len();
        let (start, end) = (value.start, value.end);

        if start == 0 && end != 0 && end >= len {
            debug!(len, "deleting full content");
            self.commit_record(value.remove());
            return EventOutcome::Handled;
        }

        if self.props.multiline_tag.is_some() {
            let merged = if reverse && start == 0 && end == 0 && value.is_empty_line() {
                value.remove_line_separator(!reverse)
            } else {
                value.remove_line_separator(reverse)
            };
            if let Some(merged) = merged {
                self.commit_record(merged);
                return EventOutcome::Handled;
            }
        }

        let at_edge = if reverse { start == 0 } else { end == len };
        if !value.is_collapsed() || !at_edge {
            return EventOutcome::PassThrough;
        }

        self.host.on_delete(DeleteRequest { reverse, value });
        self.last_event = LastEvent::Input;
        EventOutcome::Handled
    }

    /// Enter is always the host's decision.
    fn handle_enter(&mut self, shift: bool) -> EventOutcome {
        let value = self.record();
        self.host.on_enter(EnterRequest { value, shift });
        self.last_event = LastEvent::Input;
        EventOutcome::Handled
    }

    fn trigger_for(&self, key_code: u32) -> Option<SuggestionKind> {
        enabled_kinds(&self.config)
            .into_iter()
            .find(|kind| kind.key_code() == key_code)
    }

    /// A trigger typed at the start of text or a line, or after a space,
    /// starts a lookup; anywhere else it is inserted literally.
    fn handle_trigger(&mut self, kind: SuggestionKind) -> EventOutcome {
        let record = self.record();
        if is_trigger_position(&record) && self.start_lookup(kind, record.clone()) {
            return EventOutcome::Handled;
        }
        self.insert_string(record, &kind.trigger().to_string());
        EventOutcome::Handled
    }
}
