//! Handlers for renderer-originated content, selection and focus events.

use super::{LastEvent, SyncController};
use crate::protocol::{ContentSize, EventOutcome};
use crate::surface::{EditorHost, NativeSurface};
use tracing::debug;

impl<S: NativeSurface, H: EditorHost> SyncController<S, H> {
    /// Renderer content changed.
    ///
    /// Stale counters are dropped. Content equal to the committed markup is
    /// an echo (some renderers report selection moves as content changes).
    pub fn on_content_changed(&mut self, markup: &str, event_counter: Option<u64>) -> EventOutcome {
        if self.gate.should_drop(event_counter) {
            return EventOutcome::Stale;
        }
        let normalized = self.normalize(markup);
        if self.committed.as_deref() == Some(normalized.as_str()) {
            debug!(counter = ?event_counter, "ignoring content echo");
            return EventOutcome::Echo;
        }

        self.gate.accept(event_counter);
        self.native_origin = true;
        self.fired_after_text_changed = true;
        self.text_update(normalized);
        self.last_event = LastEvent::Input;
        EventOutcome::Applied
    }

    /// Renderer selection changed, possibly together with content.
    ///
    /// Content is always committed before the selection is applied. The
    /// selection is normalized to `min..max` and only forwarded while the
    /// block is selected, so a late selection event after blur cannot pull
    /// focus back.
    pub fn on_selection_changed(
        &mut self,
        start: usize,
        end: usize,
        markup: &str,
        event_counter: Option<u64>,
    ) -> EventOutcome {
        if self.gate.should_drop(event_counter) {
            return EventOutcome::Stale;
        }
        let real_start = start.min(end);
        let real_end = start.max(end);
        let normalized = self.normalize(markup);
        if self.committed.as_deref() == Some(normalized.as_str())
            && self.selection == (real_start, real_end)
        {
            debug!(counter = ?event_counter, "ignoring selection echo");
            return EventOutcome::Echo;
        }

        self.native_origin = true;
        self.fired_after_text_changed = true;
        self.text_update(normalized);

        if self.props.is_selected {
            self.update_selection(real_start, real_end);
        }
        self.gate.accept(event_counter);
        self.last_event = LastEvent::SelectionChange;
        EventOutcome::Applied
    }

    pub fn on_focus(&mut self) -> EventOutcome {
        self.touched = true;
        self.host.on_focus();
        // the old selection is stale on focus; re-report it
        let (start, end) = self.selection;
        self.host.on_selection_change(start, end);
        self.last_event = LastEvent::Focus;
        EventOutcome::Applied
    }

    /// Renderer lost focus.
    ///
    /// If the renderer's final content differs from the committed markup
    /// (a blur racing the last content event), it is committed first.
    pub fn on_blur(&mut self, markup: Option<&str>) -> EventOutcome {
        self.touched = false;
        if let Some(raw) = markup.filter(|raw| !raw.is_empty()) {
            let normalized = self.normalize(raw);
            if self.text_update(normalized) {
                debug!("committed trailing content on blur");
            }
        }
        self.caret_y = None;
        self.host.on_blur();
        self.last_event = LastEvent::Blur;
        EventOutcome::Applied
    }

    /// Forwards caret movement to the host when it actually moved.
    pub fn on_caret_vertical_position_changed(&mut self, caret_y: f32) -> EventOutcome {
        let previous = self.caret_y;
        if previous == Some(caret_y) {
            return EventOutcome::Ignored;
        }
        self.caret_y = Some(caret_y);
        self.host.on_caret_vertical_position_change(caret_y, previous);
        EventOutcome::Applied
    }

    pub fn on_content_size_changed(&mut self, size: ContentSize) -> EventOutcome {
        self.content_size = Some(size);
        self.host.on_content_size_change(size);
        self.last_event = LastEvent::ContentSizeChange;
        EventOutcome::Applied
    }
}
