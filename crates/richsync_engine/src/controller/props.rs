//! Host prop updates and the forced-refresh rules.

use super::SyncController;
use crate::protocol::HostProps;
use crate::surface::{EditorHost, NativeSurface};
use tracing::debug;

impl<S: NativeSurface, H: EditorHost> SyncController<S, H> {
    /// Applies new host props.
    ///
    /// Host content is authoritative only when it differs from what the
    /// engine committed; then the gate is invalidated and the renderer
    /// refreshed. Structural changes (tag, list attributes) always reload.
    /// Selection transitions focus or blur the surface.
    pub fn set_props(&mut self, next: HostProps) {
        let prev = std::mem::replace(&mut self.props, next);
        let mut force = false;

        if self.props.tag_name != prev.tag_name
            || self.props.reversed != prev.reversed
            || self.props.start != prev.start
        {
            debug!(tag = ?self.props.tag_name, "structural prop change");
            self.committed = None;
            force = true;
        }

        let content_differs = self.committed.as_deref() != Some(self.props.value.as_str());
        if content_differs && !(self.native_origin && self.fired_after_text_changed) {
            if self.props.selection().is_some() {
                self.needs_selection_update = true;
            }
            force = true;
        }

        if !self.native_origin {
            if let Some((start, _)) = self.props.selection() {
                if self.props.selection_start != prev.selection_start
                    && start != self.selection.0
                    && self.props.is_selected
                {
                    self.needs_selection_update = true;
                    force = true;
                }
            }
            if self.props.font_size != prev.font_size {
                force = true;
            }
            if self.props.line_height != prev.line_height {
                self.needs_selection_update = true;
                force = true;
            }
        }

        if let Some((start, end)) = self.props.selection() {
            if self.needs_selection_update {
                self.selection = (start, end);
            }
        }
        if content_differs {
            self.value = self.load(&self.props.value);
            self.committed = Some(self.props.value.clone());
        } else if self.needs_selection_update {
            let (start, end) = self.selection;
            self.value = self.value.with_selection(start, end);
        }

        if self.props.is_selected && !prev.is_selected {
            self.surface.focus();
            // the renderer does not report a selection it already holds
            let start = self.props.selection_start.unwrap_or(0);
            let end = self.props.selection_end.unwrap_or(0);
            self.update_selection(start, end);
        } else if !self.props.is_selected && prev.is_selected {
            self.surface.blur();
        }

        if force {
            self.gate.force_refresh();
            self.render();
        }
        self.native_origin = false;
        self.fired_after_text_changed = false;
    }
}
