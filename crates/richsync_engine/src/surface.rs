//! Capability traits the controller calls through.
//!
//! The controller never reaches into the renderer or the host directly; a
//! platform adapter implements [`NativeSurface`] and the surrounding editor
//! implements [`EditorHost`].

use crate::protocol::{ContentSize, DeleteRequest, DisplayPayload, EnterRequest, PasteRequest};

/// Imperative handle on the native renderer.
pub trait NativeSurface {
    fn focus(&mut self);
    fn blur(&mut self);
    fn is_focused(&self) -> bool;
    /// Replaces the displayed content. Never expected to return content.
    fn set_content(&mut self, payload: DisplayPayload);
    /// Declarative toggle state for the renderer's formatting chrome.
    fn set_active_formats(&mut self, formats: &[&'static str]);
}

/// Callbacks into the host editor.
///
/// Only `on_change` and `on_selection_change` are required; structural
/// handlers default to doing nothing.
pub trait EditorHost {
    /// Content changed; `markup` excludes root tags.
    fn on_change(&mut self, markup: &str);

    fn on_selection_change(&mut self, start: usize, end: usize);

    fn on_enter(&mut self, _request: EnterRequest) {}

    fn on_delete(&mut self, _request: DeleteRequest) {}

    fn on_paste(&mut self, _request: PasteRequest) {}

    /// Ask the host to snapshot its undo history.
    fn on_create_undo_level(&mut self) {}

    fn on_focus(&mut self) {}

    fn on_blur(&mut self) {}

    fn on_caret_vertical_position_change(&mut self, _caret_y: f32, _previous: Option<f32>) {}

    fn on_content_size_change(&mut self, _size: ContentSize) {}
}
