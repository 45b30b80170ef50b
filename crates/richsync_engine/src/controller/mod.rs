//! Synchronization controller for one editing surface.
//!
//! Owns the current [`RichTextValue`] and the [`EventGate`], turns native
//! renderer events into host callbacks, and pushes host-forced content back
//! to the renderer. All methods run on the thread that owns the controller.

mod commands;
mod keys;
mod native;
mod props;

use crate::gate::EventGate;
use crate::history::UndoDebouncer;
use crate::protocol::{ContentSize, DisplayPayload, EventOutcome, HostProps, NativeEvent};
use crate::suggestions::{LookupHandle, SuggestionKind};
use crate::surface::{EditorHost, NativeSurface};
use richsync_core::active::{all_toggle_types, resolve_active_formats};
use richsync_core::markup::{
    normalize_native_markup, render_markup, trailing_break_count, RootTagCleanup,
};
use richsync_core::{from_markup, to_markup, EngineConfig, FormatList, RichTextValue};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Listener notified with the new formats and text on every format-path commit.
pub type FormatListener = Box<dyn FnMut(&[FormatList], &str)>;

/// Source of commit timestamps for the undo debounce.
pub type Clock = Box<dyn Fn() -> Instant>;

/// Kind of the last event the controller processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LastEvent {
    None,
    Input,
    SelectionChange,
    FormatChange,
    Focus,
    Blur,
    ContentSizeChange,
}

/// A lookup in flight and the value captured when it started.
struct PendingLookup {
    kind: SuggestionKind,
    record: RichTextValue,
    committed: Option<String>,
}

/// Stateful mediator between a native renderer and the host editor.
pub struct SyncController<S: NativeSurface, H: EditorHost> {
    surface: S,
    host: H,
    config: EngineConfig,
    props: HostProps,
    gate: EventGate,
    /// Last committed markup; `None` after a structural change forces a reload.
    committed: Option<String>,
    value: RichTextValue,
    selection: (usize, usize),
    last_event: LastEvent,
    touched: bool,
    /// Set while handling a native event so prop echoes are not re-forced.
    native_origin: bool,
    fired_after_text_changed: bool,
    needs_selection_update: bool,
    last_history: Option<String>,
    undo: UndoDebouncer,
    active_formats: Vec<&'static str>,
    caret_y: Option<f32>,
    content_size: Option<ContentSize>,
    format_listeners: Vec<FormatListener>,
    suggestions: Option<LookupHandle>,
    pending_lookups: HashMap<u64, PendingLookup>,
    next_lookup_id: u64,
    clock: Clock,
}

impl<S: NativeSurface, H: EditorHost> SyncController<S, H> {
    /// Mounts a controller for one editing surface.
    ///
    /// Renders the initial content. When the block is selected (and the
    /// host did not opt out), the surface is focused and the initial
    /// selection reported.
    pub fn mount(surface: S, host: H, config: EngineConfig, props: HostProps) -> Self {
        let gate = EventGate::from_config(&config);
        let undo = UndoDebouncer::new(config.undo_debounce());
        let selection = (
            props.selection_start.unwrap_or(0),
            props.selection_end.unwrap_or(0),
        );
        let value = from_markup(&props.value, &props.markup_options())
            .with_selection(selection.0, selection.1);
        let committed = Some(props.value.clone());

        let mut controller = Self {
            surface,
            host,
            config,
            gate,
            last_history: committed.clone(),
            committed,
            value,
            selection,
            last_event: LastEvent::None,
            touched: false,
            native_origin: false,
            fired_after_text_changed: false,
            needs_selection_update: false,
            undo,
            active_formats: Vec::new(),
            caret_y: None,
            content_size: None,
            format_listeners: Vec::new(),
            suggestions: None,
            pending_lookups: HashMap::new(),
            next_lookup_id: 1,
            clock: Box::new(Instant::now),
            props,
        };
        controller.render();

        if controller.props.is_selected && !controller.props.no_focus_on_mount {
            controller.surface.focus();
            let (start, end) = (
                controller.props.selection_start.unwrap_or(0),
                controller.props.selection_end.unwrap_or(0),
            );
            controller.update_selection(start, end);
        }
        controller
    }

    /// Drops any pending undo level and lookups, then blurs a focused
    /// surface. Dropping the controller does the same.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.undo.cancel();
        self.pending_lookups.clear();
        if self.surface.is_focused() {
            self.surface.blur();
        }
    }

    /// Replaces the clock commits are timestamped with.
    ///
    /// `tick` must be driven from the same clock, otherwise debounce
    /// deadlines and tick times are not comparable.
    pub fn set_clock<F>(&mut self, clock: F)
    where
        F: Fn() -> Instant + 'static,
    {
        self.clock = Box::new(clock);
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn props(&self) -> &HostProps {
        &self.props
    }

    pub fn gate(&self) -> &EventGate {
        &self.gate
    }

    /// Current value with the engine's selection.
    pub fn value(&self) -> &RichTextValue {
        &self.value
    }

    /// Last committed markup, if any.
    pub fn markup(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn selection(&self) -> (usize, usize) {
        self.selection
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Toggle names last pushed to the renderer.
    pub fn active_formats(&self) -> &[&'static str] {
        &self.active_formats
    }

    pub fn content_size(&self) -> Option<ContentSize> {
        self.content_size
    }

    /// Registers a listener for format-path commits; listeners run in
    /// registration order.
    pub fn add_format_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&[FormatList], &str) + 'static,
    {
        self.format_listeners.push(Box::new(listener));
    }

    /// Dispatches one native event.
    pub fn handle_native_event(&mut self, event: NativeEvent) -> EventOutcome {
        match event {
            NativeEvent::ContentChanged {
                markup,
                event_counter,
            } => self.on_content_changed(&markup, event_counter),
            NativeEvent::SelectionChanged {
                start,
                end,
                markup,
                event_counter,
            } => self.on_selection_changed(start, end, &markup, event_counter),
            NativeEvent::Focus => self.on_focus(),
            NativeEvent::Blur { markup } => self.on_blur(markup.as_deref()),
            NativeEvent::KeyDown {
                key_code,
                shift,
                event_counter,
            } => self.on_key_down(key_code, shift, event_counter),
            NativeEvent::Paste {
                plain_text,
                html,
                files,
            } => self.on_paste(&plain_text, html, files),
            NativeEvent::CaretVerticalPositionChanged { caret_y } => {
                self.on_caret_vertical_position_changed(caret_y)
            }
            NativeEvent::ContentSizeChanged { width, height } => {
                self.on_content_size_changed(ContentSize { width, height })
            }
        }
    }

    /// Drives the undo debounce; call from the host's event loop.
    pub fn tick(&mut self, now: Instant) {
        if self.undo.poll(now) {
            self.create_undo_level();
        }
    }

    /// Whether a debounced undo level is waiting to fire.
    pub fn undo_pending(&self) -> bool {
        self.undo.is_pending()
    }

    fn cleanup(&self) -> RootTagCleanup<'_> {
        RootTagCleanup {
            tag_name: self.props.tag_name.as_deref(),
            root_tags_to_eliminate: &self.props.root_tags_to_eliminate,
            tags_to_eliminate: &self.props.tags_to_eliminate,
        }
    }

    /// Renderer markup in the host's form (spaces unescaped, root tags
    /// removed, paragraph tags restored on Android).
    fn normalize(&self, raw: &str) -> String {
        normalize_native_markup(
            raw,
            &self.cleanup(),
            self.props.multiline_tag.as_deref(),
            self.config.platform,
        )
    }

    /// Serializes a value the way the host stores it.
    fn serialize(&self, value: &RichTextValue) -> String {
        let markup = to_markup(value, None, &self.props.markup_options());
        self.cleanup().apply(&markup)
    }

    /// Parses `markup` and places the engine's selection on it, clamped.
    fn load(&self, markup: &str) -> RichTextValue {
        let parsed = from_markup(markup, &self.props.markup_options());
        let (start, end) = self.selection;
        let len = parsed.len();
        if start > len || end > len {
            warn!(start, end, len, "clamping out-of-range selection");
        }
        parsed.with_selection(start, end)
    }

    /// Current record: committed content with the engine's selection.
    pub(crate) fn record(&self) -> RichTextValue {
        let (start, end) = self.selection;
        if self.value.start == start.min(self.value.len())
            && self.value.end == end.min(self.value.len())
        {
            return self.value.clone();
        }
        self.value.with_selection(start, end)
    }

    fn supported_toggles(&self) -> Vec<String> {
        match &self.props.allowed_formats {
            Some(allowed) => allowed.clone(),
            None => all_toggle_types().into_iter().map(str::to_string).collect(),
        }
    }

    /// Recomputes toggle state and pushes it when the surface holds focus.
    fn push_active_formats(&mut self, value: &RichTextValue) {
        let active = resolve_active_formats(value, &self.supported_toggles());
        if !self.surface.is_focused() {
            debug!("skipping active format push while unfocused");
            return;
        }
        self.surface.set_active_formats(&active);
        self.active_formats = active;
    }

    /// Applies renderer content to the committed state.
    ///
    /// Returns true when the content actually changed.
    fn text_update(&mut self, normalized: String) -> bool {
        if self.committed.as_deref() == Some(normalized.as_str()) {
            return false;
        }
        let now = (self.clock)();
        self.undo.schedule(now);
        self.value = self.load(&normalized);
        self.committed = Some(normalized);
        if let Some(markup) = self.committed.as_deref() {
            self.host.on_change(markup);
        }
        true
    }

    /// Moves the engine's selection and reports it to the host.
    fn update_selection(&mut self, start: usize, end: usize) {
        let len = self.value.len();
        if start > len || end > len {
            warn!(start, end, len, "clamping out-of-range selection");
        }
        let (start, end) = (start.min(len), end.min(len));
        let changed = self.selection != (start, end);
        self.selection = (start, end);
        self.value = self.value.with_selection(start, end);

        let manual = self.last_event != LastEvent::Input
            && self.committed.as_deref() == Some(self.props.value.as_str());
        if changed && manual {
            let value = self.value.clone();
            self.push_active_formats(&value);
        }
        self.host.on_selection_change(start, end);
    }

    /// Commits an engine-produced record (format change path).
    ///
    /// Listeners run first, then the host sees the new content and
    /// selection, an undo level is requested immediately, and the renderer
    /// is refreshed with the new content.
    pub(crate) fn commit_record(&mut self, record: RichTextValue) {
        for listener in &mut self.format_listeners {
            listener(&record.formats, &record.text);
        }

        let markup = self.serialize(&record);
        self.committed = Some(markup.clone());
        self.host.on_change(&markup);
        self.push_active_formats(&record);

        let (start, end) = (record.start, record.end);
        self.host.on_selection_change(start, end);
        self.selection = (start, end);
        self.value = record;

        self.create_undo_level();
        self.last_event = LastEvent::FormatChange;

        self.gate.force_refresh();
        self.needs_selection_update = true;
        self.render();
    }

    /// Requests an undo level if content changed since the last one.
    fn create_undo_level(&mut self) {
        if self.last_history == self.committed {
            return;
        }
        self.host.on_create_undo_level();
        self.last_history = self.committed.clone();
    }

    /// Sends the current content to the renderer.
    fn render(&mut self) {
        let content = self.serialize(&self.value);
        let markup = render_markup(
            &content,
            self.props.tag_name.as_deref(),
            self.props.reversed,
            self.props.start,
            self.config.platform,
        );

        let mut selection = None;
        if self.needs_selection_update {
            self.needs_selection_update = false;
            let (mut start, mut end) = self.selection;
            if !self.config.platform.is_ios() {
                let breaks = trailing_break_count(&markup);
                if breaks > 0 {
                    warn!(
                        breaks,
                        "trailing line breaks will be dropped by the renderer; adjusting selection"
                    );
                    start = start.saturating_sub(breaks);
                    end = end.saturating_sub(breaks);
                }
            }
            selection = Some((start, end));
        }

        self.surface.set_content(DisplayPayload {
            markup,
            event_counter: self.gate.counter(),
            selection,
            tag: self.props.tag_name.clone(),
        });
    }
}

impl<S: NativeSurface, H: EditorHost> Drop for SyncController<S, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
