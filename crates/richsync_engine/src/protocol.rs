//! Message types exchanged with the native renderer and the host editor.

use richsync_core::{MarkupOptions, RichTextValue};
use serde::{Deserialize, Serialize};

/// Asynchronous events emitted by the native renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NativeEvent {
    /// The renderer's content changed; `markup` is its full current content.
    ContentChanged {
        markup: String,
        event_counter: Option<u64>,
    },
    /// The caret or selection moved. `start > end` is allowed.
    SelectionChanged {
        start: usize,
        end: usize,
        markup: String,
        event_counter: Option<u64>,
    },
    Focus,
    Blur {
        #[serde(default)]
        markup: Option<String>,
    },
    /// A key the renderer forwards instead of handling itself.
    KeyDown {
        key_code: u32,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        event_counter: Option<u64>,
    },
    Paste {
        #[serde(default)]
        plain_text: String,
        #[serde(default)]
        html: Option<String>,
        #[serde(default)]
        files: Vec<String>,
    },
    CaretVerticalPositionChanged {
        caret_y: f32,
    },
    ContentSizeChanged {
        width: f32,
        height: f32,
    },
}

/// Content the renderer is told to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPayload {
    pub markup: String,
    /// Counter the renderer adopts; `None` forces it to take the payload.
    pub event_counter: Option<u64>,
    /// Selection to place, only when the engine needs to move the caret.
    pub selection: Option<(usize, usize)>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: f32,
    pub height: f32,
}

/// Properties the host editor supplies for one editing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProps {
    /// Current content as markup (root tags excluded).
    pub value: String,
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
    /// Whether the surrounding block is selected.
    pub is_selected: bool,
    pub tag_name: Option<String>,
    pub multiline_tag: Option<String>,
    pub root_tags_to_eliminate: Vec<String>,
    pub tags_to_eliminate: Vec<String>,
    pub preserve_white_space: bool,
    /// `ol` only.
    pub reversed: bool,
    /// `ol` only.
    pub start: Option<u32>,
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    /// Format types that map onto renderer toggles; `None` means all of them.
    pub allowed_formats: Option<Vec<String>>,
    pub no_focus_on_mount: bool,
}

impl Default for HostProps {
    fn default() -> Self {
        Self {
            value: String::new(),
            selection_start: None,
            selection_end: None,
            is_selected: false,
            tag_name: None,
            multiline_tag: None,
            root_tags_to_eliminate: Vec::new(),
            tags_to_eliminate: Vec::new(),
            preserve_white_space: false,
            reversed: false,
            start: None,
            font_size: None,
            line_height: None,
            allowed_formats: None,
            no_focus_on_mount: false,
        }
    }
}

impl HostProps {
    pub fn markup_options(&self) -> MarkupOptions {
        MarkupOptions {
            multiline_tag: self.multiline_tag.clone(),
            preserve_white_space: self.preserve_white_space,
        }
    }

    /// Both selection offsets, when the host supplied them.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection_start.zip(self.selection_end)
    }
}

/// Enter pressed; the host decides how to split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterRequest {
    pub value: RichTextValue,
    pub shift: bool,
}

/// Delete at a text boundary; the host decides how to merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    /// Backspace (`true`) or forward delete.
    pub reverse: bool,
    pub value: RichTextValue,
}

/// Clipboard content the engine did not consume itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasteRequest {
    pub value: RichTextValue,
    pub html: Option<String>,
    pub plain_text: String,
    pub files: Vec<String>,
    pub active_formats: Vec<&'static str>,
}

/// What the controller did with an inbound event or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    /// Committed into the engine's value.
    Applied,
    /// Dropped by the event gate.
    Stale,
    /// Described state the engine already holds.
    Echo,
    /// Consumed by the engine; the renderer must not apply its default.
    Handled,
    /// Left to the renderer.
    PassThrough,
    /// Accepted but nothing to do.
    Ignored,
}

impl EventOutcome {
    /// Whether the renderer's default handling should be suppressed.
    pub fn prevents_default(self) -> bool {
        self == EventOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_events_use_tagged_json() {
        let event: NativeEvent = serde_json::from_str(
            r#"{"type":"selection_changed","start":3,"end":1,"markup":"abc","event_counter":4}"#,
        )
        .expect("parse event");
        assert_eq!(
            event,
            NativeEvent::SelectionChanged {
                start: 3,
                end: 1,
                markup: "abc".to_string(),
                event_counter: Some(4),
            }
        );

        let key: NativeEvent =
            serde_json::from_str(r#"{"type":"key_down","key_code":8}"#).expect("parse key");
        assert_eq!(
            key,
            NativeEvent::KeyDown {
                key_code: 8,
                shift: false,
                event_counter: None,
            }
        );
    }

    #[test]
    fn host_props_fill_defaults() {
        let props: HostProps =
            serde_json::from_str(r#"{"value":"<b>x</b>","selection_start":1,"selection_end":1}"#)
                .expect("parse props");
        assert_eq!(props.selection(), Some((1, 1)));
        assert!(!props.is_selected);
        assert_eq!(props.markup_options(), MarkupOptions::default());
    }
}
