//! Root crate facade for the richsync engine.
//!
//! Re-exports the value model and markup codec from `richsync_core` and the
//! synchronization controller from `richsync_engine`.

pub use richsync_core::{
    active, config, constants, error, format, markup, text, value, resolve_active_formats,
    Attributes, CoreError, EngineConfig, Format, FormatList, MarkupOptions, Platform,
    RichTextValue,
};
pub use richsync_engine::{
    controller, gate, history, protocol, recording, suggestions, surface, EditorHost, EventGate,
    EventOutcome, GateState, HostProps, NativeEvent, NativeSurface, SyncController,
};
