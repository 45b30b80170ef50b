//! Synchronization engine for richsync.
//!
//! Keeps a host-owned [`RichTextValue`](richsync_core::RichTextValue) consistent
//! with a native renderer that reports edits asynchronously.

/// Synchronization controller (one per editing surface).
pub mod controller;
/// Event counter gate filtering stale native events.
pub mod gate;
/// Undo-level debounce.
pub mod history;
/// Native/host message types.
pub mod protocol;
/// Recording surface/host doubles for tests and replay.
pub mod recording;
/// Trigger-character suggestion lookups.
pub mod suggestions;
/// Capability traits implemented by platform adapters and hosts.
pub mod surface;

pub use controller::{Clock, FormatListener, SyncController};
pub use gate::{EventGate, GateState};
pub use history::UndoDebouncer;
pub use protocol::{
    ContentSize, DeleteRequest, DisplayPayload, EnterRequest, EventOutcome, HostProps,
    NativeEvent, PasteRequest,
};
pub use suggestions::{spawn_lookup_worker, LookupHandle, SuggestionKind, SuggestionProvider};
pub use surface::{EditorHost, NativeSurface};
