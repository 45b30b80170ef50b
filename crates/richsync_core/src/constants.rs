//! Shared constants used across richsync crates.

/// Code point separating paragraphs of a multiline field.
pub const LINE_SEPARATOR: char = '\u{2028}';

/// Code point standing in for an embedded object (image, reference).
pub const OBJECT_REPLACEMENT_CHARACTER: char = '\u{fffc}';

/// Markup of an empty multiline paragraph field.
pub const EMPTY_PARAGRAPH_TAGS: &str = "<p></p>";

/// Default quiescence window before an undo level is requested, in milliseconds.
pub const DEFAULT_UNDO_DEBOUNCE_MS: u64 = 500;

/// Amount the Android event counter is bumped by on a host-forced refresh.
pub const DEFAULT_REFRESH_COUNTER_BUMP: u64 = 100;

/// Trigger character for user mentions.
pub const MENTION_TRIGGER: char = '@';

/// Trigger character for cross-post references.
pub const XPOST_TRIGGER: char = '+';

/// Key code reported for the backspace key.
pub const KEY_BACKSPACE: u32 = 8;
/// Key code reported for the enter key.
pub const KEY_ENTER: u32 = 13;
/// Key code reported for the forward-delete key.
pub const KEY_DELETE: u32 = 46;
