//! Core domain library for richsync (value model, markup codec, config).

/// Active-format resolution for the renderer's toggle chrome.
pub mod active;
/// Engine configuration loading and defaults.
pub mod config;
/// Shared constants (reserved code points, defaults).
pub mod constants;
/// Error types for core and engine code.
pub mod error;
/// Format spans and the registry of known format types.
pub mod format;
/// Markup serialization and parsing.
pub mod markup;
/// Plain-text helpers (URL detection, tag stripping, trigger positions).
pub mod text;
/// Immutable rich-text value and its pure edit operations.
pub mod value;

pub use active::resolve_active_formats;
pub use config::{EngineConfig, Platform};
pub use error::CoreError;
pub use format::{Attributes, Format, FormatList};
pub use markup::{from_markup, to_markup, MarkupOptions};
pub use value::RichTextValue;
