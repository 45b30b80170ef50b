//! Format activation: which renderer toggles reflect the current selection.

use crate::format::RENDERER_TOGGLES;
use crate::value::RichTextValue;

/// Renderer toggle names active for the value's selection.
///
/// Only format types listed in `supported` are reported, in the fixed
/// toggle order (bold, italic, strikethrough, mark) regardless of the order
/// the formats were applied in. Pending formats at a collapsed caret count,
/// which is why this state is pushed to the renderer instead of being
/// inferred from markup.
pub fn resolve_active_formats<S: AsRef<str>>(
    value: &RichTextValue,
    supported: &[S],
) -> Vec<&'static str> {
    let active = value.active_formats();
    RENDERER_TOGGLES
        .iter()
        .filter(|(format_type, _)| supported.iter().any(|s| s.as_ref() == *format_type))
        .filter(|(format_type, _)| active.iter().any(|f| f.is_type(format_type)))
        .map(|(_, toggle)| *toggle)
        .collect()
}

/// Every format type that maps to a renderer toggle.
pub fn all_toggle_types() -> Vec<&'static str> {
    RENDERER_TOGGLES.iter().map(|(format_type, _)| *format_type).collect()
}
