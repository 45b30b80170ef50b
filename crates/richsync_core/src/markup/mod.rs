//! Markup codec: converts between [`RichTextValue`] and the HTML-like string
//! the native renderer displays.
//!
//! The round trip is lossless for values whose formats are all registered,
//! non-object types (selection excluded).

mod cleanup;
mod entities;
mod lexer;
mod parse;
mod serialize;

pub use cleanup::{
    normalize_native_markup, remove_root_tag, remove_tag, render_markup, restore_paragraph_tags,
    trailing_break_count, unescape_spaces, RootTagCleanup,
};
pub use entities::decode_entities;

use crate::value::RichTextValue;
use serde::{Deserialize, Serialize};

/// Parse/serialize options shared by both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupOptions {
    /// Line element for multiline fields (usually `p`). Lines are joined by
    /// U+2028 in the value's text.
    pub multiline_tag: Option<String>,
    /// Keep `\n`, `\r` and `\t` in text nodes instead of collapsing them.
    pub preserve_white_space: bool,
}

impl MarkupOptions {
    /// Options for a multiline field using `tag` per line.
    pub fn multiline(tag: impl Into<String>) -> Self {
        Self {
            multiline_tag: Some(tag.into()),
            preserve_white_space: false,
        }
    }
}

/// Serializes `value`, optionally wrapped in `<wrapper_tag>…</wrapper_tag>`.
///
/// # Arguments
/// - `value`: Value to serialize; a malformed value serializes as empty.
/// - `wrapper_tag`: Optional element wrapped around the whole output.
/// - `options`: Multiline and whitespace options.
///
/// # Returns
/// Markup with one open/close tag pair per run of shared formats.
pub fn to_markup(value: &RichTextValue, wrapper_tag: Option<&str>, options: &MarkupOptions) -> String {
    let body = serialize::serialize(value, options);
    match wrapper_tag {
        Some(tag) => format!("<{tag}>{body}</{tag}>"),
        None => body,
    }
}

/// Parses markup best-effort into a value with a collapsed caret at 0.
pub fn from_markup(markup: &str, options: &MarkupOptions) -> RichTextValue {
    parse::parse(markup, options)
}

impl RichTextValue {
    /// Parses `markup` (see [`from_markup`]).
    pub fn from_markup(markup: &str, options: &MarkupOptions) -> Self {
        from_markup(markup, options)
    }

    /// Serializes the value without a wrapper (see [`to_markup`]).
    pub fn to_markup(&self, options: &MarkupOptions) -> String {
        to_markup(self, None, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LINE_SEPARATOR;
    use crate::format::{Format, BOLD, CODE, IMAGE, ITALIC, STRIKETHROUGH, TEXT_COLOR};

    fn assert_round_trip(value: &RichTextValue, options: &MarkupOptions) {
        let markup = to_markup(value, None, options);
        let parsed = from_markup(&markup, options);
        assert_eq!(parsed.text, value.text, "markup: {markup}");
        assert_eq!(parsed.formats, value.formats, "markup: {markup}");
        assert_eq!(parsed.replacements, value.replacements, "markup: {markup}");
    }

    #[test]
    fn round_trips_overlapping_formats() {
        let value = RichTextValue::from_text("The quick brown fox")
            .apply_format_range(Format::new(BOLD), 4, 15)
            .apply_format_range(Format::new(ITALIC), 10, 19)
            .apply_format_range(Format::link("https://fox.test?a=1&b=2"), 0, 3)
            .apply_format_range(
                Format::new(TEXT_COLOR).with_attribute("style", "color:#f00"),
                16,
                19,
            )
            .apply_format_range(Format::new(STRIKETHROUGH), 5, 6)
            .apply_format_range(Format::new(CODE), 1, 2);
        assert_round_trip(&value, &MarkupOptions::default());
    }

    #[test]
    fn round_trips_escapes_breaks_and_objects() {
        let image = RichTextValue {
            text: "\u{fffc}".to_string(),
            formats: vec![Vec::new()],
            replacements: vec![Some(Format::new(IMAGE).with_attribute("src", "a.png"))],
            ..RichTextValue::default()
        };
        let value = RichTextValue::from_text("1 < 2 & 3 > 0\nnext ")
            .with_selection(2, 2)
            .insert(&image);
        assert_round_trip(&value, &MarkupOptions::default());
    }

    #[test]
    fn round_trips_multiline() {
        let text = format!("first{LINE_SEPARATOR}{LINE_SEPARATOR}third");
        let value = RichTextValue::from_text(&text).apply_format_range(Format::new(BOLD), 0, 5);
        assert_round_trip(&value, &MarkupOptions::multiline("p"));
        assert_round_trip(&RichTextValue::new(), &MarkupOptions::multiline("p"));
    }

    #[test]
    fn round_trips_control_whitespace() {
        let preserve = MarkupOptions {
            preserve_white_space: true,
            ..MarkupOptions::default()
        };
        for text in ["a\tb\rc", "\t\t", "x\r\n\ty", "\r"] {
            let value = RichTextValue::from_text(text).apply_format_range(Format::new(BOLD), 0, 1);
            assert_round_trip(&value, &MarkupOptions::default());
            assert_round_trip(&value, &preserve);
            assert_round_trip(&value, &MarkupOptions::multiline("p"));
        }
    }

    #[test]
    fn wrapper_tag_surrounds_output() {
        let value = RichTextValue::from_text("x");
        assert_eq!(
            to_markup(&value, Some("h2"), &MarkupOptions::default()),
            "<h2>x</h2>"
        );
    }

    #[test]
    fn inherent_methods_delegate() {
        let value = RichTextValue::from_markup("<em>x</em>", &MarkupOptions::default());
        assert_eq!(value.formats[0], vec![Format::new(ITALIC)]);
        assert_eq!(value.to_markup(&MarkupOptions::default()), "<em>x</em>");
    }
}
