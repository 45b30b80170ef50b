//! Value → markup serialization.

use super::entities::{escape_attribute, escape_text};
use super::MarkupOptions;
use crate::constants::LINE_SEPARATOR;
use crate::format::{Attributes, Format};
use crate::value::RichTextValue;
use std::ops::Range;

pub(crate) fn push_open_tag(out: &mut String, tag: &str, attributes: &Attributes) {
    out.push('<');
    out.push_str(tag);
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');
}

fn push_close_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Tag for an inline (non-object) format of a registered type.
fn inline_tag(format: &Format) -> Option<&'static str> {
    format
        .spec()
        .filter(|spec| !spec.object)
        .map(|spec| spec.tag_name)
}

/// Emits `value` over `range`, opening and closing tags only where the
/// per-char format lists stop sharing a prefix.
fn serialize_inline(
    value: &RichTextValue,
    range: Range<usize>,
    chars: &[char],
    options: &MarkupOptions,
    out: &mut String,
) {
    let mut open: Vec<(&Format, &'static str)> = Vec::new();

    for index in range {
        let ch = chars[index];
        let replacement = value.replacements[index].as_ref();
        let target: Vec<(&Format, &'static str)> = if replacement.is_some() {
            Vec::new()
        } else {
            value.formats[index]
                .iter()
                .filter_map(|format| inline_tag(format).map(|tag| (format, tag)))
                .collect()
        };

        let shared = open
            .iter()
            .zip(&target)
            .take_while(|(a, b)| a.0 == b.0)
            .count();
        while open.len() > shared {
            if let Some((_, tag)) = open.pop() {
                push_close_tag(out, tag);
            }
        }
        for &(format, tag) in &target[shared..] {
            push_open_tag(out, tag, &format.attributes);
            open.push((format, tag));
        }

        match replacement {
            Some(object) => {
                if let Some(spec) = object.spec() {
                    push_open_tag(out, spec.tag_name, &object.attributes);
                }
            }
            None if ch == '\n' => out.push_str("<br>"),
            None => escape_text(out, ch, options.preserve_white_space),
        }
    }

    while let Some((_, tag)) = open.pop() {
        push_close_tag(out, tag);
    }
}

pub(crate) fn serialize(value: &RichTextValue, options: &MarkupOptions) -> String {
    let chars: Vec<char> = value.text.chars().collect();
    let mut out = String::with_capacity(value.text.len() * 2);
    if !value.is_well_formed() {
        return out;
    }

    let Some(line_tag) = options.multiline_tag.as_deref() else {
        serialize_inline(value, 0..chars.len(), &chars, options, &mut out);
        return out;
    };

    let mut line_start = 0;
    for index in 0..=chars.len() {
        if index < chars.len() && chars[index] != LINE_SEPARATOR {
            continue;
        }
        out.push('<');
        out.push_str(line_tag);
        out.push('>');
        serialize_inline(value, line_start..index, &chars, options, &mut out);
        push_close_tag(&mut out, line_tag);
        line_start = index + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Format, BOLD, ITALIC};

    fn value(text: &str) -> RichTextValue {
        RichTextValue::from_text(text)
    }

    #[test]
    fn shares_common_prefix_between_runs() {
        let styled = value("abc")
            .apply_format_range(Format::new(BOLD), 0, 2)
            .apply_format_range(Format::new(ITALIC), 1, 3);
        assert_eq!(
            serialize(&styled, &MarkupOptions::default()),
            "<strong>a<em>b</em></strong><em>c</em>"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let linked = value("a<b&").apply_format_range(Format::link("https://x.test/?a=1&b=\"2\""), 0, 4);
        assert_eq!(
            serialize(&linked, &MarkupOptions::default()),
            "<a href=\"https://x.test/?a=1&amp;b=&quot;2&quot;\">a&lt;b&amp;</a>"
        );
    }

    #[test]
    fn unknown_format_types_are_not_emitted() {
        let styled = value("ab").apply_format_range(Format::new("acme/sparkle"), 0, 2);
        assert_eq!(serialize(&styled, &MarkupOptions::default()), "ab");
    }

    #[test]
    fn multiline_wraps_each_line() {
        let options = MarkupOptions {
            multiline_tag: Some("p".to_string()),
            ..MarkupOptions::default()
        };
        assert_eq!(serialize(&value("a\u{2028}b"), &options), "<p>a</p><p>b</p>");
        assert_eq!(serialize(&value(""), &options), "<p></p>");
    }

    #[test]
    fn control_whitespace_is_referenced_unless_preserved() {
        assert_eq!(
            serialize(&value("a\tb\rc"), &MarkupOptions::default()),
            "a&#9;b&#13;c"
        );
        let preserve = MarkupOptions {
            preserve_white_space: true,
            ..MarkupOptions::default()
        };
        assert_eq!(serialize(&value("a\tb"), &preserve), "a\tb");
    }

    #[test]
    fn newline_becomes_br() {
        assert_eq!(serialize(&value("a\nb"), &MarkupOptions::default()), "a<br>b");
    }
}
