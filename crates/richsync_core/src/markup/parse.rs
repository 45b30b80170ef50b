//! Markup → value parsing.

use super::entities::decode_entities;
use super::lexer::{Lexer, Token};
use super::MarkupOptions;
use crate::constants::{LINE_SEPARATOR, OBJECT_REPLACEMENT_CHARACTER};
use crate::format::{format_type_for_tag, Attributes, Format, FormatList};
use crate::value::RichTextValue;
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

fn collapsible_whitespace() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\n\r\t]+").expect("static regex"))
}

/// One open element on the parse stack.
enum Frame {
    Format { tag: String, format: Format },
    /// A line element in multiline mode.
    Line { tag: String },
    /// Unknown tags and redundant same-type nesting: matched on close, contribute nothing.
    Ignored { tag: String },
}

impl Frame {
    fn tag(&self) -> &str {
        match self {
            Frame::Format { tag, .. } | Frame::Line { tag } | Frame::Ignored { tag } => tag,
        }
    }
}

struct Builder<'o> {
    options: &'o MarkupOptions,
    text: String,
    formats: Vec<FormatList>,
    replacements: Vec<Option<Format>>,
    stack: Vec<Frame>,
    lines_started: usize,
}

impl<'o> Builder<'o> {
    fn new(options: &'o MarkupOptions) -> Self {
        Self {
            options,
            text: String::new(),
            formats: Vec::new(),
            replacements: Vec::new(),
            stack: Vec::new(),
            lines_started: 0,
        }
    }

    fn current_formats(&self) -> FormatList {
        self.stack
            .iter()
            .filter_map(|frame| match frame {
                Frame::Format { format, .. } => Some(format.clone()),
                _ => None,
            })
            .collect()
    }

    fn push_char(&mut self, ch: char, formats: FormatList, replacement: Option<Format>) {
        self.text.push(ch);
        self.formats.push(formats);
        self.replacements.push(replacement);
    }

    fn push_text(&mut self, raw: &str) {
        let collapsed;
        let raw = if self.options.preserve_white_space {
            raw
        } else {
            collapsed = collapsible_whitespace().replace_all(raw, " ");
            collapsed.as_ref()
        };
        let decoded = decode_entities(raw);
        if decoded.is_empty() {
            return;
        }
        let formats = self.current_formats();
        for ch in decoded.chars() {
            self.push_char(ch, formats.clone(), None);
        }
    }

    fn is_line_tag(&self, tag: &str) -> bool {
        self.options.multiline_tag.as_deref() == Some(tag)
    }

    fn open(&mut self, name: String, attributes: Attributes, self_closing: bool) {
        if name == "br" {
            self.push_char('\n', Vec::new(), None);
            return;
        }

        if self.is_line_tag(&name) && !self.stack.iter().any(|f| matches!(f, Frame::Line { .. })) {
            if self.lines_started > 0 || !self.text.is_empty() {
                self.push_char(LINE_SEPARATOR, Vec::new(), None);
            }
            self.lines_started += 1;
            // formats never cross a line boundary
            self.stack.clear();
            if !self_closing {
                self.stack.push(Frame::Line { tag: name });
            }
            return;
        }

        match format_type_for_tag(&name) {
            Some(spec) if spec.object => {
                let object = Format {
                    format_type: spec.name.to_string(),
                    attributes,
                };
                self.push_char(OBJECT_REPLACEMENT_CHARACTER, Vec::new(), Some(object));
            }
            Some(spec) => {
                if self_closing || is_void(&name) {
                    return;
                }
                let nested = self.stack.iter().any(|frame| {
                    matches!(frame, Frame::Format { format, .. } if format.is_type(spec.name))
                });
                if nested {
                    self.stack.push(Frame::Ignored { tag: name });
                } else {
                    let format = Format {
                        format_type: spec.name.to_string(),
                        attributes,
                    };
                    self.stack.push(Frame::Format { tag: name, format });
                }
            }
            None => {
                trace!(tag = %name, "dropping unknown markup tag");
                if !self_closing && !is_void(&name) {
                    self.stack.push(Frame::Ignored { tag: name });
                }
            }
        }
    }

    fn close(&mut self, name: &str) {
        match self.stack.iter().rposition(|frame| frame.tag() == name) {
            Some(index) => self.stack.truncate(index),
            None => trace!(tag = %name, "ignoring unmatched closing tag"),
        }
    }

    fn finish(self) -> RichTextValue {
        RichTextValue {
            text: self.text,
            formats: self.formats,
            replacements: self.replacements,
            start: 0,
            end: 0,
            pending_formats: None,
        }
    }
}

/// Parses `markup` into a value with a collapsed caret at 0.
///
/// Never fails: unknown tags are dropped with their text kept, unmatched
/// closing tags are ignored, and a closing tag pops every element opened
/// after its match.
pub(crate) fn parse(markup: &str, options: &MarkupOptions) -> RichTextValue {
    let mut builder = Builder::new(options);
    for token in Lexer::new(markup) {
        match token {
            Token::Text(raw) => builder.push_text(raw),
            Token::Open {
                name,
                attributes,
                self_closing,
            } => builder.open(name, attributes, self_closing),
            Token::Close { name } => builder.close(&name),
            Token::Skipped => {}
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{BOLD, IMAGE, ITALIC, LINK};

    fn inline() -> MarkupOptions {
        MarkupOptions::default()
    }

    fn multiline() -> MarkupOptions {
        MarkupOptions {
            multiline_tag: Some("p".to_string()),
            ..MarkupOptions::default()
        }
    }

    #[test]
    fn parses_nested_formats_outermost_first() {
        let value = parse("a<strong>b<em>c</em></strong>", &inline());
        assert_eq!(value.text, "abc");
        assert!(value.formats[0].is_empty());
        assert_eq!(value.formats[1], vec![Format::new(BOLD)]);
        assert_eq!(
            value.formats[2],
            vec![Format::new(BOLD), Format::new(ITALIC)]
        );
    }

    #[test]
    fn keeps_link_attributes() {
        let value = parse(r#"<a href="https://example.com">x</a>"#, &inline());
        assert_eq!(value.formats[0], vec![Format::link("https://example.com")]);
        assert!(value.formats[0][0].is_type(LINK));
    }

    #[test]
    fn unknown_tags_keep_their_text() {
        let value = parse("<span class=\"x\">hi <b>there</b></span>", &inline());
        assert_eq!(value.text, "hi there");
        assert!(value.formats[0].is_empty());
        assert_eq!(value.formats[3], vec![Format::new(BOLD)]);
    }

    #[test]
    fn overlapping_close_pops_later_opened_elements() {
        let value = parse("<b>a<i>b</b>c</i>d", &inline());
        assert_eq!(value.text, "abcd");
        assert_eq!(value.formats[0], vec![Format::new(BOLD)]);
        assert_eq!(
            value.formats[1],
            vec![Format::new(BOLD), Format::new(ITALIC)]
        );
        assert!(value.formats[2].is_empty());
        assert!(value.formats[3].is_empty());
    }

    #[test]
    fn unmatched_close_is_ignored() {
        let value = parse("a</em>b", &inline());
        assert_eq!(value.text, "ab");
        assert!(value.formats.iter().all(Vec::is_empty));
    }

    #[test]
    fn duplicate_nesting_does_not_duplicate_format() {
        let value = parse("<b><strong>x</strong>y</b>", &inline());
        assert_eq!(value.formats[0], vec![Format::new(BOLD)]);
        assert_eq!(value.formats[1], vec![Format::new(BOLD)]);
    }

    #[test]
    fn br_and_img_map_to_chars() {
        let value = parse(r#"a<br>b<img src="p.png">"#, &inline());
        assert_eq!(value.text, "a\nb\u{fffc}");
        assert_eq!(
            value.replacements[3],
            Some(Format::new(IMAGE).with_attribute("src", "p.png"))
        );
        assert!(value.replacements[..3].iter().all(Option::is_none));
        assert!(value.is_well_formed());
    }

    #[test]
    fn whitespace_collapses_unless_preserved() {
        assert_eq!(parse("a\n\t b", &inline()).text, "a  b");
        let preserve = MarkupOptions {
            preserve_white_space: true,
            ..MarkupOptions::default()
        };
        assert_eq!(parse("a\n\t b", &preserve).text, "a\n\t b");
    }

    #[test]
    fn multiline_paragraphs_join_with_line_separator() {
        let value = parse("<p>one <b>x</b></p><p></p><p>two</p>", &multiline());
        assert_eq!(value.text, "one x\u{2028}\u{2028}two");
        assert!(value.formats[5].is_empty());
    }

    #[test]
    fn unclosed_format_does_not_leak_into_next_line() {
        let value = parse("<p><em>a</p><p>b</p>", &multiline());
        assert_eq!(value.text, "a\u{2028}b");
        assert_eq!(value.formats[0], vec![Format::new(ITALIC)]);
        assert!(value.formats[2].is_empty());
    }

    #[test]
    fn decodes_entities_in_text() {
        assert_eq!(parse("a &lt;b&gt; &amp; c", &inline()).text, "a <b> & c");
    }
}
