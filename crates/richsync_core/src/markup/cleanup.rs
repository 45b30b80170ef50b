//! Normalization of markup reported by the native renderer, and shaping of
//! markup sent to it.

use super::serialize::push_open_tag;
use crate::constants::EMPTY_PARAGRAPH_TAGS;
use crate::config::Platform;
use crate::format::Attributes;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

fn tag_regex(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .ok()
}

/// Strips a leading `<tag ...>` and a trailing `</tag>`.
pub fn remove_root_tag(tag: &str, markup: &str) -> String {
    let tag = regex::escape(tag);
    let mut result = markup.to_string();
    if let Some(opening) = tag_regex(&format!("^<{tag}[^>]*>")) {
        result = opening.replace_all(&result, "").into_owned();
    }
    if let Some(closing) = tag_regex(&format!("</{tag}>$")) {
        result = closing.replace_all(&result, "").into_owned();
    }
    result
}

/// Removes every bare `<tag>` and `</tag>`.
pub fn remove_tag(tag: &str, markup: &str) -> String {
    let tag = regex::escape(tag);
    let mut result = markup.to_string();
    if let Some(opening) = tag_regex(&format!("<{tag}>")) {
        result = opening.replace_all(&result, "").into_owned();
    }
    if let Some(closing) = tag_regex(&format!("</{tag}>")) {
        result = closing.replace_all(&result, "").into_owned();
    }
    result
}

/// Replaces non-breaking space references with plain spaces.
pub fn unescape_spaces(markup: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            RegexBuilder::new("&nbsp;|&#160;")
                .case_insensitive(true)
                .build()
                .expect("static regex")
        })
        .replace_all(markup, " ")
        .into_owned()
}

/// Wraps content in `<p>…</p>` when a `p` multiline field lost its first
/// paragraph tag.
pub fn restore_paragraph_tags(markup: &str, multiline_tag: Option<&str>) -> String {
    if multiline_tag == Some("p") && !markup.starts_with("<p>") {
        return format!("<p>{markup}</p>");
    }
    markup.to_string()
}

/// Root tags to strip from inbound native markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootTagCleanup<'a> {
    pub tag_name: Option<&'a str>,
    pub root_tags_to_eliminate: &'a [String],
    pub tags_to_eliminate: &'a [String],
}

impl RootTagCleanup<'_> {
    /// Applies root-tag and tag elimination in order.
    pub fn apply(&self, markup: &str) -> String {
        let mut result = match self.tag_name {
            Some(tag) => remove_root_tag(tag, markup),
            None => markup.to_string(),
        };
        for tag in self.root_tags_to_eliminate {
            result = remove_root_tag(tag, &result);
        }
        for tag in self.tags_to_eliminate {
            result = remove_tag(tag, &result);
        }
        result
    }
}

/// Normalizes markup reported by the renderer into the host's form.
///
/// Spaces are unescaped, root tags removed, and on Android a `p` multiline
/// field gets its first paragraph tag back.
pub fn normalize_native_markup(
    raw: &str,
    cleanup: &RootTagCleanup<'_>,
    multiline_tag: Option<&str>,
    platform: Platform,
) -> String {
    let stripped = cleanup.apply(&unescape_spaces(raw));
    if platform.is_ios() {
        stripped
    } else {
        restore_paragraph_tags(&stripped, multiline_tag)
    }
}

/// Shapes serialized content into the payload the renderer displays.
///
/// On Android empty content goes out as `""` so the renderer shows its
/// placeholder. `ol` wrappers carry `reversed` and `start`.
pub fn render_markup(
    content: &str,
    tag_name: Option<&str>,
    reversed: bool,
    start: Option<u32>,
    platform: Platform,
) -> String {
    if !platform.is_ios() && (content.is_empty() || content == EMPTY_PARAGRAPH_TAGS) {
        return String::new();
    }
    let Some(tag) = tag_name else {
        return content.to_string();
    };
    let mut out = String::with_capacity(content.len() + 2 * tag.len() + 16);
    if tag == "ol" {
        out.push_str("<ol");
        if reversed {
            out.push_str(" reversed");
        }
        if let Some(start) = start.filter(|s| *s != 0) {
            out.push_str(&format!(" start={start}"));
        }
        out.push('>');
    } else {
        push_open_tag(&mut out, tag, &Attributes::new());
    }
    out.push_str(content);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    out
}

/// Number of `<br>` tags directly before a closing `</p>` at the very end.
///
/// Android renderers drop these, so a forced selection has to move left by
/// the same amount.
pub fn trailing_break_count(markup: &str) -> usize {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(<br>)+</p>$").expect("static regex"))
        .find(markup)
        .map_or(0, |m| m.as_str().matches("<br>").count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_root_tags_with_attributes() {
        assert_eq!(remove_root_tag("h2", "<h2 class=\"x\">Title</h2>"), "Title");
        assert_eq!(remove_root_tag("p", "a<p>b</p>c"), "a<p>b</p>c");
    }

    #[test]
    fn removes_inner_tags() {
        assert_eq!(remove_tag("span", "<span>a</span>b<SPAN>c</SPAN>"), "abc");
    }

    #[test]
    fn cleanup_applies_every_rule() {
        let roots = vec!["div".to_string()];
        let inner = vec!["span".to_string()];
        let cleanup = RootTagCleanup {
            tag_name: Some("li"),
            root_tags_to_eliminate: &roots,
            tags_to_eliminate: &inner,
        };
        assert_eq!(
            cleanup.apply("<li><div>a<span>b</span></div></li>"),
            "ab"
        );
    }

    #[test]
    fn unescapes_non_breaking_spaces() {
        assert_eq!(unescape_spaces("a&nbsp;b&#160;c&NBSP;d"), "a b c d");
    }

    #[test]
    fn paragraph_tags_restored_for_p_only() {
        assert_eq!(restore_paragraph_tags("x", Some("p")), "<p>x</p>");
        assert_eq!(restore_paragraph_tags("", Some("p")), "<p></p>");
        assert_eq!(restore_paragraph_tags("<p>x</p>", Some("p")), "<p>x</p>");
        assert_eq!(restore_paragraph_tags("x", Some("li")), "x");
    }

    #[test]
    fn native_markup_normalization_is_platform_aware() {
        let cleanup = RootTagCleanup {
            tag_name: Some("div"),
            ..RootTagCleanup::default()
        };
        assert_eq!(
            normalize_native_markup("<div>a&nbsp;b</div>", &cleanup, Some("p"), Platform::Android),
            "<p>a b</p>"
        );
        assert_eq!(
            normalize_native_markup("<div>a&nbsp;b</div>", &cleanup, Some("p"), Platform::Ios),
            "a b"
        );
    }

    #[test]
    fn render_markup_handles_empty_and_lists() {
        assert_eq!(render_markup("", Some("p"), false, None, Platform::Android), "");
        assert_eq!(
            render_markup("<p></p>", None, false, None, Platform::Android),
            ""
        );
        assert_eq!(
            render_markup("", Some("p"), false, None, Platform::Ios),
            "<p></p>"
        );
        assert_eq!(
            render_markup("<li>a</li>", Some("ol"), true, Some(3), Platform::Android),
            "<ol reversed start=3><li>a</li></ol>"
        );
        assert_eq!(
            render_markup("hi", Some("h2"), false, None, Platform::Android),
            "<h2>hi</h2>"
        );
    }

    #[test]
    fn counts_trailing_breaks() {
        assert_eq!(trailing_break_count("<p>a<br><br></p>"), 2);
        assert_eq!(trailing_break_count("<p>a<br>b</p>"), 0);
        assert_eq!(trailing_break_count("a<br>"), 0);
    }
}
