//! Plain-text helpers used by the paste and trigger paths.

use crate::constants::LINE_SEPARATOR;
use crate::value::RichTextValue;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Removes anything that looks like a tag.
pub fn strip_tags(markup: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex"))
        .replace_all(markup, "")
        .into_owned()
}

/// True when `text` (trimmed) is a single absolute URL.
pub fn is_url(text: &str) -> bool {
    let candidate = text.trim();
    if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
        return false;
    }
    Url::parse(candidate).is_ok_and(|url| url.has_host() || url.scheme() == "mailto")
}

/// True when a trigger character typed at the caret starts a lookup.
///
/// That is the case on empty text, at offset 0, or right after a line
/// break or space.
pub fn is_trigger_position(value: &RichTextValue) -> bool {
    if value.text.is_empty() || value.start == 0 {
        return true;
    }
    let previous = value.text.chars().nth(value.start - 1);
    matches!(previous, Some('\n' | ' ' | LINE_SEPARATOR))
}
