//! Format spans and the registry of format types the markup codec knows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered attribute map; sorted keys keep serialized markup deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Formats covering one character, outermost first.
pub type FormatList = Vec<Format>;

pub const BOLD: &str = "core/bold";
pub const ITALIC: &str = "core/italic";
pub const STRIKETHROUGH: &str = "core/strikethrough";
pub const LINK: &str = "core/link";
pub const TEXT_COLOR: &str = "core/text-color";
pub const CODE: &str = "core/code";
pub const SUPERSCRIPT: &str = "core/superscript";
pub const SUBSCRIPT: &str = "core/subscript";
pub const KEYBOARD: &str = "core/keyboard";
pub const IMAGE: &str = "core/image";

/// A typed, attributed annotation. Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Format {
    #[serde(rename = "type")]
    pub format_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Format {
    /// Creates a format with no attributes.
    pub fn new(format_type: impl Into<String>) -> Self {
        Self {
            format_type: format_type.into(),
            attributes: Attributes::new(),
        }
    }

    /// Returns the format with one more attribute set.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// A link format pointing at `href`.
    pub fn link(href: impl Into<String>) -> Self {
        Self::new(LINK).with_attribute("href", href)
    }

    /// Returns the attribute value for `key`, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_type(&self, format_type: &str) -> bool {
        self.format_type == format_type
    }

    /// Registry entry for this format's type, if it is a known type.
    pub fn spec(&self) -> Option<&'static FormatType> {
        format_type(&self.format_type)
    }
}

/// Registry entry describing how a format type maps onto markup.
#[derive(Debug, PartialEq, Eq)]
pub struct FormatType {
    /// Format type name, e.g. `core/bold`.
    pub name: &'static str,
    /// Canonical tag emitted when serializing.
    pub tag_name: &'static str,
    /// Extra tags accepted when parsing.
    pub aliases: &'static [&'static str],
    /// Object types occupy a replacement character instead of wrapping text.
    pub object: bool,
}

impl FormatType {
    fn matches_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(tag))
    }
}

static FORMAT_TYPES: &[FormatType] = &[
    FormatType {
        name: BOLD,
        tag_name: "strong",
        aliases: &["b"],
        object: false,
    },
    FormatType {
        name: ITALIC,
        tag_name: "em",
        aliases: &["i"],
        object: false,
    },
    FormatType {
        name: STRIKETHROUGH,
        tag_name: "s",
        aliases: &["del", "strike"],
        object: false,
    },
    FormatType {
        name: LINK,
        tag_name: "a",
        aliases: &[],
        object: false,
    },
    FormatType {
        name: TEXT_COLOR,
        tag_name: "mark",
        aliases: &[],
        object: false,
    },
    FormatType {
        name: CODE,
        tag_name: "code",
        aliases: &[],
        object: false,
    },
    FormatType {
        name: SUPERSCRIPT,
        tag_name: "sup",
        aliases: &[],
        object: false,
    },
    FormatType {
        name: SUBSCRIPT,
        tag_name: "sub",
        aliases: &[],
        object: false,
    },
    FormatType {
        name: KEYBOARD,
        tag_name: "kbd",
        aliases: &[],
        object: false,
    },
    FormatType {
        name: IMAGE,
        tag_name: "img",
        aliases: &[],
        object: true,
    },
];

/// Renderer toggle names, in the fixed order they are reported.
pub const RENDERER_TOGGLES: &[(&str, &str)] = &[
    (BOLD, "bold"),
    (ITALIC, "italic"),
    (STRIKETHROUGH, "strikethrough"),
    (TEXT_COLOR, "mark"),
];

/// All registered format types.
pub fn format_types() -> &'static [FormatType] {
    FORMAT_TYPES
}

/// Looks up a format type by name.
pub fn format_type(name: &str) -> Option<&'static FormatType> {
    FORMAT_TYPES.iter().find(|entry| entry.name == name)
}

/// Looks up the format type a tag parses into (case-insensitive).
pub fn format_type_for_tag(tag: &str) -> Option<&'static FormatType> {
    FORMAT_TYPES.iter().find(|entry| entry.matches_tag(tag))
}

/// Adds `format` to `list`, replacing any format of the same type in place.
pub(crate) fn upsert(list: &mut FormatList, format: &Format) {
    if let Some(existing) = list.iter_mut().find(|f| f.is_type(&format.format_type)) {
        *existing = format.clone();
    } else {
        list.push(format.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_aliases_resolve_to_types() {
        assert_eq!(format_type_for_tag("strong").map(|t| t.name), Some(BOLD));
        assert_eq!(format_type_for_tag("B").map(|t| t.name), Some(BOLD));
        assert_eq!(
            format_type_for_tag("strike").map(|t| t.name),
            Some(STRIKETHROUGH)
        );
        assert!(format_type_for_tag("span").is_none());
        assert!(format_type(IMAGE).is_some_and(|t| t.object));
    }

    #[test]
    fn upsert_replaces_same_type() {
        let mut list = vec![Format::new(BOLD), Format::link("https://a.test")];
        upsert(&mut list, &Format::link("https://b.test"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].attribute("href"), Some("https://b.test"));
        upsert(&mut list, &Format::new(ITALIC));
        assert_eq!(list.len(), 3);
    }
}
