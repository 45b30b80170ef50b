//! Immutable rich-text value and its pure edit operations.
//!
//! Every operation borrows the value and returns a new one; nothing mutates
//! in place. Offsets are char indices into `text`.

use crate::constants::LINE_SEPARATOR;
use crate::error::CoreError;
use crate::format::{upsert, Format, FormatList};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Text, per-character formats and replacements, plus a selection.
///
/// `formats` and `replacements` always hold exactly one entry per char of
/// `text`. `start > end` is representable (reverse selection); range
/// operations normalize it first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextValue {
    pub text: String,
    pub formats: Vec<FormatList>,
    pub replacements: Vec<Option<Format>>,
    pub start: usize,
    pub end: usize,
    /// Formats pending at a collapsed caret; they apply to the next inserted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_formats: Option<FormatList>,
}

impl RichTextValue {
    /// An empty value with a collapsed caret at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unformatted value holding `text`, caret at 0.
    pub fn from_text(text: &str) -> Self {
        let len = text.chars().count();
        Self {
            text: text.to_string(),
            formats: vec![Vec::new(); len],
            replacements: vec![None; len],
            start: 0,
            end: 0,
            pending_formats: None,
        }
    }

    /// Length of `text` in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// True iff there is no text and no replacement.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.replacements.iter().all(Option::is_none)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Checks the parallel-array and selection invariants.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSelection`] when either selection offset is
    /// past the end of the text or the annotation arrays are out of step.
    pub fn validate(&self) -> Result<(), CoreError> {
        let len = self.len();
        if self.formats.len() != len
            || self.replacements.len() != len
            || self.start > len
            || self.end > len
        {
            return Err(CoreError::InvalidSelection {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    /// Selection as an ordered range (`min..max`).
    pub fn selection_range(&self) -> Range<usize> {
        self.start.min(self.end)..self.start.max(self.end)
    }

    /// Returns the value with a new selection clamped to `[0, len]`.
    ///
    /// Direction is preserved; pending formats are dropped because they only
    /// belong to the caret position they were toggled at.
    pub fn with_selection(&self, start: usize, end: usize) -> Self {
        let len = self.len();
        Self {
            start: start.min(len),
            end: end.min(len),
            pending_formats: None,
            ..self.clone()
        }
    }

    /// Text with object placeholders dropped and line separators as `\n`.
    pub fn text_content(&self) -> String {
        self.text
            .chars()
            .filter(|c| *c != crate::constants::OBJECT_REPLACEMENT_CHARACTER)
            .map(|c| if c == LINE_SEPARATOR { '\n' } else { c })
            .collect()
    }

    /// Copy of the `[start, end)` sub-range with a collapsed caret at 0.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let len = self.len();
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);
        Self {
            text: self.text.chars().skip(lo).take(hi - lo).collect(),
            formats: self.formats.get(lo..hi).map(<[_]>::to_vec).unwrap_or_default(),
            replacements: self
                .replacements
                .get(lo..hi)
                .map(<[_]>::to_vec)
                .unwrap_or_default(),
            start: 0,
            end: 0,
            pending_formats: None,
        }
    }

    /// Replaces the selection with `fragment`; the caret lands after it.
    pub fn insert(&self, fragment: &RichTextValue) -> Self {
        self.insert_at(fragment, self.start, self.end)
    }

    /// Replaces `[start, end]` with `fragment`; the caret lands after it.
    ///
    /// Malformed values (or offsets past the end) come back unchanged: this
    /// sits on the input path and must never fail.
    pub fn insert_at(&self, fragment: &RichTextValue, start: usize, end: usize) -> Self {
        let len = self.len();
        if !self.is_well_formed() || !fragment.is_well_formed() || start > len || end > len {
            return self.clone();
        }
        let lo = start.min(end);
        let hi = start.max(end);
        let chars: Vec<char> = self.text.chars().collect();

        let mut text = String::with_capacity(self.text.len() + fragment.text.len());
        text.extend(&chars[..lo]);
        text.push_str(&fragment.text);
        text.extend(&chars[hi..]);

        let mut formats = Vec::with_capacity(len - (hi - lo) + fragment.formats.len());
        formats.extend_from_slice(&self.formats[..lo]);
        formats.extend_from_slice(&fragment.formats);
        formats.extend_from_slice(&self.formats[hi..]);

        let mut replacements = Vec::with_capacity(formats.len());
        replacements.extend_from_slice(&self.replacements[..lo]);
        replacements.extend_from_slice(&fragment.replacements);
        replacements.extend_from_slice(&self.replacements[hi..]);

        let caret = lo + fragment.len();
        Self {
            text,
            formats,
            replacements,
            start: caret,
            end: caret,
            pending_formats: None,
        }
    }

    /// Inserts plain text over the selection.
    ///
    /// Pending formats win: every inserted char carries them, replacing
    /// any same-type format it would otherwise have.
    pub fn insert_str(&self, text: &str) -> Self {
        let mut fragment = Self::from_text(text);
        if let Some(pending) = &self.pending_formats {
            for list in &mut fragment.formats {
                for format in pending {
                    upsert(list, format);
                }
            }
        }
        self.insert(&fragment)
    }

    /// Deletes the selection. A collapsed selection is a no-op.
    pub fn remove(&self) -> Self {
        self.remove_range(self.start, self.end)
    }

    /// Deletes `[start, end)`. `start == end` is a no-op.
    pub fn remove_range(&self, start: usize, end: usize) -> Self {
        if start == end {
            return self.clone();
        }
        self.insert_at(&Self::new(), start, end)
    }

    /// Applies `format` to the selection.
    pub fn apply_format(&self, format: Format) -> Self {
        self.apply_format_range(format, self.start, self.end)
    }

    /// Applies `format` to every char in `[start, end)`.
    ///
    /// When collapsed inside a run that already has a format of this type,
    /// the whole run is updated (editing a link at the caret). Otherwise a
    /// collapsed apply records the format as pending.
    pub fn apply_format_range(&self, format: Format, start: usize, end: usize) -> Self {
        if !self.is_well_formed() {
            return self.clone();
        }
        let len = self.len();
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);
        let mut next = self.clone();

        if lo == hi {
            if let Some(run) = self.run_at(lo, &format.format_type) {
                for list in &mut next.formats[run] {
                    upsert(list, &format);
                }
                next.pending_formats = None;
                return next;
            }
            let mut pending: FormatList = self
                .pending_formats
                .clone()
                .unwrap_or_else(|| self.active_formats())
                .into_iter()
                .filter(|f| !f.is_type(&format.format_type))
                .collect();
            pending.push(format);
            next.pending_formats = Some(pending);
            return next;
        }

        for list in &mut next.formats[lo..hi] {
            upsert(list, &format);
        }
        next.pending_formats = None;
        next
    }

    /// Removes every format of `format_type` from the selection.
    pub fn remove_format(&self, format_type: &str) -> Self {
        if !self.is_well_formed() {
            return self.clone();
        }
        let Range { start: lo, end: hi } = self.selection_range();
        let mut next = self.clone();
        let range = if lo == hi {
            match self.run_at(lo, format_type) {
                Some(run) => run,
                None => {
                    let pending: FormatList = self
                        .pending_formats
                        .clone()
                        .unwrap_or_else(|| self.active_formats())
                        .into_iter()
                        .filter(|f| !f.is_type(format_type))
                        .collect();
                    next.pending_formats = Some(pending);
                    return next;
                }
            }
        } else {
            lo..hi
        };
        for list in &mut next.formats[range] {
            list.retain(|f| !f.is_type(format_type));
        }
        next.pending_formats = None;
        next
    }

    /// Contiguous run around a collapsed caret carrying one identical format
    /// of `format_type`.
    fn run_at(&self, caret: usize, format_type: &str) -> Option<Range<usize>> {
        let anchor = self
            .formats
            .get(caret)
            .and_then(|list| list.iter().find(|f| f.is_type(format_type)))?;
        let has_anchor = |index: usize| self.formats[index].iter().any(|f| f == anchor);
        let mut lo = caret;
        while lo > 0 && has_anchor(lo - 1) {
            lo -= 1;
        }
        let mut hi = caret + 1;
        while hi < self.formats.len() && has_anchor(hi) {
            hi += 1;
        }
        Some(lo..hi)
    }

    /// Formats active for the current selection.
    ///
    /// Collapsed: pending formats if any, else the shorter of the format
    /// lists on either side of the caret (so text boundaries report none).
    /// Ranged: the intersection across every selected char.
    pub fn active_formats(&self) -> FormatList {
        let len = self.formats.len();
        let Range { start: lo, end: hi } = self.selection_range();
        let lo = lo.min(len);
        let hi = hi.min(len);

        if lo == hi {
            if let Some(pending) = &self.pending_formats {
                return pending.clone();
            }
            let before = lo.checked_sub(1).and_then(|i| self.formats.get(i));
            let after = self.formats.get(lo);
            let before_len = before.map_or(0, Vec::len);
            let after_len = after.map_or(0, Vec::len);
            let chosen = if before_len < after_len { before } else { after };
            return chosen.cloned().unwrap_or_default();
        }

        let mut active = self.formats[lo].clone();
        for list in &self.formats[lo + 1..hi] {
            active.retain(|format| list.contains(format));
            if active.is_empty() {
                break;
            }
        }
        active
    }

    /// The active format of `format_type`, if any.
    pub fn active_format(&self, format_type: &str) -> Option<Format> {
        self.active_formats()
            .into_iter()
            .find(|f| f.is_type(format_type))
    }

    /// True when a collapsed caret sits on an empty line of a multiline value.
    pub fn is_empty_line(&self) -> bool {
        if self.start != self.end {
            return false;
        }
        let chars: Vec<char> = self.text.chars().collect();
        if chars.is_empty() {
            return true;
        }
        let caret = self.start.min(chars.len());
        if caret == 0 && chars[0] == LINE_SEPARATOR {
            return true;
        }
        if caret == chars.len() && chars[chars.len() - 1] == LINE_SEPARATOR {
            return true;
        }
        caret > 0
            && caret < chars.len()
            && chars[caret - 1] == LINE_SEPARATOR
            && chars[caret] == LINE_SEPARATOR
    }

    /// Removes the line separator adjacent to the selection, merging lines.
    ///
    /// `backward` looks before the selection start, otherwise after its end.
    /// Returns `None` when there is no separator to remove.
    pub fn remove_line_separator(&self, backward: bool) -> Option<Self> {
        if !self.is_well_formed() {
            return None;
        }
        let Range { start, end } = self.selection_range();
        let collapsed = start == end;
        let chars: Vec<char> = self.text.chars().collect();
        let (index, remove_start, remove_end) = if backward {
            let index = start.checked_sub(1)?;
            (index, if collapsed { index } else { start }, end)
        } else {
            (end, start, if collapsed { end + 1 } else { end })
        };
        if chars.get(index) != Some(&LINE_SEPARATOR) {
            return None;
        }
        Some(self.remove_range(remove_start, remove_end))
    }
}
