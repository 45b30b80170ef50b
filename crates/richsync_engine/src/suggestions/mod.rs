//! Trigger-character suggestions (mentions and cross-posts).
//!
//! Lookups run on a worker thread; the controller drains results on its own
//! thread and applies each one as a fresh insert.

mod worker;

pub use worker::{spawn_lookup_worker, LookupEvent, LookupHandle, LookupRequest};

use richsync_core::constants::{MENTION_TRIGGER, XPOST_TRIGGER};
use richsync_core::{CoreError, EngineConfig};
use serde::{Deserialize, Serialize};

/// A kind of suggestion lookup, keyed by its trigger character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Mention,
    Xpost,
}

impl SuggestionKind {
    pub fn trigger(self) -> char {
        match self {
            SuggestionKind::Mention => MENTION_TRIGGER,
            SuggestionKind::Xpost => XPOST_TRIGGER,
        }
    }

    /// Key code the renderer reports for the trigger character.
    pub fn key_code(self) -> u32 {
        u32::from(self.trigger())
    }

    /// Text inserted for a resolved suggestion.
    pub fn completion(self, suggestion: &str) -> String {
        format!("{}{} ", self.trigger(), suggestion)
    }
}

/// Suggestion kinds enabled by `config`, in trigger priority order.
pub fn enabled_kinds(config: &EngineConfig) -> Vec<SuggestionKind> {
    let mut kinds = Vec::new();
    if config.mentions_enabled {
        kinds.push(SuggestionKind::Mention);
    }
    if config.xposts_enabled {
        kinds.push(SuggestionKind::Xpost);
    }
    kinds
}

/// Source of suggestions, typically a picker the user interacts with.
///
/// `Ok(None)` means the user dismissed the picker.
pub trait SuggestionProvider: Send + 'static {
    fn fetch(&mut self, kind: SuggestionKind) -> Result<Option<String>, CoreError>;
}

impl<F> SuggestionProvider for F
where
    F: FnMut(SuggestionKind) -> Result<Option<String>, CoreError> + Send + 'static,
{
    fn fetch(&mut self, kind: SuggestionKind) -> Result<Option<String>, CoreError> {
        self(kind)
    }
}
