//! Host commands: inserts, format edits, paste, and suggestion results.

use super::{PendingLookup, SyncController};
use crate::protocol::{EventOutcome, PasteRequest};
use crate::suggestions::{LookupEvent, LookupHandle, LookupRequest, SuggestionKind};
use crate::surface::{EditorHost, NativeSurface};
use crossbeam_channel::RecvTimeoutError;
use richsync_core::active::resolve_active_formats;
use richsync_core::markup::decode_entities;
use richsync_core::text::{is_url, strip_tags};
use richsync_core::{Format, RichTextValue};
use std::time::Duration;
use tracing::{debug, info, warn};

impl<S: NativeSurface, H: EditorHost> SyncController<S, H> {
    /// Inserts `text` over the current selection and refreshes the renderer.
    pub fn insert_text(&mut self, text: &str) -> EventOutcome {
        let record = self.record();
        self.insert_string(record, text)
    }

    /// Inserts into a specific record (possibly captured earlier).
    ///
    /// Empty strings are ignored. The counter is bumped so the renderer's
    /// echo of this edit is never taken as the authoritative source.
    pub(crate) fn insert_string(&mut self, record: RichTextValue, text: &str) -> EventOutcome {
        if text.is_empty() {
            return EventOutcome::Ignored;
        }
        self.commit_record(record.insert_str(text));
        EventOutcome::Applied
    }

    /// Applies `format` to the selection (pending at a collapsed caret).
    pub fn apply_format(&mut self, format: Format) -> EventOutcome {
        let record = self.record().apply_format(format);
        self.commit_record(record);
        EventOutcome::Applied
    }

    /// Removes every format of `format_type` from the selection.
    pub fn remove_format(&mut self, format_type: &str) -> EventOutcome {
        let record = self.record().remove_format(format_type);
        self.commit_record(record);
        EventOutcome::Applied
    }

    /// Clipboard paste.
    ///
    /// A bare URL pasted over a selection links the selection and keeps its
    /// text. Everything else goes to the host with the current record.
    pub fn on_paste(&mut self, plain_text: &str, html: Option<String>, files: Vec<String>) -> EventOutcome {
        let record = self.record();

        if !record.is_collapsed() {
            let source = html
                .as_deref()
                .filter(|html| !html.is_empty())
                .unwrap_or(plain_text);
            let stripped = strip_tags(source);
            let trimmed = stripped.trim();
            if is_url(trimmed) {
                let href = decode_entities(trimmed);
                info!(href = %href, "created link from pasted URL");
                self.commit_record(record.apply_format(Format::link(href)));
                return EventOutcome::Handled;
            }
        }

        let active_formats = resolve_active_formats(&record, &self.supported_toggles());
        self.host.on_paste(PasteRequest {
            value: record,
            html,
            plain_text: plain_text.to_string(),
            files,
            active_formats,
        });
        EventOutcome::Handled
    }

    /// Connects a suggestion lookup worker.
    pub fn attach_suggestions(&mut self, handle: LookupHandle) {
        self.suggestions = Some(handle);
    }

    /// Number of lookups still waiting for a result.
    pub fn pending_lookups(&self) -> usize {
        self.pending_lookups.len()
    }

    /// Sends a lookup to the worker; false when no worker can take it.
    pub(crate) fn start_lookup(&mut self, kind: SuggestionKind, record: RichTextValue) -> bool {
        let Some(handle) = &self.suggestions else {
            debug!(?kind, "no suggestion worker attached");
            return false;
        };
        let id = self.next_lookup_id;
        if handle.cmd_tx.send(LookupRequest { id, kind }).is_err() {
            warn!(?kind, "suggestion worker is gone");
            self.suggestions = None;
            self.pending_lookups.clear();
            return false;
        }
        self.next_lookup_id += 1;
        self.pending_lookups.insert(
            id,
            PendingLookup {
                kind,
                record,
                committed: self.committed.clone(),
            },
        );
        true
    }

    /// Applies every lookup result that has arrived. Never blocks.
    ///
    /// # Returns
    /// The number of results processed.
    pub fn poll_suggestions(&mut self) -> usize {
        let mut events = Vec::new();
        if let Some(handle) = &self.suggestions {
            while let Ok(event) = handle.evt_rx.try_recv() {
                events.push(event);
            }
        }
        let count = events.len();
        for event in events {
            self.apply_lookup(event);
        }
        count
    }

    /// Blocks up to `timeout` for one lookup result and applies it.
    ///
    /// # Returns
    /// `true` if a result arrived in time.
    pub fn wait_for_suggestion(&mut self, timeout: Duration) -> bool {
        let received = match &self.suggestions {
            Some(handle) => handle.evt_rx.recv_timeout(timeout),
            None => return false,
        };
        match received {
            Ok(event) => {
                self.apply_lookup(event);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                warn!(
                    pending = self.pending_lookups.len(),
                    "suggestion worker disconnected"
                );
                self.suggestions = None;
                self.pending_lookups.clear();
                false
            }
        }
    }

    /// A resolution is a new insert: into the captured record when the
    /// content is unchanged since the lookup started, else at the current
    /// selection.
    fn apply_lookup(&mut self, event: LookupEvent) {
        let Some(pending) = self.pending_lookups.remove(&event.id()) else {
            debug!(id = event.id(), "dropping result for unknown lookup");
            return;
        };
        match event {
            LookupEvent::Resolved {
                kind, suggestion, ..
            } => {
                let base = if pending.committed == self.committed {
                    pending.record
                } else {
                    self.record()
                };
                self.insert_string(base, &kind.completion(&suggestion));
            }
            LookupEvent::Dismissed { id } => {
                debug!(id, kind = ?pending.kind, "suggestion dismissed");
            }
            LookupEvent::Failed { id, message } => {
                debug!(id, kind = ?pending.kind, "suggestion failed: {}", message);
            }
        }
    }
}
