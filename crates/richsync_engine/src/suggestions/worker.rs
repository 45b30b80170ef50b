//! Background worker that runs suggestion lookups off the UI thread.

use super::{SuggestionKind, SuggestionProvider};
use crossbeam_channel::{unbounded, Receiver, Sender};
use richsync_core::CoreError;
use std::thread;
use tracing::{debug, warn};

/// One lookup to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRequest {
    pub id: u64,
    pub kind: SuggestionKind,
}

/// Lookup results, polled by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEvent {
    Resolved {
        id: u64,
        kind: SuggestionKind,
        suggestion: String,
    },
    Dismissed {
        id: u64,
    },
    Failed {
        id: u64,
        message: String,
    },
}

impl LookupEvent {
    pub fn id(&self) -> u64 {
        match self {
            LookupEvent::Resolved { id, .. }
            | LookupEvent::Dismissed { id }
            | LookupEvent::Failed { id, .. } => *id,
        }
    }
}

/// Channel endpoints of a running lookup worker.
///
/// Dropping the handle closes the request channel and lets the worker exit.
pub struct LookupHandle {
    pub cmd_tx: Sender<LookupRequest>,
    pub evt_rx: Receiver<LookupEvent>,
}

/// Spawns the lookup worker thread.
///
/// # Arguments
/// - `provider`: Suggestion source; it runs on the worker thread only.
///
/// # Returns
/// A [`LookupHandle`] with the request sender and result receiver.
///
/// # Errors
/// Returns [`CoreError::WorkerUnavailable`] if the thread cannot be spawned.
pub fn spawn_lookup_worker<P: SuggestionProvider>(mut provider: P) -> Result<LookupHandle, CoreError> {
    let (cmd_tx, cmd_rx) = unbounded::<LookupRequest>();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("richsync-suggestions".to_string())
        .spawn(move || {
            for request in cmd_rx.iter() {
                let event = match provider.fetch(request.kind) {
                    Ok(Some(suggestion)) => LookupEvent::Resolved {
                        id: request.id,
                        kind: request.kind,
                        suggestion,
                    },
                    Ok(None) => LookupEvent::Dismissed { id: request.id },
                    Err(err) => {
                        warn!(id = request.id, "suggestion lookup failed: {}", err);
                        LookupEvent::Failed {
                            id: request.id,
                            message: err.to_string(),
                        }
                    }
                };
                if evt_tx.send(event).is_err() {
                    break;
                }
            }
            debug!("suggestion worker exiting");
        })
        .map_err(|err| {
            warn!("failed to spawn suggestion worker: {}", err);
            CoreError::WorkerUnavailable
        })?;

    Ok(LookupHandle { cmd_tx, evt_rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn recv(handle: &LookupHandle) -> LookupEvent {
        handle
            .evt_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("expected lookup event")
    }

    #[test]
    fn worker_resolves_dismisses_and_fails() {
        let mut answers = vec![
            Ok(Some("alice".to_string())),
            Ok(None),
            Err(CoreError::Lookup("offline".to_string())),
        ]
        .into_iter();
        let handle = spawn_lookup_worker(move |_kind: SuggestionKind| {
            answers.next().unwrap_or(Ok(None))
        })
        .expect("spawn worker");

        for id in 1..=3 {
            handle
                .cmd_tx
                .send(LookupRequest {
                    id,
                    kind: SuggestionKind::Mention,
                })
                .expect("send request");
        }

        assert_eq!(
            recv(&handle),
            LookupEvent::Resolved {
                id: 1,
                kind: SuggestionKind::Mention,
                suggestion: "alice".to_string(),
            }
        );
        assert_eq!(recv(&handle), LookupEvent::Dismissed { id: 2 });
        match recv(&handle) {
            LookupEvent::Failed { id, message } => {
                assert_eq!(id, 3);
                assert!(message.contains("offline"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
