//! Event counter discipline between the engine and the native renderer.
//!
//! Every event the renderer emits carries a monotonic counter. The gate
//! remembers the last counter it accepted and drops anything at or below it.
//! When the host forces content the renderer did not produce, the gate
//! invalidates its counter so the renderer's delayed echo of the old content
//! is recognized as stale.

use richsync_core::{EngineConfig, Platform};
use serde::Serialize;
use tracing::{debug, info};

/// Whether the gate is waiting for the renderer to catch up with a forced refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Idle,
    AwaitingNativeEcho,
}

/// Per-surface staleness filter.
#[derive(Debug, Clone)]
pub struct EventGate {
    platform: Platform,
    bump: u64,
    last_applied: Option<u64>,
    state: GateState,
}

impl EventGate {
    pub fn new(platform: Platform, bump: u64) -> Self {
        Self {
            platform,
            bump,
            last_applied: None,
            state: GateState::Idle,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.platform, config.refresh_counter_bump)
    }

    /// Counter sent with the next display payload.
    pub fn counter(&self) -> Option<u64> {
        self.last_applied
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// True when an event carrying `counter` describes superseded state.
    ///
    /// Only Android renderers deliver echoes out of order; iOS events are
    /// never dropped here. Events without a counter always pass.
    pub fn should_drop(&self, counter: Option<u64>) -> bool {
        if self.platform.is_ios() {
            return false;
        }
        match (counter, self.last_applied) {
            (Some(counter), Some(last)) if counter <= last => {
                debug!(counter, last, "dropping stale native event");
                true
            }
            _ => false,
        }
    }

    /// Records `counter` as the latest applied native state.
    pub fn accept(&mut self, counter: Option<u64>) {
        if let Some(counter) = counter {
            self.last_applied = Some(counter);
            self.state = GateState::Idle;
        }
    }

    /// Invalidates the counter ahead of a host-forced refresh.
    ///
    /// iOS clears the counter. Android bumps a known counter; an unknown one
    /// stays unknown, which already makes the renderer take the payload.
    pub fn force_refresh(&mut self) {
        if self.platform.is_ios() {
            self.last_applied = None;
        } else if let Some(last) = self.last_applied {
            self.last_applied = Some(last.saturating_add(self.bump));
        }
        self.state = GateState::AwaitingNativeEcho;
        info!(counter = ?self.last_applied, platform = %self.platform, "forcing native refresh");
    }
}
