//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_REFRESH_COUNTER_BUMP, DEFAULT_UNDO_DEBOUNCE_MS};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Platform family of the native renderer.
///
/// Android can deliver echoes out of order, so stale-event dropping only
/// applies there; iOS renderers refresh whenever the counter is unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl Platform {
    /// Returns true for iOS renderers.
    pub fn is_ios(self) -> bool {
        self == Platform::Ios
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(CoreError::InvalidPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => f.write_str("android"),
            Platform::Ios => f.write_str("ios"),
        }
    }
}

/// Runtime configuration for one editing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub platform: Platform,
    pub undo_debounce_ms: u64,
    pub refresh_counter_bump: u64,
    pub mentions_enabled: bool,
    pub xposts_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            undo_debounce_ms: DEFAULT_UNDO_DEBOUNCE_MS,
            refresh_counter_bump: DEFAULT_REFRESH_COUNTER_BUMP,
            mentions_enabled: false,
            xposts_enabled: false,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn invalid(key: &str, value: &str) -> CoreError {
    CoreError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn strict_u64(key: &str, fallback: u64) -> Result<u64, CoreError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| invalid(key, &raw)),
        Err(_) => Ok(fallback),
    }
}

fn strict_flag(key: &str) -> Result<bool, CoreError> {
    match env::var(key) {
        Ok(raw) => parse_env_flag(&raw).ok_or_else(|| invalid(key, &raw)),
        Err(_) => Ok(false),
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`EngineConfig`] with defaults applied when env vars are
    /// missing or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            platform: env::var("RICHSYNC_PLATFORM")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.platform),
            undo_debounce_ms: env::var("RICHSYNC_UNDO_DEBOUNCE_MS")
                .ok()
                .and_then(|ms| ms.trim().parse().ok())
                .unwrap_or(defaults.undo_debounce_ms),
            refresh_counter_bump: env::var("RICHSYNC_REFRESH_COUNTER_BUMP")
                .ok()
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(defaults.refresh_counter_bump),
            mentions_enabled: env_flag_enabled("RICHSYNC_MENTIONS"),
            xposts_enabled: env_flag_enabled("RICHSYNC_XPOSTS"),
        }
    }

    /// Load configuration from environment variables, rejecting bad values.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] or [`CoreError::InvalidPlatform`]
    /// when a variable is set but cannot be parsed.
    pub fn try_from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();
        let platform = match env::var("RICHSYNC_PLATFORM") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.platform,
        };
        Ok(Self {
            platform,
            undo_debounce_ms: strict_u64("RICHSYNC_UNDO_DEBOUNCE_MS", defaults.undo_debounce_ms)?,
            refresh_counter_bump: strict_u64(
                "RICHSYNC_REFRESH_COUNTER_BUMP",
                defaults.refresh_counter_bump,
            )?,
            mentions_enabled: strict_flag("RICHSYNC_MENTIONS")?,
            xposts_enabled: strict_flag("RICHSYNC_XPOSTS")?,
        })
    }

    /// Quiescence window used to debounce undo-level requests.
    pub fn undo_debounce(&self) -> Duration {
        Duration::from_millis(self.undo_debounce_ms)
    }
}
