//! Error types for core value handling, configuration, and lookups.
use thiserror::Error;

/// Top-level error type shared by the core and engine crates.
///
/// None of these are surfaced to the end user by the synchronization paths;
/// callers clamp, drop, or log instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown platform: {0}")]
    InvalidPlatform(String),

    #[error("Selection {start}..{end} out of bounds for length {len}")]
    InvalidSelection { start: usize, end: usize, len: usize },

    #[error("Invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("Suggestion lookup failed: {0}")]
    Lookup(String),

    #[error("Suggestion worker unavailable")]
    WorkerUnavailable,
}
