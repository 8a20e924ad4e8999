//! Core error types for aura-timer-core.
//!
//! Every failure in this crate degrades to "no external surface" or
//! "no duration change"; none of these errors is fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

use crate::pip::StrategyKind;

/// Core error type for aura-timer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Out-of-window activation errors
    #[error("Picture-in-picture error: {0}")]
    Pip(#[from] PipError),

    /// Duration service errors
    #[error("Duration service error: {0}")]
    DurationService(#[from] DurationServiceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the out-of-window coordinator.
///
/// Anything a strategy or platform raises is normalized into one of these
/// before it reaches the widget controller.
#[derive(Error, Debug)]
pub enum PipError {
    /// Neither the detached-window nor the floating-video capability exists.
    #[error("Picture-in-picture is not supported on this platform")]
    CapabilityUnavailable,

    /// A capability exists but the platform denied or interrupted the request.
    #[error("Failed to open {strategy} surface: {source}")]
    OpenFailed {
        strategy: StrategyKind,
        #[source]
        source: PlatformError,
    },
}

/// Errors reported by a platform implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user or the platform policy refused the request.
    #[error("request denied: {0}")]
    Denied(String),

    /// The request started but did not complete.
    #[error("request interrupted: {0}")]
    Interrupted(String),

    /// The capability disappeared between detection and use.
    #[error("capability not supported")]
    Unsupported,

    /// Audio playback could not start.
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Errors from the external duration-parsing service.
#[derive(Error, Debug)]
pub enum DurationServiceError {
    /// Query text was empty after trimming
    #[error("Query is empty")]
    EmptyQuery,

    /// Transport-level failure (connection, timeout, body decoding)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Service returned status {status}")]
    Status { status: u16 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be prepared
    #[error("Config directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
