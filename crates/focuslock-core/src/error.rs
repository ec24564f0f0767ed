//! Core error types for focuslock-core.
//!
//! This module defines the error hierarchy using thiserror. Messaging and
//! fullscreen failures are absorbed (logged) at the call sites that own
//! them; everything else propagates with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuslock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Cross-context messaging errors
    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    /// Host-page errors
    #[error("Page error: {0}")]
    Page(#[from] PageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Cross-context messaging errors.
#[derive(Error, Debug)]
pub enum MessageError {
    /// No page context is available to receive the request
    #[error("No active page context")]
    NoActivePage,

    /// The request could not be delivered
    #[error("Failed to deliver request: {0}")]
    SendFailed(String),

    /// The request was delivered but no acknowledgment came back
    #[error("No acknowledgment from the page context")]
    NoAcknowledgment,
}

/// Host-page errors.
#[derive(Error, Debug)]
pub enum PageError {
    /// The widget anchor element was not found
    #[error("Widget anchor not found after {attempts} attempts")]
    AnchorMissing { attempts: u32 },

    /// The platform rejected a fullscreen request
    #[error("Fullscreen request rejected: {0}")]
    FullscreenRejected(String),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Session duration outside the accepted range
    #[error("Invalid duration: {minutes} minutes (expected 1-60)")]
    InvalidDuration { minutes: u32 },

    /// Unrecognized page section name
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// Unparseable key combination
    #[error("Invalid key combination: {0}")]
    InvalidKeyCombo(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
