//! Error types for saiku-embed.
//!
//! Defines the main error enum used throughout the crate. Per-call transport
//! failures are not errors in this sense; they are reported as a
//! [`crate::transport::TransportFailure`] outcome.

use thiserror::Error;

/// Main error type for saiku-embed operations.
#[derive(Error, Debug)]
pub enum SaikuError {
    /// HTTP client setup errors (TLS backend, invalid client options, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport errors surfaced to a caller that awaited the outcome.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credential encoding errors (characters outside the single-byte range).
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Rendering errors (unknown render kind, unusable result set, etc.)
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration errors (invalid config file, bad parameter syntax, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (task panics, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SaikuError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an encoding error with the given message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a render error with the given message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Transport(_) => "Transport Error",
            Self::Encoding(_) => "Encoding Error",
            Self::Render(_) => "Render Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SaikuError.
pub type Result<T> = std::result::Result<T, SaikuError>;
