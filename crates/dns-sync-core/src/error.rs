//! Error types for the dns-sync system
//!
//! This module defines all error types used throughout the crate.
//!
//! The plan engine, policies and the ownership filter are total functions
//! and never construct these; errors originate at the Source, Provider and
//! Registry boundaries and are propagated unchanged to the caller.

use thiserror::Error;

/// Result type alias for dns-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dns-sync system
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint source-related errors
    #[error("source error: {0}")]
    Source(String),

    /// Registry-related errors
    #[error("registry error: {0}")]
    Registry(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record or zone not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Record already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an endpoint source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an "already exists" error
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
