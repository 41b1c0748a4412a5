//! Error types for runner management.

use thiserror::Error;

/// Main error type for runner operations.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("No runner configured for language '{language}'")]
    NotConfigured { language: String },

    #[error("Project manifest error: {message}")]
    Manifest { message: String },

    #[error("Discovery service error: {message}")]
    Discovery { message: String },

    #[error("Runner startup failed: {language} - {reason}")]
    StartupFailed { language: String, reason: String },

    #[error("Runner exited before connecting: {language} - {status}")]
    ExitedEarly { language: String, status: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Connection closed by runner")]
    ConnectionClosed,
}

impl RunnerError {
    /// Create a not configured error.
    pub fn not_configured(language: impl Into<String>) -> Self {
        Self::NotConfigured { language: language.into() }
    }

    /// Create a manifest error.
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest { message: message.into() }
    }

    /// Create a discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery { message: message.into() }
    }

    /// Create a startup failed error.
    pub fn startup_failed(language: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StartupFailed {
            language: language.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol { message: message.into() }
    }

    /// Whether the error came from a request or handshake running out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
