//! Structured error types for ChatSH
//!
//! Three classes matter here: configuration errors (fatal, reported once at
//! startup), stream transport errors (absorbed by the turn loop), and
//! execution errors (folded into the next turn's prompt).

use thiserror::Error;

/// Primary error type for ChatSH operations
#[derive(Error, Debug)]
pub enum ChatshError {
    // =========================================================================
    // Configuration Errors (fatal at startup)
    // =========================================================================
    /// Config file missing on disk
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Config file exists but could not be parsed
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Backend tag not recognized
    #[error("invalid backend: {name} must be either 'openai' or 'ollama'")]
    InvalidBackend { name: String },

    /// Backend selected but a required setting is absent
    #[error("missing {field} for backend {backend}")]
    MissingSetting { backend: String, field: String },

    // =========================================================================
    // Stream Transport Errors (recovered within a turn)
    // =========================================================================
    /// The backend stream ended abnormally mid-turn
    #[error("stream transport error: {message}")]
    Transport { message: String },

    /// Backend returned a non-success HTTP status
    #[error("backend request failed ({status}): {message}")]
    BackendStatus { status: u16, message: String },

    // =========================================================================
    // Execution Errors (folded into the next prompt)
    // =========================================================================
    /// The command interpreter could not be launched
    #[error("failed to launch interpreter: {reason}")]
    Execution { reason: String },
}

impl ChatshError {
    /// Whether this error should terminate the process at startup.
    ///
    /// Nothing above the turn boundary is allowed to kill the loop except
    /// the configuration class.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ChatshError::ConfigNotFound { .. }
                | ChatshError::InvalidConfig { .. }
                | ChatshError::InvalidBackend { .. }
                | ChatshError::MissingSetting { .. }
        )
    }
}
