use std::fmt;

use thiserror::Error;

/// Errors produced at the capability boundaries of the session core.
///
/// The controller never lets these escape to callers of its operations;
/// they are converted into the `Failed` state at the operation boundary.
/// They exist as a typed surface for the backend and store implementations.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// The identity backend rejected the request (invalid credentials,
    /// duplicate account, expired or invalid token).
    #[error("identity backend rejected request: {message}")]
    Backend { message: String },

    /// Any failure that is not a recognized backend rejection: transport
    /// faults, unexpected SDK errors, and so on.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The token store could not complete a read or write.
    #[error("token store {operation} failed: {reason}")]
    Storage { operation: String, reason: String },
}

impl AuthError {
    /// The human-readable string shown to the user in place of the normal
    /// status message. Falls back to `fallback` when the underlying error
    /// carries no description.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            AuthError::Backend { message } => message,
            AuthError::Transport { message } => message,
            AuthError::Storage { reason, .. } => reason,
        };

        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message.clone()
        }
    }

    /// Whether this error came from the identity backend itself rather than
    /// the path to it.
    pub fn is_backend_rejection(&self) -> bool {
        matches!(self, AuthError::Backend { .. })
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Storage {
            operation: "io".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Storage {
            operation: "serialization".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type for capability operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Create a backend rejection error
pub fn backend_rejected(message: impl Into<String>) -> AuthError {
    AuthError::Backend {
        message: message.into(),
    }
}

/// Create a transport failure error
pub fn transport_failed(reason: impl fmt::Display) -> AuthError {
    AuthError::Transport {
        message: reason.to_string(),
    }
}

/// Create a token store failure error
pub fn storage_failed(operation: impl Into<String>, reason: impl fmt::Display) -> AuthError {
    AuthError::Storage {
        operation: operation.into(),
        reason: reason.to_string(),
    }
}
