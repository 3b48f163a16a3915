//! Error types for the activation client.

use thiserror::Error;

/// Activation-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    /// The installation id failed local validation.
    #[error("Invalid Installation ID format - {0}")]
    InvalidIdentifier(String),

    /// Network failure, timeout, or non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The reply matched none of the known protocol shapes.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The remote service explicitly declined the request.
    #[error("{message}")]
    RemoteRejected {
        /// Raw error code (or response type) reported by the service.
        code: String,
        /// Human-readable reason.
        message: String,
    },

    /// Invalid startup configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ActivationError {
    /// Returns true if the fallback cache may substitute for this failure.
    ///
    /// Only failures raised at or after the network call qualify; local
    /// validation and configuration errors never do.
    #[must_use]
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::MalformedResponse(_) | Self::RemoteRejected { .. }
        )
    }

    /// Returns the remote error code if the service rejected the request.
    #[must_use]
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::RemoteRejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for activation operations.
pub type ActivationResult<T> = Result<T, ActivationError>;
