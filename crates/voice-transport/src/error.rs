//! Error types for the voice transport interface

use thiserror::Error;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur at the transport boundary
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The transport handle could not be created
    #[error("Failed to construct transport handle: {message}")]
    Construct { message: String },

    /// The transport rejected the attempt to place the call
    #[error("Failed to start call: {reason}")]
    Start { reason: String },

    /// The transport failed while hanging up
    #[error("Failed to stop call: {message}")]
    Stop { message: String },
}

impl TransportError {
    /// Create a construction error
    pub fn construct(message: impl Into<String>) -> Self {
        Self::Construct {
            message: message.into(),
        }
    }

    /// Create a start error
    pub fn start(reason: impl Into<String>) -> Self {
        Self::Start {
            reason: reason.into(),
        }
    }

    /// Create a stop error
    pub fn stop(message: impl Into<String>) -> Self {
        Self::Stop {
            message: message.into(),
        }
    }
}
