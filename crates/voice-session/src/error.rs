//! Error types for the voice session library
//!
//! No error in this layer is process-fatal: every failure is scoped to one
//! session and cleared by a fresh `start()`. Teardown failures are
//! deliberately not represented here at all; they are logged and swallowed so
//! resource release can never be skipped because of a misbehaving transport.

use thiserror::Error;
use voxdesk_voice_transport::TransportError;

/// Result type for voice session operations
pub type VoiceSessionResult<T> = Result<T, VoiceSessionError>;

/// Errors that can occur in the voice session layer
#[derive(Debug, Error)]
pub enum VoiceSessionError {
    /// Transport-layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The locator was missing or could not be resolved into a call target
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Microphone access was denied or unavailable
    #[error("Microphone permission error: {message}")]
    Permission { message: String },

    /// The transport rejected the connection attempt
    #[error("Connection failed: {reason}")]
    ConnectFailed { reason: String },

    /// Operation not valid in the current lifecycle state
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl VoiceSessionError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    /// Create a connection failure error
    pub fn connect_failed(reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}
