//! Transport event stream types
//!
//! The transport emits a small, fixed set of lifecycle events. `call-start`,
//! `call-end` and `error` drive session state transitions in the layer above;
//! `speech-start` and `speech-end` are informational only and are surfaced as
//! a UI affordance without ever changing session state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An event emitted by the real-time voice transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportEvent {
    /// The call has been answered and media is flowing
    CallStart,
    /// The call has ended on the remote side
    CallEnd,
    /// The transport failed mid-call or during connect
    Error {
        /// Human-readable failure description from the transport
        message: String,
    },
    /// The remote agent started speaking
    SpeechStart,
    /// The remote agent stopped speaking
    SpeechEnd,
}

impl TransportEvent {
    /// Wire-level event name, as the transport SDK names its events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CallStart => "call-start",
            Self::CallEnd => "call-end",
            Self::Error { .. } => "error",
            Self::SpeechStart => "speech-start",
            Self::SpeechEnd => "speech-end",
        }
    }

    /// Whether this event is informational and never drives a state transition
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::SpeechStart | Self::SpeechEnd)
    }
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
