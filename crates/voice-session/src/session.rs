//! Core session types
//!
//! This module contains the identifiers and lifecycle states shared across
//! the controller, bridge and lifecycle modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for one voice session
///
/// A fresh id is minted on every `start()`, so two connection attempts within
/// the same open dialog are distinguishable in logs and event streams.
pub type SessionId = uuid::Uuid;

/// Lifecycle phase of a voice session
///
/// Exactly one value holds at any instant. `Error` is terminal but retryable:
/// a later `start()` moves back through `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No session activity; the initial state
    Idle,
    /// A transport handle exists and the connect is in flight
    Connecting,
    /// The transport reported call-start; media is flowing
    Connected,
    /// The last attempt failed; retryable via a fresh start()
    Error,
}

impl SessionState {
    /// Whether a transport handle is expected to be alive in this state
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Monotonically increasing tag for transport handles
///
/// Every handle created by the controller is paired with the next generation
/// value. Incoming transport events are tagged with the generation they were
/// registered against, and the controller discards any event whose generation
/// does not match the current handle. This is the compensating control for a
/// transport that exposes no true cancel: a slow event from a torn-down
/// session can never corrupt a subsequent session's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states_are_connecting_and_connected() {
        assert!(!SessionState::Idle.is_active());
        assert!(SessionState::Connecting.is_active());
        assert!(SessionState::Connected.is_active());
        assert!(!SessionState::Error.is_active());
    }

    #[test]
    fn generation_ordering_is_monotonic() {
        assert!(Generation(2) > Generation(1));
        assert_eq!(Generation(3).to_string(), "gen-3");
    }
}
