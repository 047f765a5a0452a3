//! Session event types
//!
//! The controller broadcasts [`SessionEvent`]s for every state transition and
//! speech-activity change. Multiple consumers can subscribe independently;
//! the presentation layer typically holds one receiver and re-renders from
//! [`SessionView`] snapshots on each event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{SessionId, SessionState};

/// Information about a session state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatusInfo {
    /// Session that changed state
    pub session_id: SessionId,
    /// New state after the transition
    pub new_state: SessionState,
    /// State before the transition, if known
    pub previous_state: Option<SessionState>,
    /// Reason for the change (e.g. "call started", "session stopped")
    pub reason: Option<String>,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Events broadcast by the session controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The session moved to a new lifecycle state
    StateChanged {
        /// Transition details
        info: SessionStatusInfo,
    },
    /// The remote agent started or stopped speaking
    ///
    /// Informational only; never accompanies a state transition.
    SpeechActivity {
        /// Whether the agent is currently speaking
        active: bool,
        /// When the activity change was observed
        timestamp: DateTime<Utc>,
    },
}

/// Read-only presentation snapshot of the session
///
/// This is the entire contract exposed to the presentation layer: the core
/// never renders UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// Current lifecycle state
    pub state: SessionState,
    /// True while permission acquisition or the connect is in flight
    pub loading: bool,
    /// User-facing failure description when state is `Error`
    pub error_message: Option<String>,
    /// Whether the remote agent is currently speaking
    pub assistant_speaking: bool,
}

/// Counters describing controller activity since creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Sessions for which start() constructed a transport handle
    pub sessions_started: u64,
    /// Sessions that reached Connected
    pub sessions_connected: u64,
    /// Sessions that ended in Error
    pub sessions_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_serializes_with_stable_field_names() {
        let view = SessionView {
            state: SessionState::Error,
            loading: false,
            error_message: Some("mic denied".to_string()),
            assistant_speaking: false,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["state"], serde_json::json!("Error"));
        assert_eq!(value["error_message"], serde_json::json!("mic denied"));
        assert_eq!(value["assistant_speaking"], serde_json::json!(false));
    }
}
