//! Configuration types for the voice session layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Resolved connection target for one conversation
///
/// Produced by [`crate::locator::resolve`] from a locator string. Both fields
/// are guaranteed non-empty by resolution; a config that cannot satisfy that
/// is never produced.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Identifier of the conversation/agent to connect to
    pub target_id: String,
    /// Authorization token used to open the transport session
    pub credential: String,
}

impl ConnectionConfig {
    /// Create a new connection config
    pub fn new(target_id: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            credential: credential.into(),
        }
    }

    /// Whether both fields are non-empty
    pub fn is_valid(&self) -> bool {
        !self.target_id.is_empty() && !self.credential.is_empty()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("target_id", &self.target_id)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

fn default_event_channel_capacity() -> usize {
    64
}

fn default_stale_event_drain_window() -> Duration {
    Duration::from_secs(2)
}

/// Static configuration for a [`crate::SessionController`]
#[derive(Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Credential used when the locator carries no shareKey override
    pub default_credential: String,
    /// Capacity of the session event broadcast channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// How long the event bridge keeps draining straggler transport events
    /// after its handle has been released
    ///
    /// A late `call-start` arriving within this window still receives the
    /// corrective hangup; once it elapses the bridge task exits and drops the
    /// last reference to the transport handle.
    #[serde(default = "default_stale_event_drain_window")]
    pub stale_event_drain_window: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_credential: String::new(),
            event_channel_capacity: default_event_channel_capacity(),
            stale_event_drain_window: default_stale_event_drain_window(),
        }
    }
}

impl ControllerConfig {
    /// Set the default credential
    pub fn with_default_credential(mut self, credential: impl Into<String>) -> Self {
        self.default_credential = credential.into();
        self
    }

    /// Set the event channel capacity
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Set the post-release drain window of the event bridge
    pub fn with_stale_event_drain_window(mut self, window: Duration) -> Self {
        self.stale_event_drain_window = window;
        self
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("default_credential", &"[REDACTED]")
            .field("event_channel_capacity", &self.event_channel_capacity)
            .field("stale_event_drain_window", &self.stale_event_drain_window)
            .finish()
    }
}
