//! Session controller - the voice session state machine
//!
//! The controller owns the single live transport handle, exposes idempotent
//! `start`/`stop`, and applies transport events delivered by the event
//! bridge. All mutation goes through one internal session record behind a
//! `tokio::sync::RwLock`, so the invariants hold without further locking:
//!
//! - a transport handle exists iff the state is `Connecting` or `Connected`;
//! - at most one handle is alive per controller;
//! - events tagged with a stale generation never mutate the session.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

use voxdesk_voice_transport::{TransportEvent, TransportHandle, VoiceTransport};

use crate::bridge;
use crate::config::{ConnectionConfig, ControllerConfig};
use crate::error::{VoiceSessionError, VoiceSessionResult};
use crate::events::{SessionEvent, SessionStats, SessionStatusInfo, SessionView};
use crate::permission::PermissionGate;
use crate::session::{Generation, SessionId, SessionState};

/// What the controller decided to do with a transport event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventDisposition {
    /// The event belonged to the current handle and was applied
    Applied,
    /// The event came from a torn-down handle and was discarded
    Stale,
}

/// Runtime record for the one session this controller owns
struct Session {
    id: SessionId,
    state: SessionState,
    error_message: Option<String>,
    handle: Option<Arc<dyn TransportHandle>>,
    generation: Generation,
    assistant_speaking: bool,
    // Dropped whenever the handle is released; signals the event bridge to
    // finish its drain and drop its own handle reference.
    release_tx: Option<watch::Sender<()>>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: SessionId::new_v4(),
            state: SessionState::Idle,
            error_message: None,
            handle: None,
            generation: Generation(0),
            assistant_speaking: false,
            release_tx: None,
        }
    }

    /// Release the transport handle and notify the bridge task
    fn release_handle(&mut self) -> Option<Arc<dyn TransportHandle>> {
        drop(self.release_tx.take());
        self.handle.take()
    }
}

/// Drives one live voice conversation against the external transport
///
/// Create one controller per host dialog/widget. `start()` and `stop()` are
/// idempotent: a `start()` while already `Connecting`/`Connected` is a no-op
/// that constructs no second transport handle, and a `stop()` while `Idle`
/// performs no transport calls.
pub struct SessionController {
    transport: Arc<dyn VoiceTransport>,
    gate: Arc<PermissionGate>,
    config: ControllerConfig,
    session: RwLock<Session>,
    next_generation: AtomicU64,
    sessions_started: AtomicU64,
    sessions_connected: AtomicU64,
    sessions_failed: AtomicU64,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Create a new controller
    pub fn new(
        transport: Arc<dyn VoiceTransport>,
        gate: Arc<PermissionGate>,
        config: ControllerConfig,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Arc::new(Self {
            transport,
            gate,
            config,
            session: RwLock::new(Session::new()),
            next_generation: AtomicU64::new(0),
            sessions_started: AtomicU64::new(0),
            sessions_connected: AtomicU64::new(0),
            sessions_failed: AtomicU64::new(0),
            event_tx,
        })
    }

    /// Subscribe to the session event stream
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// The permission gate this controller consults before starting
    pub fn permission_gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    /// The controller's static configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Start a voice session towards the resolved target
    ///
    /// Requires a prior granted microphone permission. From `Idle` or `Error`
    /// this constructs exactly one transport handle, spawns the event bridge
    /// for it, and invokes the transport connect; the session is `Connecting`
    /// until the transport's `call-start` event arrives. While already
    /// `Connecting` or `Connected` this is a no-op.
    ///
    /// # Errors
    ///
    /// * [`VoiceSessionError::Permission`] - microphone access not granted
    /// * [`VoiceSessionError::Config`] - the connection config is incomplete
    /// * [`VoiceSessionError::ConnectFailed`] - the transport rejected the
    ///   construct or connect; the session is left in `Error`
    pub async fn start(self: &Arc<Self>, config: &ConnectionConfig) -> VoiceSessionResult<()> {
        if !self.gate.granted().await {
            let message = "Microphone access has not been granted";
            self.force_error(message).await;
            return Err(VoiceSessionError::permission(message));
        }
        if !config.is_valid() {
            let message = "Connection config is missing a target id or credential";
            self.force_error(message).await;
            return Err(VoiceSessionError::config(message));
        }

        let (session_id, generation, handle, release_rx, previous) = {
            let mut session = self.session.write().await;
            if session.state.is_active() {
                debug!(state = %session.state, "start ignored; session already active");
                return Ok(());
            }
            let generation = Generation(self.next_generation.fetch_add(1, Ordering::SeqCst) + 1);
            let handle = match self.transport.construct(&config.credential) {
                Ok(handle) => handle,
                Err(error) => {
                    let message = format!("Failed to construct transport: {}", error);
                    let previous = session.state;
                    session.state = SessionState::Error;
                    session.error_message = Some(message.clone());
                    session.handle = None;
                    let session_id = session.id;
                    drop(session);
                    self.sessions_failed.fetch_add(1, Ordering::SeqCst);
                    warn!(%generation, %error, "transport construction failed");
                    self.emit_state_change(session_id, Some(previous), SessionState::Error, Some(message.clone()));
                    return Err(VoiceSessionError::connect_failed(message));
                }
            };
            let previous = session.state;
            let (release_tx, release_rx) = watch::channel(());
            session.id = SessionId::new_v4();
            session.state = SessionState::Connecting;
            session.error_message = None;
            session.assistant_speaking = false;
            session.handle = Some(Arc::clone(&handle));
            session.generation = generation;
            session.release_tx = Some(release_tx);
            (session.id, generation, handle, release_rx, previous)
        };

        self.sessions_started.fetch_add(1, Ordering::SeqCst);
        info!(%generation, target = %config.target_id, "starting voice session");
        self.emit_state_change(
            session_id,
            Some(previous),
            SessionState::Connecting,
            Some("session starting".to_string()),
        );

        // The bridge subscribes before the connect is issued so no event can
        // be missed between accept and delivery. The task ends on a terminal
        // or stale event, or shortly after release_rx reports the handle
        // released.
        let _ = bridge::spawn(
            Arc::clone(self),
            generation,
            Arc::clone(&handle),
            release_rx,
            self.config.stale_event_drain_window,
        );

        if let Err(error) = handle.start(&config.target_id).await {
            let reason = error.to_string();
            warn!(%generation, %error, "transport rejected connect");
            self.fail_generation(generation, reason.clone()).await;
            return Err(VoiceSessionError::connect_failed(reason));
        }
        Ok(())
    }

    /// Stop the session, best-effort, from any state
    ///
    /// Requests transport hangup if a handle exists; a hangup failure is
    /// logged and swallowed. The handle is always cleared and the state
    /// forced to `Idle` immediately, without waiting for a corroborating
    /// `call-end` event. While already `Idle` this performs no transport
    /// calls.
    pub async fn stop(&self) {
        let (session_id, previous, handle) = {
            let mut session = self.session.write().await;
            if session.state == SessionState::Idle && session.handle.is_none() {
                debug!("stop ignored; session already idle");
                return;
            }
            let previous = session.state;
            let handle = session.release_handle();
            session.state = SessionState::Idle;
            session.error_message = None;
            session.assistant_speaking = false;
            (session.id, previous, handle)
        };

        if let Some(handle) = handle {
            info!(previous = %previous, "stopping voice session");
            if let Err(error) = handle.stop() {
                // Teardown must complete even if the transport misbehaves.
                warn!(%error, "transport hangup failed during stop");
            }
        }
        self.emit_state_change(
            session_id,
            Some(previous),
            SessionState::Idle,
            Some("session stopped".to_string()),
        );
    }

    /// Force the session into `Error` with a user-facing message
    ///
    /// Used for failures that occur before any transport handle exists, such
    /// as a denied microphone permission or an unresolvable locator.
    pub(crate) async fn force_error(&self, message: impl Into<String>) {
        let message = message.into();
        let (session_id, previous, handle) = {
            let mut session = self.session.write().await;
            let previous = session.state;
            let handle = session.release_handle();
            session.state = SessionState::Error;
            session.error_message = Some(message.clone());
            session.assistant_speaking = false;
            (session.id, previous, handle)
        };
        if let Some(handle) = handle {
            if let Err(error) = handle.stop() {
                warn!(%error, "transport hangup failed while entering error state");
            }
        }
        self.emit_state_change(session_id, Some(previous), SessionState::Error, Some(message));
    }

    /// Apply a transport event tagged with the generation it was registered
    /// against
    ///
    /// Events whose generation does not match the current live handle are
    /// discarded; the bridge issues a corrective hangup for a stale
    /// `call-start`.
    pub(crate) async fn apply_transport_event(
        &self,
        generation: Generation,
        event: TransportEvent,
    ) -> EventDisposition {
        let mut session = self.session.write().await;
        if session.handle.is_none() || session.generation != generation {
            debug!(
                %generation,
                current = %session.generation,
                kind = event.kind(),
                "discarding stale transport event"
            );
            return EventDisposition::Stale;
        }

        match event {
            TransportEvent::CallStart => {
                if session.state == SessionState::Connecting {
                    let previous = session.state;
                    session.state = SessionState::Connected;
                    session.error_message = None;
                    let session_id = session.id;
                    drop(session);
                    self.sessions_connected.fetch_add(1, Ordering::SeqCst);
                    info!(%generation, "voice session connected");
                    self.emit_state_change(
                        session_id,
                        Some(previous),
                        SessionState::Connected,
                        Some("call started".to_string()),
                    );
                } else {
                    debug!(state = %session.state, "call-start ignored in current state");
                }
            }
            TransportEvent::CallEnd => {
                let previous = session.state;
                let reason = if previous == SessionState::Connected {
                    "call ended"
                } else {
                    "call ended before connect"
                };
                session.state = SessionState::Idle;
                session.error_message = None;
                session.assistant_speaking = false;
                let handle = session.release_handle();
                let session_id = session.id;
                drop(session);
                drop(handle);
                info!(%generation, "voice session ended by transport");
                self.emit_state_change(
                    session_id,
                    Some(previous),
                    SessionState::Idle,
                    Some(reason.to_string()),
                );
            }
            TransportEvent::Error { message } => {
                let previous = session.state;
                session.state = SessionState::Error;
                session.error_message = Some(message.clone());
                session.assistant_speaking = false;
                let handle = session.release_handle();
                let session_id = session.id;
                drop(session);
                drop(handle);
                self.sessions_failed.fetch_add(1, Ordering::SeqCst);
                warn!(%generation, %message, "transport reported an error");
                self.emit_state_change(
                    session_id,
                    Some(previous),
                    SessionState::Error,
                    Some(message),
                );
            }
            TransportEvent::SpeechStart | TransportEvent::SpeechEnd => {
                let active = matches!(event, TransportEvent::SpeechStart);
                session.assistant_speaking = active;
                drop(session);
                let _ = self.event_tx.send(SessionEvent::SpeechActivity {
                    active,
                    timestamp: Utc::now(),
                });
            }
        }
        EventDisposition::Applied
    }

    /// Read-only presentation snapshot
    pub async fn view(&self) -> SessionView {
        let session = self.session.read().await;
        SessionView {
            state: session.state,
            loading: self.gate.in_flight() || session.state == SessionState::Connecting,
            error_message: session.error_message.clone(),
            assistant_speaking: session.assistant_speaking,
        }
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        self.session.read().await.state
    }

    /// Activity counters since controller creation
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            sessions_started: self.sessions_started.load(Ordering::SeqCst),
            sessions_connected: self.sessions_connected.load(Ordering::SeqCst),
            sessions_failed: self.sessions_failed.load(Ordering::SeqCst),
        }
    }

    /// Transition the given generation to `Error` after a rejected connect
    async fn fail_generation(&self, generation: Generation, message: String) {
        let released = {
            let mut session = self.session.write().await;
            if session.generation != generation || session.handle.is_none() {
                // A newer session superseded this attempt; nothing to do.
                None
            } else {
                let previous = session.state;
                session.state = SessionState::Error;
                session.error_message = Some(message.clone());
                session.assistant_speaking = false;
                session.release_handle();
                Some((session.id, previous))
            }
        };
        if let Some((session_id, previous)) = released {
            self.sessions_failed.fetch_add(1, Ordering::SeqCst);
            self.emit_state_change(session_id, Some(previous), SessionState::Error, Some(message));
        }
    }

    fn emit_state_change(
        &self,
        session_id: SessionId,
        previous_state: Option<SessionState>,
        new_state: SessionState,
        reason: Option<String>,
    ) {
        let _ = self.event_tx.send(SessionEvent::StateChanged {
            info: SessionStatusInfo {
                session_id,
                new_state,
                previous_state,
                reason,
                timestamp: Utc::now(),
            },
        });
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("stats", &self.stats())
            .finish()
    }
}
