//! Lifecycle management - binding the session to the host UI
//!
//! The lifecycle manager enforces scoped acquisition: `open()` runs the
//! permission request and locator resolution, and only a successful open
//! reaches the ready-to-start posture. `request_close()` is the single
//! teardown path for every exit - explicit close, terminal error acknowledged
//! by the user, or abrupt unmount - and always runs the same sequence: stop
//! the session, clear its fields, release the permission grant so a later
//! reopen re-requests it.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::controller::SessionController;
use crate::error::{VoiceSessionError, VoiceSessionResult};
use crate::events::SessionView;
use crate::locator;

/// Binds controller open/close to the host UI's mount/unmount
pub struct LifecycleManager {
    controller: Arc<SessionController>,
    ready: RwLock<Option<ConnectionConfig>>,
}

impl LifecycleManager {
    /// Create a lifecycle manager over an existing controller
    pub fn new(controller: Arc<SessionController>) -> Self {
        Self {
            controller,
            ready: RwLock::new(None),
        }
    }

    /// Host signal: the dialog/widget was opened
    ///
    /// Requests microphone permission (coalesced, at most one prompt per
    /// open) and resolves the locator. On success the session is ready to
    /// start; on denial or an unresolvable locator the controller is moved
    /// to `Error` with a user-facing message and no transport is constructed.
    ///
    /// # Errors
    ///
    /// * [`VoiceSessionError::Permission`] - microphone access denied
    /// * [`VoiceSessionError::Config`] - no call target could be resolved
    pub async fn open(&self, locator: Option<&str>) -> VoiceSessionResult<()> {
        let permission = self
            .controller
            .permission_gate()
            .request_microphone()
            .await;
        if !permission.granted {
            let message =
                "Microphone access is required to start a voice session. Please allow microphone access and try again.";
            self.controller.force_error(message).await;
            return Err(VoiceSessionError::permission(message));
        }

        let default_credential = self.controller.config().default_credential.clone();
        let Some(config) = locator::resolve(locator, &default_credential) else {
            let message = "No conversation target could be resolved from the locator";
            self.controller.force_error(message).await;
            return Err(VoiceSessionError::config(message));
        };

        debug!(target = %config.target_id, "voice session ready to start");
        *self.ready.write().await = Some(config);
        Ok(())
    }

    /// Presentation intent: start the call
    ///
    /// # Errors
    ///
    /// [`VoiceSessionError::InvalidState`] when called before a successful
    /// [`open`](Self::open); otherwise whatever
    /// [`SessionController::start`] returns.
    pub async fn request_start(&self) -> VoiceSessionResult<()> {
        let config = self
            .ready
            .read()
            .await
            .clone()
            .ok_or_else(|| VoiceSessionError::invalid_state("session is not open; call open() first"))?;
        self.controller.start(&config).await
    }

    /// Host signal: the dialog/widget is closing or unmounting
    ///
    /// Idempotent. Runs the full teardown sequence regardless of current
    /// state: stop the session (hangup failures are logged, never surfaced),
    /// clear all session fields, and release the permission grant.
    pub async fn request_close(&self) {
        self.controller.stop().await;
        *self.ready.write().await = None;
        self.controller.permission_gate().reset().await;
        info!("voice session closed and resources released");
    }

    /// Read-only presentation snapshot
    pub async fn view(&self) -> SessionView {
        self.controller.view().await
    }

    /// Whether a successful open has made the session ready to start
    pub async fn is_open(&self) -> bool {
        self.ready.read().await.is_some()
    }

    /// The controller this manager drives
    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("controller", &self.controller)
            .finish()
    }
}
