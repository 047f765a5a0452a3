//! Microphone permission gating
//!
//! The gate acquires a capture device solely to test permission and releases
//! it immediately; the device is never held open outside the probe. The
//! outcome is cached for the duration of one open, so permission is requested
//! at most once per session-open, and concurrent requests are coalesced onto
//! the single in-flight probe instead of re-prompting the user.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::VoiceSessionResult;

/// Outcome of a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResult {
    /// Whether microphone access was granted
    pub granted: bool,
}

/// An open capture device returned by a [`MicrophoneProbe`]
///
/// The gate closes it as soon as the permission check completes.
pub trait CaptureDevice: Send {
    /// Release the underlying device
    fn close(&mut self);
}

/// Capability trait for acquiring the platform microphone
///
/// Implemented by the platform audio adapter; substituted with a fake in
/// tests.
#[async_trait]
pub trait MicrophoneProbe: Send + Sync {
    /// Attempt to open the default capture device
    ///
    /// # Errors
    ///
    /// Any error is treated by the gate as a denial; it is logged, never
    /// propagated.
    async fn open(&self) -> VoiceSessionResult<Box<dyn CaptureDevice>>;
}

/// Single-flight microphone permission gate
///
/// One gate instance serves one host dialog. [`reset`](Self::reset) drops the
/// cached grant so a later reopen re-requests permission.
pub struct PermissionGate {
    probe: Arc<dyn MicrophoneProbe>,
    // Held across the probe await: concurrent callers queue here and then
    // observe the cached result instead of re-prompting.
    slot: Mutex<Option<PermissionResult>>,
}

impl PermissionGate {
    /// Create a gate over the given probe
    pub fn new(probe: Arc<dyn MicrophoneProbe>) -> Self {
        Self {
            probe,
            slot: Mutex::new(None),
        }
    }

    /// Request microphone access, coalescing concurrent calls
    ///
    /// Resolves `granted: false` on denial or platform error; never returns
    /// an error. The caller is responsible for surfacing a denial as a
    /// terminal condition.
    pub async fn request_microphone(&self) -> PermissionResult {
        let mut slot = self.slot.lock().await;
        if let Some(result) = *slot {
            return result;
        }
        let result = match self.probe.open().await {
            Ok(mut device) => {
                device.close();
                debug!("microphone permission granted");
                PermissionResult { granted: true }
            }
            Err(error) => {
                warn!(%error, "microphone permission denied");
                PermissionResult { granted: false }
            }
        };
        *slot = Some(result);
        result
    }

    /// Whether a previous request in this open resolved to granted
    pub async fn granted(&self) -> bool {
        matches!(*self.slot.lock().await, Some(result) if result.granted)
    }

    /// Whether a permission request is currently in flight
    pub fn in_flight(&self) -> bool {
        self.slot.try_lock().is_err()
    }

    /// Drop the cached outcome so the next request re-probes
    pub async fn reset(&self) {
        *self.slot.lock().await = None;
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
