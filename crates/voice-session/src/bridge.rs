//! Event bridge - transport events into controller transitions
//!
//! One bridge task is spawned per transport handle. It subscribes to the
//! handle's event stream before the connect is issued, tags every event with
//! the generation the handle was registered against, and forwards them to the
//! controller in emission order.
//!
//! The task holds the last strong reference to the handle once the controller
//! releases it, so its lifetime is bounded: it exits when the event stream
//! closes, when a terminal event (`call-end`, `error`) has been applied, when
//! a stale event shows the session was torn down, or when the controller's
//! release signal has fired and the drain window for straggler events has
//! elapsed. Exiting drops the handle and with it the underlying SDK
//! resources.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use voxdesk_voice_transport::{TransportEvent, TransportHandle};

use crate::controller::{EventDisposition, SessionController};
use crate::session::Generation;

/// Spawn the bridge task for a freshly constructed handle
///
/// The subscription is taken synchronously, before this function returns, so
/// no event emitted after `construct` can be lost to a race with the task
/// startup. `release` fires (or closes) when the controller drops the handle
/// from its session record; from that point the bridge keeps draining for at
/// most `drain_window`, long enough to catch a late `call-start` that needs a
/// corrective hangup, and then terminates.
pub(crate) fn spawn(
    controller: Arc<SessionController>,
    generation: Generation,
    handle: Arc<dyn TransportHandle>,
    mut release: watch::Receiver<()>,
    drain_window: Duration,
) -> JoinHandle<()> {
    let mut events = handle.subscribe();
    tokio::spawn(async move {
        let mut deadline: Option<tokio::time::Instant> = None;
        loop {
            let received = if let Some(deadline) = deadline {
                match tokio::time::timeout_at(deadline, events.recv()).await {
                    Ok(received) => received,
                    // No straggler arrived within the drain window.
                    Err(_) => break,
                }
            } else {
                tokio::select! {
                    received = events.recv() => received,
                    _ = release.changed() => {
                        deadline = Some(tokio::time::Instant::now() + drain_window);
                        continue;
                    }
                }
            };
            match received {
                Ok(event) => {
                    let disposition = controller
                        .apply_transport_event(generation, event.clone())
                        .await;
                    match disposition {
                        EventDisposition::Applied => {
                            // Terminal events release the handle on the
                            // controller side; nothing more can follow.
                            if matches!(
                                event,
                                TransportEvent::CallEnd | TransportEvent::Error { .. }
                            ) {
                                break;
                            }
                        }
                        EventDisposition::Stale => match event {
                            TransportEvent::CallStart => {
                                // A call-start from a torn-down session means
                                // the transport connected a call nobody is
                                // listening to: hang it up rather than leave
                                // it live.
                                warn!(%generation, "stale call-start after teardown; issuing corrective hangup");
                                if let Err(error) = handle.stop() {
                                    warn!(%generation, %error, "corrective hangup failed");
                                }
                                break;
                            }
                            TransportEvent::CallEnd | TransportEvent::Error { .. } => break,
                            // Stale speech stragglers may still precede a
                            // late call-start; keep draining.
                            _ => {}
                        },
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%generation, skipped, "transport event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!(%generation, "event bridge terminated");
    })
}
