//! Transport capability traits
//!
//! The session layer owns exactly one live [`TransportHandle`] per open
//! session and drives it exclusively; no other component may hold or invoke a
//! handle directly.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::TransportResult;
use crate::events::TransportEvent;

/// Factory for live transport handles
///
/// Implemented by the adapter around the external real-time SDK. The session
/// controller calls [`construct`](Self::construct) at most once per session
/// start, with the credential resolved for that conversation.
pub trait VoiceTransport: Send + Sync + fmt::Debug {
    /// Build a new handle authorized by `credential`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Construct`](crate::TransportError::Construct)
    /// when the SDK cannot create a client for the given credential.
    fn construct(&self, credential: &str) -> TransportResult<Arc<dyn TransportHandle>>;
}

/// A live connection to the real-time voice transport
///
/// Handles are cheap to share via `Arc` but semantically owned by a single
/// session. Dropping the last `Arc` releases the underlying SDK resources and
/// closes the event stream.
#[async_trait]
pub trait TransportHandle: Send + Sync + fmt::Debug {
    /// Ask the transport to place the call to `target_id`
    ///
    /// Resolves once the transport has accepted the request. The call is not
    /// connected until a [`TransportEvent::CallStart`] arrives on the event
    /// stream; this method succeeding only means the connect is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Start`](crate::TransportError::Start) on
    /// immediate rejection.
    async fn start(&self, target_id: &str) -> TransportResult<()>;

    /// Request hangup
    ///
    /// May fail; callers must treat a failure here as non-fatal and still
    /// release the handle.
    fn stop(&self) -> TransportResult<()>;

    /// Subscribe to the transport's event stream
    ///
    /// Events are delivered in the order the transport emits them. The stream
    /// closes when the handle is dropped.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}
