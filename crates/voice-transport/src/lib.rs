//! # Voice Transport - Real-time Transport Capability Interface
//!
//! This crate defines the contract between the voxdesk session layer and the
//! external real-time voice transport SDK that carries the actual call audio.
//! It deliberately contains no transport implementation: the session layer
//! programs against the [`VoiceTransport`] and [`TransportHandle`] traits so
//! that the real SDK can be substituted with a deterministic fake in tests.
//!
//! ## Contract
//!
//! - [`VoiceTransport::construct`] builds a live [`TransportHandle`] from a
//!   credential.
//! - [`TransportHandle::start`] asks the transport to place the call. A
//!   successful return does **not** mean the call is connected; that is only
//!   signalled by a later [`TransportEvent::CallStart`].
//! - [`TransportHandle::stop`] requests hangup. It may fail; callers are
//!   expected to treat hangup failures as non-fatal.
//! - [`TransportHandle::subscribe`] exposes the transport's event stream in
//!   emission order.

pub mod error;
pub mod events;
pub mod handle;

pub use error::{TransportError, TransportResult};
pub use events::TransportEvent;
pub use handle::{TransportHandle, VoiceTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
