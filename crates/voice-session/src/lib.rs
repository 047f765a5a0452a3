//! # Voice Session - Real-time Voice Session Coordination
//!
//! This crate is the session coordination layer of the voxdesk stack: it opens
//! a live, bidirectional voice conversation with an AI agent over an external
//! real-time transport, manages microphone permission, and tracks connection
//! lifecycle through an explicit state machine.
//!
//! The crate never renders UI. The presentation layer consumes a read-only
//! [`SessionView`] snapshot plus a broadcast stream of [`SessionEvent`]s, and
//! drives the session through two intents on [`LifecycleManager`]:
//! [`request_start`](LifecycleManager::request_start) and
//! [`request_close`](LifecycleManager::request_close).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │    Presentation layer    │  view() / events / intents
//! └────────────┬─────────────┘
//! ┌────────────▼─────────────┐
//! │     LifecycleManager     │  open / close, guaranteed teardown
//! │ ┌──────────────────────┐ │
//! │ │  SessionController   │ │  Idle → Connecting → Connected → ...
//! │ │  PermissionGate      │ │  single-flight microphone probe
//! │ │  locator::resolve    │ │  locator → ConnectionConfig
//! │ └──────────┬───────────┘ │
//! └────────────┼─────────────┘
//! ┌────────────▼─────────────┐
//! │       EventBridge        │  tags events with a generation id
//! └────────────┬─────────────┘
//! ┌────────────▼─────────────┐
//! │  voxdesk-voice-transport │  external SDK behind capability traits
//! └──────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voxdesk_voice_session::{
//!     ControllerConfig, LifecycleManager, PermissionGate, SessionController,
//! };
//! # fn transport() -> Arc<dyn voxdesk_voice_transport::VoiceTransport> { unimplemented!() }
//! # fn microphone() -> Arc<dyn voxdesk_voice_session::MicrophoneProbe> { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ControllerConfig::default().with_default_credential("public-key");
//!     let gate = Arc::new(PermissionGate::new(microphone()));
//!     let controller = SessionController::new(transport(), gate, config);
//!     let lifecycle = LifecycleManager::new(controller);
//!
//!     // Host UI opened the call dialog
//!     lifecycle.open(Some("https://host/call?targetId=agent-1")).await?;
//!     lifecycle.request_start().await?;
//!
//!     // ... the transport's call-start event moves the session to Connected ...
//!
//!     // Host UI closed the dialog: stop, clear, release the microphone grant
//!     lifecycle.request_close().await;
//!     Ok(())
//! }
//! ```

mod bridge;

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod locator;
pub mod permission;
pub mod session;

// Re-export main types
pub use config::{ConnectionConfig, ControllerConfig};
pub use controller::SessionController;
pub use error::{VoiceSessionError, VoiceSessionResult};
pub use events::{SessionEvent, SessionStats, SessionStatusInfo, SessionView};
pub use lifecycle::LifecycleManager;
pub use locator::resolve;
pub use permission::{CaptureDevice, MicrophoneProbe, PermissionGate, PermissionResult};
pub use session::{Generation, SessionId, SessionState};

// Re-export the transport contract for implementors of SDK adapters
pub use voxdesk_voice_transport::{TransportError, TransportEvent, TransportHandle, VoiceTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
