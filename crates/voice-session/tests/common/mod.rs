//! Shared test doubles: a deterministic fake transport and microphone probe
//!
//! The fakes record every interaction (constructs, start targets, stop
//! calls, device opens/closes) so scenario tests can assert on exactly what
//! the controller did, and expose `emit()` so tests can script the
//! transport's event stream.

#![allow(dead_code)]

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use voxdesk_voice_session::{
    CaptureDevice, ControllerConfig, LifecycleManager, MicrophoneProbe, PermissionGate,
    SessionController, SessionEvent, SessionState, SessionStatusInfo, TransportError,
    TransportEvent, TransportHandle, VoiceSessionError, VoiceSessionResult, VoiceTransport,
};

pub const DEFAULT_CREDENTIAL: &str = "default-public-key";

/// Initialize test logging; honours `RUST_LOG`, defaults to warnings only
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub struct FakeTransport {
    pub constructed: AtomicUsize,
    pub fail_construct: AtomicBool,
    pub fail_start: Arc<AtomicBool>,
    pub fail_stop: Arc<AtomicBool>,
    pub handles: Mutex<Vec<Arc<FakeHandle>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            constructed: AtomicUsize::new(0),
            fail_construct: AtomicBool::new(false),
            fail_start: Arc::new(AtomicBool::new(false)),
            fail_stop: Arc::new(AtomicBool::new(false)),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Number of transport handles constructed so far
    pub fn construct_count(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    /// The n-th handle handed to the controller
    pub fn handle(&self, index: usize) -> Arc<FakeHandle> {
        self.handles.lock().unwrap()[index].clone()
    }
}

impl VoiceTransport for FakeTransport {
    fn construct(&self, credential: &str) -> Result<Arc<dyn TransportHandle>, TransportError> {
        if self.fail_construct.load(Ordering::SeqCst) {
            return Err(TransportError::construct("fake construct failure"));
        }
        self.constructed.fetch_add(1, Ordering::SeqCst);
        let handle = Arc::new(FakeHandle {
            credential: credential.to_string(),
            started: Mutex::new(Vec::new()),
            stop_calls: AtomicUsize::new(0),
            fail_start: Arc::clone(&self.fail_start),
            fail_stop: Arc::clone(&self.fail_stop),
            event_tx: broadcast::channel(32).0,
        });
        self.handles.lock().unwrap().push(Arc::clone(&handle));
        Ok(handle)
    }
}

impl fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTransport")
            .field("constructed", &self.construct_count())
            .finish()
    }
}

pub struct FakeHandle {
    pub credential: String,
    pub started: Mutex<Vec<String>>,
    pub stop_calls: AtomicUsize,
    fail_start: Arc<AtomicBool>,
    fail_stop: Arc<AtomicBool>,
    event_tx: broadcast::Sender<TransportEvent>,
}

impl FakeHandle {
    /// Script an event onto this handle's stream
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn started_targets(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportHandle for FakeHandle {
    async fn start(&self, target_id: &str) -> Result<(), TransportError> {
        self.started.lock().unwrap().push(target_id.to_string());
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(TransportError::start("fake start rejection"));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), TransportError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(TransportError::stop("fake hangup failure"));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.event_tx.subscribe()
    }
}

impl fmt::Debug for FakeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeHandle")
            .field("stop_calls", &self.stop_count())
            .finish()
    }
}

pub struct FakeMicrophone {
    pub opens: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub deny: AtomicBool,
    pub delay_ms: AtomicU64,
}

impl FakeMicrophone {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            deny: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
        })
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

struct FakeDevice {
    closes: Arc<AtomicUsize>,
}

impl CaptureDevice for FakeDevice {
    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MicrophoneProbe for FakeMicrophone {
    async fn open(&self) -> VoiceSessionResult<Box<dyn CaptureDevice>> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.deny.load(Ordering::SeqCst) {
            return Err(VoiceSessionError::permission("denied by fake microphone"));
        }
        Ok(Box::new(FakeDevice {
            closes: Arc::clone(&self.closes),
        }))
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub microphone: Arc<FakeMicrophone>,
    pub controller: Arc<SessionController>,
    pub lifecycle: LifecycleManager,
}

pub fn harness() -> Harness {
    harness_with(ControllerConfig::default().with_default_credential(DEFAULT_CREDENTIAL))
}

pub fn harness_with(config: ControllerConfig) -> Harness {
    init_tracing();
    let transport = FakeTransport::new();
    let microphone = FakeMicrophone::new();
    let gate = Arc::new(PermissionGate::new(
        Arc::clone(&microphone) as Arc<dyn MicrophoneProbe>
    ));
    let controller = SessionController::new(
        Arc::clone(&transport) as Arc<dyn VoiceTransport>,
        gate,
        config,
    );
    let lifecycle = LifecycleManager::new(Arc::clone(&controller));
    Harness {
        transport,
        microphone,
        controller,
        lifecycle,
    }
}

/// Wait until the event stream reports a transition into `target`
pub async fn wait_for_state(
    rx: &mut broadcast::Receiver<SessionEvent>,
    target: SessionState,
) -> SessionStatusInfo {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(SessionEvent::StateChanged { info }) if info.new_state == target => {
                    return info;
                }
                Ok(_) => {}
                Err(error) => panic!("session event stream failed: {error}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for state {target}"))
}

/// Wait for the next speech-activity event and return its `active` flag
pub async fn wait_for_speech(rx: &mut broadcast::Receiver<SessionEvent>) -> bool {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(SessionEvent::SpeechActivity { active, .. }) => return active,
                Ok(_) => {}
                Err(error) => panic!("session event stream failed: {error}"),
            }
        }
    })
    .await
    .expect("timed out waiting for speech activity")
}

/// Poll until `condition` holds, with a hard deadline
pub async fn wait_until(description: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting until {description}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
