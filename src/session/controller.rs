//! Controller facade
//!
//! The surface a host wires its lifecycle to: `attach`/`detach`, command
//! stream binding, explicit start/stop, and the outbound observable
//! streams. Command streams may be bound before `attach`; the router keeps
//! the reference and subscribes once an execution context exists.

use super::commands::{CameraCommand, RecordingCommand};
use super::manager::{SessionConfig, SessionManager};
use crate::capture::driver::{CameraDriver, LensFacing};
use crate::frame::FrameData;
use crate::recorder::{RecordingEvent, RecordingState};
use crate::utils::error::CameraResult;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

/// One controller per physical camera. Created unbound; the host calls
/// [`attach`](Self::attach) when it becomes active and
/// [`detach`](Self::detach) on teardown.
pub struct CameraController {
    manager: Arc<Mutex<SessionManager>>,

    frames: broadcast::Sender<FrameData>,
    recording_state: watch::Receiver<RecordingState>,
    recording_events: broadcast::Sender<RecordingEvent>,

    attached: bool,

    // Streams bound before attach wait here; kept after attach so a
    // re-attach resubscribes.
    camera_commands: Option<watch::Receiver<CameraCommand>>,
    recording_commands: Option<watch::Receiver<RecordingCommand>>,
    camera_task: Option<JoinHandle<()>>,
    recording_task: Option<JoinHandle<()>>,
}

impl CameraController {
    pub fn new(driver: Arc<dyn CameraDriver>, config: SessionConfig) -> Self {
        let (frames, _) = broadcast::channel(1);
        let (state_tx, state_rx) = watch::channel(RecordingState::Idle);
        let (events_tx, _) = broadcast::channel(4);
        let manager = SessionManager::new(
            driver,
            config,
            frames.clone(),
            state_tx,
            events_tx.clone(),
        );
        Self {
            manager: Arc::new(Mutex::new(manager)),
            frames,
            recording_state: state_rx,
            recording_events: events_tx,
            attached: false,
            camera_commands: None,
            recording_commands: None,
            camera_task: None,
            recording_task: None,
        }
    }

    /// Subscribe to analysis frames. One buffered slot; when a subscriber
    /// cannot keep up, the newest frame replaces the buffered one.
    pub fn frames(&self) -> broadcast::Receiver<FrameData> {
        self.frames.subscribe()
    }

    /// Current-value stream of the recording state.
    pub fn recording_state(&self) -> watch::Receiver<RecordingState> {
        self.recording_state.clone()
    }

    /// Subscribe to recording events from this point on.
    pub fn recording_events(&self) -> broadcast::Receiver<RecordingEvent> {
        self.recording_events.subscribe()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Begin resource acquisition: subscribe any deferred command streams
    /// and, with `auto_start`, bind the camera.
    pub async fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        tracing::debug!("controller attached");

        if let Some(rx) = self.camera_commands.clone() {
            self.spawn_camera_router(rx);
        }
        if let Some(rx) = self.recording_commands.clone() {
            self.spawn_recording_router(rx);
        }

        let mut manager = self.manager.lock().await;
        if manager.config().auto_start {
            let _ = manager.start(false).await;
        }
    }

    /// Full teardown: routers cancelled, recording driven to Idle, session
    /// unbound, analysis worker joined. Safe to call repeatedly.
    pub async fn detach(&mut self) {
        if let Some(task) = self.camera_task.take() {
            task.abort();
        }
        if let Some(task) = self.recording_task.take() {
            task.abort();
        }
        self.attached = false;
        self.manager.lock().await.detach().await;
        tracing::debug!("controller detached");
    }

    /// Route camera commands from `commands`. Before attach the stream is
    /// stored and subscribed at attach time; binding again replaces the
    /// previous subscription.
    pub fn bind_commands(&mut self, commands: watch::Receiver<CameraCommand>) {
        self.camera_commands = Some(commands.clone());
        if self.attached {
            self.spawn_camera_router(commands);
        }
    }

    /// Route recording commands from `commands`; same deferred-subscription
    /// rules as [`bind_commands`](Self::bind_commands).
    pub fn bind_recording_commands(&mut self, commands: watch::Receiver<RecordingCommand>) {
        self.recording_commands = Some(commands.clone());
        if self.attached {
            self.spawn_recording_router(commands);
        }
    }

    /// Explicit camera start. No-op when unattached (benign lifecycle race).
    pub async fn start(&self) -> CameraResult<()> {
        if !self.attached {
            return Ok(());
        }
        self.manager.lock().await.start(false).await
    }

    /// Explicit camera stop; also stops any active recording first.
    pub async fn stop(&self) {
        self.manager.lock().await.stop().await;
    }

    /// Select the lens. Rebinds immediately when the camera is running.
    pub async fn set_facing(&self, facing: LensFacing) -> CameraResult<()> {
        self.manager.lock().await.set_facing(facing).await
    }

    /// Request recording start. Unattached, the intent is remembered and
    /// flushed by the bind performed at attach.
    pub async fn start_recording(&self) -> CameraResult<()> {
        let mut manager = self.manager.lock().await;
        if self.attached {
            manager.request_start_recording().await
        } else {
            manager.defer_start_recording();
            Ok(())
        }
    }

    /// Stop recording or cancel a deferred start.
    pub async fn stop_recording(&self) {
        self.manager.lock().await.stop_recording();
    }

    fn spawn_camera_router(&mut self, mut rx: watch::Receiver<CameraCommand>) {
        if let Some(prev) = self.camera_task.take() {
            prev.abort();
        }
        let manager = Arc::clone(&self.manager);
        self.camera_task = Some(tokio::spawn(async move {
            loop {
                let cmd = *rx.borrow_and_update();
                match cmd {
                    CameraCommand::Start => {
                        let _ = manager.lock().await.start(false).await;
                    }
                    CameraCommand::Stop => {
                        manager.lock().await.stop().await;
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }));
    }

    fn spawn_recording_router(&mut self, mut rx: watch::Receiver<RecordingCommand>) {
        if let Some(prev) = self.recording_task.take() {
            prev.abort();
        }
        let manager = Arc::clone(&self.manager);
        self.recording_task = Some(tokio::spawn(async move {
            loop {
                let cmd = *rx.borrow_and_update();
                match cmd {
                    RecordingCommand::Start => {
                        let _ = manager.lock().await.request_start_recording().await;
                    }
                    RecordingCommand::Stop => {
                        manager.lock().await.stop_recording();
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }));
    }
}
