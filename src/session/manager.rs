//! Camera session manager
//!
//! Owns the driver handle, the bind/rebind/unbind state machine, lens
//! selection, the analysis worker, and the recording lifecycle. All state
//! mutation happens on the control context: the controller serializes calls
//! through one `tokio::sync::Mutex`, so a stale facing intent can never win
//! over a later one.

use crate::capture::driver::{
    BindRequest, CameraDriver, CameraSession, FpsRange, LensFacing, RawFrame, RecorderSignal,
    RecordingControl,
};
use crate::frame::{spawn_publisher, FrameData};
use crate::recorder::{new_output_file, RecordingEvent, RecordingState};
use crate::utils::error::CameraResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Session configuration supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Desired lens facing
    pub facing: LensFacing,

    /// Bind automatically when the controller attaches
    pub auto_start: bool,

    /// Application-private directory recordings are written under
    pub output_root: PathBuf,

    /// Frame-rate hint applied to preview and analysis; None omits the hint
    pub target_fps: Option<FpsRange>,

    /// Target rotation for all use-cases, in degrees
    pub rotation_degrees: i32,

    /// Requested analysis resolution
    pub analysis_size: (u32, u32),
}

impl SessionConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            facing: LensFacing::Front,
            auto_start: true,
            output_root: output_root.into(),
            target_fps: Some(FpsRange::fixed_60()),
            rotation_degrees: 0,
            analysis_size: (640, 480),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

/// Single owner of the camera session and recording machine.
pub struct SessionManager {
    driver: Arc<dyn CameraDriver>,
    config: SessionConfig,

    /// Provider warm-up is a one-time operation, cached across rebinds and
    /// detach cycles.
    provider_ready: bool,

    session: Option<Box<dyn CameraSession>>,

    /// Facing that actually bound; Some only while a session is bound.
    bound_facing: Option<LensFacing>,

    frames: broadcast::Sender<FrameData>,
    raw_tx: Option<SyncSender<RawFrame>>,
    analysis_worker: Option<std::thread::JoinHandle<()>>,

    /// Intent to begin recording as soon as a bind succeeds.
    pending_start: bool,
    active_control: Option<Box<dyn RecordingControl>>,
    finalize_task: Option<tokio::task::JoinHandle<()>>,

    recording_state: watch::Sender<RecordingState>,
    recording_events: broadcast::Sender<RecordingEvent>,
}

impl SessionManager {
    pub(crate) fn new(
        driver: Arc<dyn CameraDriver>,
        config: SessionConfig,
        frames: broadcast::Sender<FrameData>,
        recording_state: watch::Sender<RecordingState>,
        recording_events: broadcast::Sender<RecordingEvent>,
    ) -> Self {
        Self {
            driver,
            config,
            provider_ready: false,
            session: None,
            bound_facing: None,
            frames,
            raw_tx: None,
            analysis_worker: None,
            pending_start: false,
            active_control: None,
            finalize_task: None,
            recording_state,
            recording_events,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    pub fn bound_facing(&self) -> Option<LensFacing> {
        self.bound_facing
    }

    pub fn is_recording(&self) -> bool {
        self.recording_state.borrow().is_recording()
    }

    /// Request binding for the currently desired facing.
    ///
    /// Idempotent when already bound to that facing and `force_rebind` is
    /// false. A bind rejection is not an error: the manager logs it and
    /// falls back to unbound so the caller can retry with relaxed
    /// parameters. On success, a deferred recording start is flushed.
    pub async fn start(&mut self, force_rebind: bool) -> CameraResult<()> {
        self.ensure_worker()?;

        if !self.provider_ready {
            if let Err(e) = self.driver.acquire().await {
                tracing::warn!("camera provider unavailable: {e}");
                return Ok(());
            }
            self.provider_ready = true;
        }

        let desired = self.config.facing;
        if !force_rebind && self.session.is_some() && self.bound_facing == Some(desired) {
            return Ok(());
        }

        // The hardware allows one active session: unbind before rebinding.
        if let Some(prior) = self.session.take() {
            prior.unbind().await;
            self.bound_facing = None;
        }

        let raw_tx = match &self.raw_tx {
            Some(tx) => tx.clone(),
            None => return Ok(()),
        };
        let request = BindRequest {
            facing: desired,
            rotation_degrees: self.config.rotation_degrees,
            target_fps: self.config.target_fps,
            analysis_size: self.config.analysis_size,
        };

        let driver = Arc::clone(&self.driver);
        match driver.bind(request, raw_tx).await {
            Ok(session) => {
                self.session = Some(session);
                self.bound_facing = Some(desired);
                tracing::info!(facing = ?desired, "camera session bound");
                if self.pending_start {
                    self.begin_recording_now().await;
                }
            }
            Err(e) => {
                tracing::warn!(facing = ?desired, "camera bind rejected: {e}");
            }
        }
        Ok(())
    }

    /// Stop any active recording, wait for it to reach Idle, then unbind.
    /// Idempotent when already unbound.
    pub async fn stop(&mut self) {
        self.stop_recording();
        self.await_recording_idle().await;
        if let Some(session) = self.session.take() {
            session.unbind().await;
            tracing::info!("camera session unbound");
        }
        self.bound_facing = None;
    }

    /// Update the desired facing; rebinds immediately when a session is
    /// bound so the visible preview follows without a stop/start cycle.
    pub async fn set_facing(&mut self, facing: LensFacing) -> CameraResult<()> {
        self.config.facing = facing;
        if self.session.is_some() {
            self.start(true).await?;
        }
        Ok(())
    }

    /// Begin recording, binding the session first if needed. If the session
    /// is bound by the end of this call, recording has begun; otherwise the
    /// pending-start intent stays set and is flushed by the next successful
    /// bind. No-op while already recording.
    pub async fn request_start_recording(&mut self) -> CameraResult<()> {
        if self.is_recording() {
            return Ok(());
        }
        self.pending_start = true;
        self.start(false).await?;
        if self.session.is_some() && self.pending_start {
            self.begin_recording_now().await;
        }
        Ok(())
    }

    /// Remember a start request made before the controller had an execution
    /// context; the auto-start bind at attach flushes it.
    pub(crate) fn defer_start_recording(&mut self) {
        self.pending_start = true;
    }

    /// Cancel a deferred start and ask the recorder to stop. The transition
    /// to Idle happens asynchronously via the finalize signal.
    pub fn stop_recording(&mut self) {
        self.pending_start = false;
        if let Some(mut control) = self.active_control.take() {
            tracing::info!("recording stop requested");
            control.request_stop();
        }
    }

    /// Full teardown: recording to Idle, session unbound, analysis worker
    /// drained and joined. Safe to call repeatedly and before any bind
    /// completed.
    pub async fn detach(&mut self) {
        self.stop_recording();
        self.await_recording_idle().await;
        if let Some(session) = self.session.take() {
            session.unbind().await;
        }
        self.bound_facing = None;
        // Closing the channel ends the worker; the session's sender clone
        // was dropped by the unbind above.
        self.raw_tx = None;
        if let Some(worker) = self.analysis_worker.take() {
            let _ = worker.join();
        }
        tracing::debug!("session manager detached");
    }

    async fn begin_recording_now(&mut self) {
        if self.is_recording() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.pending_start = false;

        let output = match new_output_file(&self.config.output_root) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("failed to allocate recording output: {e}");
                let _ = self.recording_events.send(RecordingEvent::Error {
                    output: None,
                    message: e.to_string(),
                });
                return;
            }
        };

        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
        let started = session.start_recording(&output, signal_tx).await;
        match started {
            Ok(control) => {
                self.active_control = Some(control);
                self.recording_state
                    .send_replace(RecordingState::Recording(output.clone()));
                tracing::info!(output = %output.display(), "recording started");

                let state = self.recording_state.clone();
                let events = self.recording_events.clone();
                self.finalize_task = Some(tokio::spawn(async move {
                    while let Some(signal) = signal_rx.recv().await {
                        match signal {
                            RecorderSignal::Started => {
                                let _ = events.send(RecordingEvent::Started(output.clone()));
                            }
                            RecorderSignal::Finalized { error } => {
                                match error {
                                    None => {
                                        let _ = events
                                            .send(RecordingEvent::Finalized(output.clone()));
                                    }
                                    Some(message) => {
                                        tracing::warn!(
                                            output = %output.display(),
                                            "recording finalize error: {message}"
                                        );
                                        let _ = events.send(RecordingEvent::Error {
                                            output: Some(output.clone()),
                                            message,
                                        });
                                    }
                                }
                                state.send_replace(RecordingState::Idle);
                                break;
                            }
                        }
                    }
                }));
            }
            Err(e) => {
                tracing::warn!("recorder failed to start: {e}");
                let _ = self.recording_events.send(RecordingEvent::Error {
                    output: Some(output),
                    message: e.to_string(),
                });
            }
        }
    }

    async fn await_recording_idle(&mut self) {
        if let Some(task) = self.finalize_task.take() {
            let _ = task.await;
        }
    }

    fn ensure_worker(&mut self) -> CameraResult<()> {
        if self.raw_tx.is_none() {
            let (tx, worker) = spawn_publisher(self.frames.clone())?;
            self.raw_tx = Some(tx);
            self.analysis_worker = Some(worker);
        }
        Ok(())
    }
}
