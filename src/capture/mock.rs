//! Mock camera driver
//!
//! In-process driver for tests and for downstream hosts that want to
//! exercise the controller without hardware. Counts every lifecycle call,
//! supports scripted bind rejections, and lets tests inject raw analysis
//! frames and recording failures.

use super::driver::{
    BindRequest, CameraDriver, CameraSession, LensFacing, RawFrame, RecorderSignal,
    RecordingControl,
};
use crate::utils::error::{CameraError, CameraResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
struct MockInner {
    acquire_calls: u64,
    bind_calls: u64,
    unbind_calls: u64,
    recordings_started: u64,
    bound_facing: Option<LensFacing>,
    last_request: Option<BindRequest>,
    reject_next_bind: bool,
    max_supported_fps: Option<u32>,
    frames: Option<SyncSender<RawFrame>>,
    active_signals: Option<UnboundedSender<RecorderSignal>>,
}

/// Mock driver backed by shared counters. Clones share state, so tests keep
/// one handle while the controller owns another.
#[derive(Clone, Default)]
pub struct MockDriver {
    inner: Arc<Mutex<MockInner>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire_calls(&self) -> u64 {
        self.inner.lock().acquire_calls
    }

    pub fn bind_calls(&self) -> u64 {
        self.inner.lock().bind_calls
    }

    pub fn unbind_calls(&self) -> u64 {
        self.inner.lock().unbind_calls
    }

    pub fn recordings_started(&self) -> u64 {
        self.inner.lock().recordings_started
    }

    /// Facing of the currently bound session, if any.
    pub fn bound_facing(&self) -> Option<LensFacing> {
        self.inner.lock().bound_facing
    }

    pub fn is_bound(&self) -> bool {
        self.inner.lock().bound_facing.is_some()
    }

    /// The request used by the most recent successful bind.
    pub fn last_request(&self) -> Option<BindRequest> {
        self.inner.lock().last_request.clone()
    }

    /// Reject exactly the next bind attempt, as hardware refusing the
    /// requested parameters would.
    pub fn reject_next_bind(&self) {
        self.inner.lock().reject_next_bind = true;
    }

    /// Reject any bind whose fps hint exceeds `fps`.
    pub fn set_max_supported_fps(&self, fps: u32) {
        self.inner.lock().max_supported_fps = Some(fps);
    }

    /// Push a raw frame into the bound session's analysis channel. Returns
    /// false when no session is bound or the channel is full (frame dropped,
    /// keep-only-latest).
    pub fn inject_frame(&self, frame: RawFrame) -> bool {
        let sender = self.inner.lock().frames.clone();
        match sender {
            Some(tx) => tx.try_send(frame).is_ok(),
            None => false,
        }
    }

    /// Fail the in-flight recording with `message`, as a mid-write encoder
    /// error would.
    pub fn fail_active_recording(&self, message: &str) {
        let signals = self.inner.lock().active_signals.take();
        if let Some(tx) = signals {
            let _ = tx.send(RecorderSignal::Finalized {
                error: Some(message.to_string()),
            });
        }
    }
}

#[async_trait]
impl CameraDriver for MockDriver {
    async fn acquire(&self) -> CameraResult<()> {
        self.inner.lock().acquire_calls += 1;
        Ok(())
    }

    async fn bind(
        &self,
        request: BindRequest,
        frames: SyncSender<RawFrame>,
    ) -> CameraResult<Box<dyn CameraSession>> {
        let mut inner = self.inner.lock();
        if inner.reject_next_bind {
            inner.reject_next_bind = false;
            return Err(CameraError::BindRejected("scripted rejection".into()));
        }
        if let (Some(cap), Some(fps)) = (inner.max_supported_fps, request.target_fps) {
            if fps.max > cap {
                return Err(CameraError::BindRejected(format!(
                    "fps range {}..{} not supported (max {cap})",
                    fps.min, fps.max
                )));
            }
        }
        inner.bind_calls += 1;
        inner.bound_facing = Some(request.facing);
        inner.frames = Some(frames);
        inner.last_request = Some(request);
        Ok(Box::new(MockSession {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MockSession {
    inner: Arc<Mutex<MockInner>>,
}

#[async_trait]
impl CameraSession for MockSession {
    async fn start_recording(
        &mut self,
        output: &Path,
        signals: UnboundedSender<RecorderSignal>,
    ) -> CameraResult<Box<dyn RecordingControl>> {
        std::fs::File::create(output)?;
        {
            let mut inner = self.inner.lock();
            inner.recordings_started += 1;
            inner.active_signals = Some(signals.clone());
        }
        let _ = signals.send(RecorderSignal::Started);
        Ok(Box::new(MockRecordingControl {
            signals: Some(signals),
        }))
    }

    async fn unbind(self: Box<Self>) {
        let mut inner = self.inner.lock();
        inner.unbind_calls += 1;
        inner.bound_facing = None;
        inner.frames = None;
    }
}

struct MockRecordingControl {
    signals: Option<UnboundedSender<RecorderSignal>>,
}

impl RecordingControl for MockRecordingControl {
    fn request_stop(&mut self) {
        if let Some(tx) = self.signals.take() {
            let _ = tx.send(RecorderSignal::Finalized { error: None });
        }
    }
}
