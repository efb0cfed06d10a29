//! Camera driver seam
//!
//! Hardware-agnostic traits the session manager drives. A driver owns the
//! physical device; the core owns session lifecycle, frame publishing and
//! recording state. Implementations deliver raw analysis frames into the
//! bounded channel handed to [`CameraDriver::bind`] and report recording
//! progress on the signal channel handed to
//! [`CameraSession::start_recording`].

use crate::utils::error::CameraResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::mpsc::SyncSender;
use tokio::sync::mpsc::UnboundedSender;

/// Which physical camera is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensFacing {
    Front,
    Back,
}

impl Default for LensFacing {
    fn default() -> Self {
        Self::Front
    }
}

/// Requested frame-rate range, applied identically to the preview and
/// analysis paths. A hint only: hardware may reject it, which surfaces as a
/// bind failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsRange {
    pub min: u32,
    pub max: u32,
}

impl FpsRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Fixed 60 fps, the default hint requested by the controller.
    pub const fn fixed_60() -> Self {
        Self::new(60, 60)
    }
}

/// Everything a driver needs to bind one session: lens selection, target
/// rotation, optional frame-rate hint, and the analysis resolution.
#[derive(Debug, Clone)]
pub struct BindRequest {
    pub facing: LensFacing,
    pub rotation_degrees: i32,
    pub target_fps: Option<FpsRange>,
    pub analysis_size: (u32, u32),
}

/// One plane of a raw sensor frame (e.g. Y, U, V).
#[derive(Debug, Clone)]
pub struct RawPlane {
    pub data: Vec<u8>,
}

impl RawPlane {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// A raw frame as delivered by the sensor, before any copy into the pool.
///
/// The underlying capture resource is released when the frame is dropped,
/// which holds on every publisher code path including the no-subscriber
/// early return. Drivers that need to recycle an image slot can attach a
/// release hook.
pub struct RawFrame {
    pub planes: Vec<RawPlane>,
    pub width: u32,
    pub height: u32,
    pub rotation_degrees: i32,
    pub timestamp_nanos: i64,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl RawFrame {
    pub fn new(
        planes: Vec<RawPlane>,
        width: u32,
        height: u32,
        rotation_degrees: i32,
        timestamp_nanos: i64,
    ) -> Self {
        Self {
            planes,
            width,
            height,
            rotation_degrees,
            timestamp_nanos,
            release: None,
        }
    }

    /// Attach a hook invoked exactly once when the frame is released.
    pub fn with_release(mut self, release: impl FnOnce() + Send + 'static) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    /// Total byte size across all planes.
    pub fn total_bytes(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }
}

impl Drop for RawFrame {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("planes", &self.planes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rotation_degrees", &self.rotation_degrees)
            .field("timestamp_nanos", &self.timestamp_nanos)
            .finish()
    }
}

/// Recording progress reported by the driver for one recording cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderSignal {
    /// The underlying recorder confirmed it is writing.
    Started,
    /// The recorder finished, successfully or not. Terminal per cycle.
    Finalized { error: Option<String> },
}

/// Entry point to one physical camera.
#[async_trait]
pub trait CameraDriver: Send + Sync {
    /// One-time provider warm-up. The session manager calls this once and
    /// caches the result across rebinds and detach cycles.
    async fn acquire(&self) -> CameraResult<()>;

    /// Bind a new session for `request`, delivering raw analysis frames into
    /// `frames`. The channel is bounded at one slot; drivers drop the frame
    /// when it is full (keep-only-latest). Returns an error when the
    /// hardware rejects the requested parameters.
    async fn bind(
        &self,
        request: BindRequest,
        frames: SyncSender<RawFrame>,
    ) -> CameraResult<Box<dyn CameraSession>>;
}

/// A bound session. Dropping or unbinding it must release the device and
/// drop the driver's clone of the analysis frame sender.
#[async_trait]
pub trait CameraSession: Send {
    /// Start writing a recording to `output`, reporting progress on
    /// `signals`. The driver must eventually send a terminal
    /// [`RecorderSignal::Finalized`] once a recording was started.
    async fn start_recording(
        &mut self,
        output: &Path,
        signals: UnboundedSender<RecorderSignal>,
    ) -> CameraResult<Box<dyn RecordingControl>>;

    /// Tear the session down.
    async fn unbind(self: Box<Self>);
}

/// Handle to an in-flight recording.
pub trait RecordingControl: Send {
    /// Ask the recorder to stop. Finalization is reported asynchronously on
    /// the signal channel, not inside this call.
    fn request_stop(&mut self);
}
