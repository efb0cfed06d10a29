//! camera-mux - single-sensor camera session controller.
//!
//! Multiplexes one physical camera between three concurrent concerns:
//! continuous preview binding, a pull-based analysis frame feed for
//! zero-or-many subscribers, and optional video recording to a file. Driven
//! by external command streams and constrained by the hardware's
//! single-active-session model.
//!
//! The host supplies a [`CameraDriver`] for its platform (the crate ships
//! [`MockDriver`] for tests), builds a [`CameraController`], and wires
//! `attach`/`detach` to its own lifecycle:
//!
//! ```no_run
//! use camera_mux::{CameraController, MockDriver, SessionConfig};
//! use std::sync::Arc;
//!
//! # async fn host() {
//! let driver = MockDriver::new();
//! let mut controller =
//!     CameraController::new(Arc::new(driver), SessionConfig::new("/tmp/app"));
//! let mut frames = controller.frames();
//! controller.attach().await;
//! # }
//! ```

pub mod capture;
pub mod frame;
pub mod recorder;
pub mod session;
pub mod utils;

pub use capture::{
    BindRequest, CameraDriver, CameraSession, FpsRange, LensFacing, MockDriver, RawFrame,
    RawPlane, RecorderSignal, RecordingControl,
};
pub use frame::{FrameBufferPool, FrameData, FramePublisher};
pub use recorder::{RecordingEvent, RecordingState};
pub use session::{CameraCommand, CameraController, RecordingCommand, SessionConfig};
pub use utils::{CameraError, CameraResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for hosts that do not install their own
/// subscriber.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camera_mux=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
