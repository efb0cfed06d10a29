//! Hardware seam
//!
//! Driver traits the session manager binds against, plus a mock driver for
//! tests and hardware-free hosts.

pub mod driver;
pub mod mock;

pub use driver::{
    BindRequest, CameraDriver, CameraSession, FpsRange, LensFacing, RawFrame, RawPlane,
    RecorderSignal, RecordingControl,
};
pub use mock::MockDriver;
