//! Error types and handling
//!
//! Common error types used across the crate.

use thiserror::Error;

/// Errors surfaced at the camera driver seam and by resource setup.
///
/// Bind rejections are never fatal: the session manager logs them, falls
/// back to the unbound state, and the caller may retry with relaxed
/// parameters.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("bind rejected by hardware: {0}")]
    BindRejected(String),

    #[error("recording failed: {0}")]
    Recording(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using CameraError
pub type CameraResult<T> = Result<T, CameraError>;
