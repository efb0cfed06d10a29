//! Shared utilities

pub mod error;

pub use error::{CameraError, CameraResult};
