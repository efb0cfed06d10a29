//! Session orchestration
//!
//! - Command types for the two inbound streams
//! - The session manager owning hardware lifecycle and recording drive
//! - The controller facade hosts wire their lifecycle to

pub mod commands;
pub mod controller;
pub mod manager;

pub use commands::{CameraCommand, RecordingCommand};
pub use controller::CameraController;
pub use manager::{SessionConfig, SessionManager};
