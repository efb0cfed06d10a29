//! External command contracts
//!
//! Carried on `tokio::sync::watch` channels: a single current value,
//! delivered to the router immediately on subscribe and on every change.
//! Quick successions may conflate; the router always acts on the latest
//! intent.

use serde::{Deserialize, Serialize};

/// Desired session activity, not necessarily the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraCommand {
    Start,
    #[default]
    Stop,
}

/// Desired recording activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingCommand {
    Start,
    #[default]
    Stop,
}
