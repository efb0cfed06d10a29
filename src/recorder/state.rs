//! Recording state management
//!
//! Defines the observable recording state machine and its event stream.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current state of the recording machine.
///
/// Single current value, written only by the session manager and its
/// finalize task (latest-wins, not a queue). One cycle runs
/// Idle → Recording → Idle; a fresh start request restarts the machine with
/// a new output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Currently writing to the contained output file
    Recording(PathBuf),
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording(_))
    }
}

/// Discrete events emitted over one or more recording cycles.
///
/// An event log, not a current value: subscribers observe the sequence from
/// the point they attach; earlier events are not redelivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingEvent {
    /// The underlying recorder confirmed it is writing.
    Started(PathBuf),
    /// The recording finalized successfully.
    Finalized(PathBuf),
    /// The recording failed, during start or finalize. `output` is the file
    /// in question when one was already allocated.
    Error {
        output: Option<PathBuf>,
        message: String,
    },
}
