//! Recording system module
//!
//! Observable state machine types and output file allocation. The machine
//! itself is driven by the session manager, which owns the only writer.

pub mod output;
pub mod state;

pub use output::new_output_file;
pub use state::{RecordingEvent, RecordingState};
