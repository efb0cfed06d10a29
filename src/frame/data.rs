//! Immutable frame snapshot handed to analysis subscribers.

use bytes::Bytes;

/// One analysis frame: a read-only pixel view plus capture metadata.
///
/// Cloning is cheap (refcounted view). The view stays valid for as long as
/// the subscriber holds it, but holding views across frames degrades buffer
/// pooling; subscribers needing retention should copy.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub rotation_degrees: i32,
    pub timestamp_nanos: i64,
}

impl FrameData {
    /// Total pixel bytes in this frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
