//! Reusable frame buffer pool
//!
//! One buffer, sized lazily, reused across frames of identical size so the
//! per-frame copy does not allocate. Sealed views are refcounted: the
//! backing storage is only reused once every prior view has been dropped,
//! so a slow subscriber holding a view costs one fresh allocation instead
//! of observing a torn frame.

use bytes::{Bytes, BytesMut};

#[derive(Debug, Default)]
pub struct FrameBufferPool {
    buf: BytesMut,
    last_size: usize,
    allocations: u64,
    reuses: u64,
}

impl FrameBufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a cleared buffer with capacity for exactly `size` bytes.
    ///
    /// Reuses the held storage when the size matches the previous request
    /// and no sealed view still references it; otherwise allocates.
    pub fn acquire(&mut self, size: usize) -> &mut BytesMut {
        let mut reused = false;
        if size == self.last_size {
            self.buf.clear();
            reused = self.buf.try_reclaim(size);
        }
        if reused {
            self.reuses += 1;
        } else {
            self.buf = BytesMut::with_capacity(size);
            self.last_size = size;
            self.allocations += 1;
        }
        &mut self.buf
    }

    /// Freeze the bytes written since [`acquire`](Self::acquire) into a
    /// read-only view.
    pub fn seal(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Number of fresh allocations performed so far.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Number of times the held buffer was reused without allocating.
    pub fn reuses(&self) -> u64 {
        self.reuses
    }
}
