//! Frame publisher
//!
//! Converts raw sensor callbacks into immutable [`FrameData`] snapshots on
//! a dedicated analysis worker thread. The key performance rule: with zero
//! subscribers, the raw frame is released with no buffer copy at all.

use super::data::FrameData;
use super::pool::FrameBufferPool;
use crate::capture::driver::RawFrame;
use crate::utils::error::CameraResult;
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread::JoinHandle;
use tokio::sync::broadcast;

/// Single-writer publisher owning the frame buffer pool.
pub struct FramePublisher {
    pool: FrameBufferPool,
    frames: broadcast::Sender<FrameData>,
    published: u64,
    skipped: u64,
}

impl FramePublisher {
    pub fn new(frames: broadcast::Sender<FrameData>) -> Self {
        Self {
            pool: FrameBufferPool::new(),
            frames,
            published: 0,
            skipped: 0,
        }
    }

    /// Handle one raw sensor frame. The frame is released when this returns,
    /// on every path, by ownership.
    pub fn on_raw_frame(&mut self, frame: RawFrame) {
        if self.frames.receiver_count() == 0 {
            self.skipped += 1;
            return;
        }

        let total = frame.total_bytes();
        let buf = self.pool.acquire(total);
        for plane in &frame.planes {
            buf.extend_from_slice(&plane.data);
        }
        let data = self.pool.seal();

        // Best-effort emit; lagging subscribers lose the oldest frame.
        let _ = self.frames.send(FrameData {
            data,
            width: frame.width,
            height: frame.height,
            rotation_degrees: frame.rotation_degrees,
            timestamp_nanos: frame.timestamp_nanos,
        });
        self.published += 1;
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn pool(&self) -> &FrameBufferPool {
        &self.pool
    }
}

/// Spawn the analysis worker thread: a bounded one-slot channel the driver
/// feeds (keep-only-latest) drained into a [`FramePublisher`]. The worker
/// exits once every sender clone is dropped.
pub(crate) fn spawn_publisher(
    frames: broadcast::Sender<FrameData>,
) -> CameraResult<(SyncSender<RawFrame>, JoinHandle<()>)> {
    let (raw_tx, raw_rx) = sync_channel::<RawFrame>(1);
    let handle = std::thread::Builder::new()
        .name("camera-analysis".into())
        .spawn(move || {
            let mut publisher = FramePublisher::new(frames);
            while let Ok(frame) = raw_rx.recv() {
                publisher.on_raw_frame(frame);
            }
            tracing::debug!(
                published = publisher.published(),
                skipped = publisher.skipped(),
                "analysis worker stopped"
            );
        })?;
    Ok((raw_tx, handle))
}
