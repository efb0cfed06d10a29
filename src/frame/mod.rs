//! Analysis frame path: buffer pool, immutable snapshots, publisher.

pub mod data;
pub mod pool;
pub mod publisher;

pub use data::FrameData;
pub use pool::FrameBufferPool;
pub use publisher::FramePublisher;

pub(crate) use publisher::spawn_publisher;
