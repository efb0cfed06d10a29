//! End-to-end session lifecycle tests against the mock driver.

use camera_mux::{
    CameraCommand, CameraController, LensFacing, MockDriver, RawFrame, RawPlane, SessionConfig,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn manual_config(root: &std::path::Path) -> SessionConfig {
    let mut config = SessionConfig::new(root);
    config.auto_start = false;
    config
}

/// Poll until `cond` holds; commands settle asynchronously on router tasks.
async fn settle(cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 1s");
}

#[tokio::test]
async fn session_follows_the_latest_camera_command() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));

    let (tx, rx) = watch::channel(CameraCommand::Stop);
    controller.bind_commands(rx);
    controller.attach().await;

    tx.send(CameraCommand::Start).unwrap();
    settle(|| driver.is_bound()).await;

    tx.send(CameraCommand::Stop).unwrap();
    settle(|| !driver.is_bound()).await;

    // Quick burst: intermediate values may conflate, the last Start wins.
    tx.send(CameraCommand::Start).unwrap();
    tx.send(CameraCommand::Stop).unwrap();
    tx.send(CameraCommand::Start).unwrap();
    settle(|| driver.is_bound()).await;
    assert_eq!(driver.bound_facing(), Some(LensFacing::Front));

    controller.detach().await;
}

#[tokio::test]
async fn commands_bound_before_attach_are_honored_at_attach() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));

    let (tx, rx) = watch::channel(CameraCommand::Start);
    controller.bind_commands(rx);
    assert!(!driver.is_bound());

    controller.attach().await;
    settle(|| driver.is_bound()).await;

    tx.send(CameraCommand::Stop).unwrap();
    settle(|| !driver.is_bound()).await;
    controller.detach().await;
}

#[tokio::test]
async fn start_with_same_facing_binds_once() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;

    controller.start().await.unwrap();
    controller.start().await.unwrap();

    assert_eq!(driver.bind_calls(), 1);
    assert_eq!(driver.acquire_calls(), 1);
    controller.detach().await;
}

#[tokio::test]
async fn facing_change_rebinds_to_the_new_lens() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;

    controller.start().await.unwrap();
    assert_eq!(driver.bound_facing(), Some(LensFacing::Front));

    controller.set_facing(LensFacing::Back).await.unwrap();
    assert_eq!(driver.bind_calls(), 2);
    assert_eq!(driver.unbind_calls(), 1);
    assert_eq!(driver.bound_facing(), Some(LensFacing::Back));
    controller.detach().await;
}

#[tokio::test]
async fn facing_change_while_stopped_does_not_bind() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;

    controller.set_facing(LensFacing::Back).await.unwrap();
    assert_eq!(driver.bind_calls(), 0);

    // The stored facing is used once the camera does start.
    controller.start().await.unwrap();
    assert_eq!(driver.bound_facing(), Some(LensFacing::Back));
    controller.detach().await;
}

#[tokio::test]
async fn bind_rejection_falls_back_to_unbound_and_retry_succeeds() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;

    driver.reject_next_bind();
    controller.start().await.unwrap();
    assert!(!driver.is_bound());

    // Retry by resubmission.
    controller.start().await.unwrap();
    assert!(driver.is_bound());
    controller.detach().await;
}

#[tokio::test]
async fn unsupported_fps_hint_leaves_camera_stopped() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    driver.set_max_supported_fps(30);
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;

    // Default config requests a fixed 60 fps hint.
    controller.start().await.unwrap();
    assert!(!driver.is_bound());
    assert_eq!(driver.bind_calls(), 0);
    controller.detach().await;
}

#[tokio::test]
async fn injected_frames_reach_subscribers() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    let mut frames = controller.frames();
    controller.attach().await;
    controller.start().await.unwrap();

    let released = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&released);
    let raw = RawFrame::new(
        vec![RawPlane::new(vec![5u8; 8]), RawPlane::new(vec![5u8; 4])],
        4,
        3,
        270,
        42,
    )
    .with_release(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert!(driver.inject_frame(raw));

    let frame = tokio::time::timeout(Duration::from_secs(1), frames.recv())
        .await
        .expect("frame within 1s")
        .unwrap();
    assert_eq!(&frame.data[..], &[5u8; 12]);
    assert_eq!((frame.width, frame.height), (4, 3));
    assert_eq!(frame.rotation_degrees, 270);
    assert_eq!(frame.timestamp_nanos, 42);
    assert_eq!(released.load(Ordering::SeqCst), 1);
    controller.detach().await;
}

#[tokio::test]
async fn frames_without_subscribers_are_released_without_delivery() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;
    controller.start().await.unwrap();

    let released = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&released);
    let raw = RawFrame::new(vec![RawPlane::new(vec![1u8; 16])], 4, 4, 0, 1).with_release(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );
    assert!(driver.inject_frame(raw));

    settle(|| released.load(Ordering::SeqCst) == 1).await;
    controller.detach().await;
}

#[tokio::test]
async fn detach_is_idempotent_and_safe_before_any_bind() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));

    // Never attached, never bound.
    controller.detach().await;

    controller.attach().await;
    controller.start().await.unwrap();
    controller.detach().await;
    controller.detach().await;

    assert_eq!(driver.unbind_calls(), 1);
    assert!(!driver.is_bound());
}

#[tokio::test]
async fn start_before_attach_is_a_silent_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let controller = CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));

    controller.start().await.unwrap();
    assert!(!driver.is_bound());
    assert_eq!(driver.acquire_calls(), 0);
}

#[tokio::test]
async fn rebinding_command_stream_replaces_the_previous_one() {
    let tmp = tempfile::tempdir().unwrap();
    let driver = MockDriver::new();
    let mut controller =
        CameraController::new(Arc::new(driver.clone()), manual_config(tmp.path()));
    controller.attach().await;

    let (old_tx, old_rx) = watch::channel(CameraCommand::Stop);
    controller.bind_commands(old_rx);
    let (new_tx, new_rx) = watch::channel(CameraCommand::Stop);
    controller.bind_commands(new_rx);

    new_tx.send(CameraCommand::Start).unwrap();
    settle(|| driver.is_bound()).await;

    // The replaced stream no longer drives the session.
    old_tx.send(CameraCommand::Stop).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(driver.is_bound());
    controller.detach().await;
}
