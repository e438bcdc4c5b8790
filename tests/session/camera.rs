//! Camera ownership across opening, closing and retrying

use super::{open_session, wait_for_view};
use crate::common::fixtures::{
    member_validation, resolver, session_settings, settle, DeniedCamera, MEMBER_CODE,
};
use crate::common::mock_api::MockApi;
use lifthub_checkin::api::ResolveError;
use lifthub_checkin::scanner::{CameraDevice, CameraStream, FrameFeedCamera};
use lifthub_checkin::session::{CheckInSession, Phase, SessionCommand, SessionView};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_close_releases_camera_and_resets_view() {
    let api = Arc::new(MockApi::new());
    let desk = open_session(&api);
    settle().await;
    assert!(!desk.camera.is_available());

    let view = desk.session.close().await;

    assert_eq!(view, SessionView::default());
    assert_eq!(desk.camera.release_count(), 1);
    assert!(desk.camera.is_available());
}

#[tokio::test(start_paused = true)]
async fn test_close_from_a_prompt_still_releases_camera() {
    let api = Arc::new(MockApi::new());
    let desk = open_session(&api);
    settle().await;

    desk.feed.push("UNKNOWN-CODE");
    wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;
    desk.session.close().await;

    assert_eq!(desk.camera.release_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_result_after_close_is_ignored() {
    let api = Arc::new(
        MockApi::new()
            .with_validation(MEMBER_CODE, member_validation(42, "Jane Doe", false))
            .with_delay(Duration::from_secs(5)),
    );
    let desk = open_session(&api);
    settle().await;

    desk.feed.push(MEMBER_CODE);
    wait_for_view(&desk.session, |v| v.phase == Phase::Resolving).await;
    let views = desk.session.subscribe();
    let closed = desk.session.close().await;
    assert_eq!(closed.phase, Phase::Idle);

    sleep(Duration::from_secs(12)).await;

    assert_eq!(*views.borrow(), SessionView::default());
    assert_eq!(desk.camera.release_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_starts_fresh() {
    let api = Arc::new(MockApi::new());
    let (camera, feed) = FrameFeedCamera::new();
    let device: Arc<dyn CameraDevice> = Arc::new(camera.clone());

    let first = CheckInSession::open(device.clone(), resolver(&api), session_settings());
    settle().await;
    feed.push("GUEST-CARD-17");
    wait_for_view(&first, |v| v.phase.is_prompt()).await;
    first.close().await;

    // The same code right away would be inside the old session's gate
    let second = CheckInSession::open(device, resolver(&api), session_settings());
    wait_for_view(&second, |v| v.phase == Phase::Scanning).await;
    feed.push("GUEST-CARD-17");
    wait_for_view(&second, |v| v.phase.is_prompt()).await;

    assert_eq!(api.validate_calls(), 2);
    second.close().await;
    assert_eq!(camera.release_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_frame_seen_while_resolving_does_not_survive_reopen() {
    let api = Arc::new(
        MockApi::new()
            .with_validation(MEMBER_CODE, member_validation(42, "Jane Doe", false))
            .with_delay(Duration::from_secs(5)),
    );
    let (camera, feed) = FrameFeedCamera::new();
    let device: Arc<dyn CameraDevice> = Arc::new(camera.clone());

    let first = CheckInSession::open(device.clone(), resolver(&api), session_settings());
    settle().await;
    feed.push("UNKNOWN-CODE");
    wait_for_view(&first, |v| v.phase == Phase::Resolving).await;
    feed.push(MEMBER_CODE);
    settle().await;
    first.close().await;

    let second = CheckInSession::open(device, resolver(&api), session_settings());
    wait_for_view(&second, |v| v.phase == Phase::Scanning).await;
    sleep(Duration::from_secs(12)).await;

    assert_eq!(api.validate_calls(), 1);
    assert!(api.entry_requests().is_empty());
    assert_eq!(second.view().phase, Phase::Scanning);

    second.close().await;
    assert_eq!(camera.release_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_leaves_camera_unavailable() {
    let api = Arc::new(MockApi::new());
    let camera = Arc::new(DeniedCamera::new());
    let session = CheckInSession::open(camera.clone(), resolver(&api), session_settings());

    let view = wait_for_view(&session, |v| {
        matches!(v.phase, Phase::CameraUnavailable { .. })
    })
    .await;
    assert_eq!(
        view.status,
        "Camera permission denied. Allow camera access, then retry."
    );

    session.send(SessionCommand::RetryCamera);
    settle().await;
    assert_eq!(camera.attempts(), 2);
    assert!(matches!(
        session.view().phase,
        Phase::CameraUnavailable { .. }
    ));

    // An error shown meanwhile falls back to the camera message, not to scanning
    api.set_search_error(ResolveError::Status { status: 500 });
    session.send(SessionCommand::Search("jane".to_string()));
    wait_for_view(&session, |v| matches!(v.phase, Phase::ShowingError { .. })).await;
    let view = wait_for_view(&session, |v| {
        matches!(v.phase, Phase::CameraUnavailable { .. })
    })
    .await;
    assert_eq!(
        view.status,
        "Camera permission denied. Allow camera access, then retry."
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_camera_is_freed() {
    let api = Arc::new(MockApi::new());
    let (camera, _feed) = FrameFeedCamera::new();
    let mut held = camera.acquire("another-view").await.unwrap();

    let session = CheckInSession::open(Arc::new(camera.clone()), resolver(&api), session_settings());
    let view = wait_for_view(&session, |v| {
        matches!(v.phase, Phase::CameraUnavailable { .. })
    })
    .await;
    assert_eq!(
        view.status,
        "Camera could not be started. Retry or reopen check-in."
    );

    held.release().await;
    session.send(SessionCommand::RetryCamera);
    wait_for_view(&session, |v| v.phase == Phase::Scanning).await;
    assert!(!camera.is_available());
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_feed_reports_camera_loss() {
    let api = Arc::new(MockApi::new());
    let desk = open_session(&api);
    settle().await;

    drop(desk.feed);
    let view = wait_for_view(&desk.session, |v| {
        matches!(v.phase, Phase::CameraUnavailable { .. })
    })
    .await;

    assert_eq!(view.status, "Camera disconnected. Retry to reconnect.");
    assert_eq!(desk.camera.release_count(), 1);
}
