//! Check-in session test modules

pub mod camera;
pub mod day_pass;
pub mod manual_search;

use crate::common::fixtures::{resolver, session_settings};
use crate::common::mock_api::MockApi;
use lifthub_checkin::scanner::{FrameFeed, FrameFeedCamera};
use lifthub_checkin::session::{CheckInSession, SessionView};
use std::sync::Arc;
use std::time::Duration;

/// A session running on a fresh channel-fed camera
pub struct Harness {
    pub session: CheckInSession,
    pub camera: FrameFeedCamera,
    pub feed: FrameFeed,
}

pub fn open_session(api: &Arc<MockApi>) -> Harness {
    let (camera, feed) = FrameFeedCamera::new();
    let session = CheckInSession::open(Arc::new(camera.clone()), resolver(api), session_settings());
    Harness {
        session,
        camera,
        feed,
    }
}

/// Wait (on the paused clock) until the view satisfies `predicate`
pub async fn wait_for_view<F>(session: &CheckInSession, predicate: F) -> SessionView
where
    F: Fn(&SessionView) -> bool,
{
    let mut views = session.subscribe();
    let found = tokio::time::timeout(Duration::from_secs(30), views.wait_for(|v| predicate(v)))
        .await
        .expect("view never reached the expected state")
        .expect("session ended")
        .clone();
    found
}
