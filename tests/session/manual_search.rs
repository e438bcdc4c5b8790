//! Manual name search and check-in from the results

use super::{open_session, wait_for_view};
use crate::common::fixtures::{settle, user_match};
use crate::common::mock_api::MockApi;
use lifthub_checkin::api::{EntryLogRequest, ResolveError};
use lifthub_checkin::session::{Phase, SessionCommand};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_short_query_never_reaches_the_server() {
    let api = Arc::new(MockApi::new());
    api.set_search_users(vec![user_match(4, "Jane Doe")]);
    let desk = open_session(&api);
    settle().await;

    desk.session.send(SessionCommand::Search(" j ".to_string()));
    settle().await;

    assert!(api.search_queries().is_empty());
    let view = desk.session.view();
    assert_eq!(view.search_query, " j ");
    assert!(view.search_results.is_empty());
    assert_eq!(view.phase, Phase::Scanning);
}

#[tokio::test(start_paused = true)]
async fn test_search_then_select_checks_the_user_in() {
    let api = Arc::new(MockApi::new());
    api.set_search_users(vec![user_match(4, "Jane Doe"), user_match(9, "Jan Novak")]);
    let desk = open_session(&api);
    settle().await;

    desk.session.send(SessionCommand::Search("ja".to_string()));
    let view = wait_for_view(&desk.session, |v| v.search_results.len() == 2).await;
    assert_eq!(view.phase, Phase::Scanning);
    assert_eq!(api.search_queries(), vec!["ja".to_string()]);

    desk.session.send(SessionCommand::SelectMatch(1));
    let view = wait_for_view(&desk.session, |v| v.phase.is_timed()).await;

    assert_eq!(view.status, "Jan Novak has entered the gym");
    assert_eq!(api.entry_requests(), vec![EntryLogRequest::member(9, 7)]);

    let view = wait_for_view(&desk.session, |v| v.phase == Phase::Scanning).await;
    assert!(view.search_query.is_empty());
    assert!(view.search_results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_select_out_of_range_is_reported() {
    let api = Arc::new(MockApi::new());
    api.set_search_users(vec![user_match(4, "Jane Doe")]);
    let desk = open_session(&api);
    settle().await;

    desk.session.send(SessionCommand::Search("jane".to_string()));
    wait_for_view(&desk.session, |v| v.search_results.len() == 1).await;
    desk.session.send(SessionCommand::SelectMatch(2));
    let view = wait_for_view(&desk.session, |v| v.status == "No search result #3").await;

    assert_eq!(view.phase, Phase::Scanning);
    assert!(api.entry_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_search_failure_while_scanning_shows_error() {
    let api = Arc::new(MockApi::new());
    api.set_search_error(ResolveError::Status { status: 503 });
    let desk = open_session(&api);
    settle().await;

    desk.session.send(SessionCommand::Search("jane".to_string()));
    let view = wait_for_view(&desk.session, |v| v.phase.is_timed()).await;

    assert_eq!(
        view.phase,
        Phase::ShowingError {
            message: "Server error. Please try again.".to_string()
        }
    );
    assert!(view.search_results.is_empty());

    wait_for_view(&desk.session, |v| v.phase == Phase::Scanning).await;
}
