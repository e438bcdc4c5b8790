//! Day-pass codes and manually named visitors

use super::{open_session, wait_for_view};
use crate::common::fixtures::{day_pass_validation, settle, DAY_PASS_CODE};
use crate::common::mock_api::MockApi;
use lifthub_checkin::api::{EntryLogRequest, ResolveError};
use lifthub_checkin::session::{Phase, SessionCommand, STATUS_SCANNING};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_day_pass_code_suggests_tagged_name() {
    let api = Arc::new(MockApi::new().with_validation(DAY_PASS_CODE, day_pass_validation(None)));
    let desk = open_session(&api);
    settle().await;

    desk.feed.push(DAY_PASS_CODE);
    let view = wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;

    assert_eq!(
        view.phase,
        Phase::ShowingDayPassPrompt {
            suggested_name: "Ana Gomez".to_string()
        }
    );
    // Nothing is recorded until the operator confirms
    assert!(api.entry_requests().is_empty());

    desk.session
        .send(SessionCommand::ConfirmDayPass { name: None });
    let view = wait_for_view(&desk.session, |v| v.phase.is_timed()).await;

    assert_eq!(
        view.phase,
        Phase::ShowingDayPassRecorded {
            visitor_name: "Ana Gomez".to_string()
        }
    );
    assert_eq!(view.status, "Day pass recorded for Ana Gomez");
    assert!(view.last_entry_at.is_some());
    assert_eq!(
        api.entry_requests(),
        vec![EntryLogRequest::day_pass("Ana Gomez", 7)]
    );

    wait_for_view(&desk.session, |v| v.phase == Phase::Scanning).await;
}

#[tokio::test(start_paused = true)]
async fn test_hyphenated_visitor_name_is_kept_whole() {
    let code = "LIFTHUB-DAYPASS-Mary-Jane Watson";
    let api = Arc::new(MockApi::new().with_validation(code, day_pass_validation(None)));
    let desk = open_session(&api);
    settle().await;

    desk.feed.push(code);
    let view = wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;

    assert_eq!(
        view.phase,
        Phase::ShowingDayPassPrompt {
            suggested_name: "Mary-Jane Watson".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_untagged_day_pass_falls_back_to_server_name() {
    let api = Arc::new(
        MockApi::new().with_validation("DP-0001", day_pass_validation(Some(" Lee Chan "))),
    );
    let desk = open_session(&api);
    settle().await;

    desk.feed.push("DP-0001");
    let view = wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;

    assert_eq!(
        view.phase,
        Phase::ShowingDayPassPrompt {
            suggested_name: "Lee Chan".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_operator_can_correct_the_visitor_name() {
    let api = Arc::new(MockApi::new().with_validation(DAY_PASS_CODE, day_pass_validation(None)));
    let desk = open_session(&api);
    settle().await;

    desk.feed.push(DAY_PASS_CODE);
    wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;
    desk.session.send(SessionCommand::ConfirmDayPass {
        name: Some("  Ana María Gómez ".to_string()),
    });
    wait_for_view(&desk.session, |v| v.phase.is_timed()).await;

    assert_eq!(
        api.entry_requests(),
        vec![EntryLogRequest::day_pass("Ana María Gómez", 7)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unrecognized_code_needs_a_name() {
    let api = Arc::new(MockApi::new());
    let desk = open_session(&api);
    settle().await;

    desk.feed.push("GUEST-CARD-17");
    let view = wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;
    assert_eq!(
        view.phase,
        Phase::ShowingUnrecognizedPrompt {
            raw_text: "GUEST-CARD-17".to_string()
        }
    );

    desk.session
        .send(SessionCommand::ConfirmDayPass { name: None });
    let view = wait_for_view(&desk.session, |v| {
        v.status == "Please enter the visitor's name"
    })
    .await;
    assert!(view.phase.is_prompt());
    assert!(api.entry_requests().is_empty());

    desk.session.send(SessionCommand::ConfirmDayPass {
        name: Some("Walk In".to_string()),
    });
    let view = wait_for_view(&desk.session, |v| v.phase.is_timed()).await;

    assert_eq!(view.status, "Day pass recorded for Walk In");
    assert_eq!(
        api.entry_requests(),
        vec![EntryLogRequest::day_pass("Walk In", 7)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prompt_records_nothing() {
    let api = Arc::new(MockApi::new().with_validation(DAY_PASS_CODE, day_pass_validation(None)));
    let desk = open_session(&api);
    settle().await;

    desk.feed.push(DAY_PASS_CODE);
    wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;
    desk.session.send(SessionCommand::Cancel);
    let view = wait_for_view(&desk.session, |v| v.phase == Phase::Scanning).await;

    assert_eq!(view.status, STATUS_SCANNING);
    settle().await;
    assert!(api.entry_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_day_pass_shows_error() {
    let api = Arc::new(MockApi::new().with_validation(DAY_PASS_CODE, day_pass_validation(None)));
    api.set_entry_response(Err(ResolveError::Network {
        message: "request timed out".to_string(),
    }));
    let desk = open_session(&api);
    settle().await;

    desk.feed.push(DAY_PASS_CODE);
    wait_for_view(&desk.session, |v| v.phase.is_prompt()).await;
    desk.session
        .send(SessionCommand::ConfirmDayPass { name: None });
    let view = wait_for_view(&desk.session, |v| v.phase.is_timed()).await;

    assert!(matches!(view.phase, Phase::ShowingError { .. }));
    assert!(view.last_entry_at.is_none());
    assert_eq!(api.entry_requests().len(), 1);
}
