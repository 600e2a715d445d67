//! Drives a session against a mocked HTTP backend.

use std::{sync::Arc, time::Duration};

use mc_api::Client;
use mc_config::AuthMode;
use mc_conversation::Role;
use mc_session::{ChatSession, RecordingView, Screen, SessionConfig, SubmitOutcome};
use mc_test::mock::{self, GET, MockServer, POST};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;

fn setup(server: &MockServer) -> (Arc<RecordingView>, ChatSession) {
    let client = Client::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();
    let view = Arc::new(RecordingView::default());
    let session = ChatSession::new(Arc::new(client), view.clone(), SessionConfig {
        auth_mode: AuthMode::Redirect,
        annotation_delay: Duration::from_millis(10),
        status_poll_interval: None,
    });

    (view, session)
}

#[test(tokio::test)]
async fn test_chat_round_trip() {
    let server = MockServer::start_async().await;
    mock::signed_in(&server, "Ada").await;
    mock::json(
        &server,
        GET,
        mock::CAPABILITIES,
        200,
        json!({ "capabilities": [
            { "name": "calculate", "description": "Arithmetic", "example": "What is 2+2?" }
        ]}),
    )
    .await;
    let chat = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(mock::CHAT)
                .json_body(json!({ "message": "What is 2+2?", "history": [] }));
            then.status(200).json_body(json!({
                "success": true,
                "response": "2 + 2 = **4**",
                "tool_calls": [{ "name": "calculate", "arguments": { "expression": "2+2" } }]
            }));
        })
        .await;

    let (view, session) = setup(&server);
    assert!(session.start().await);

    let example = session.select_capability(0).unwrap().example;
    let outcome = session.submit(&example).await;

    chat.assert_hits_async(1).await;
    let turn = match outcome {
        SubmitOutcome::Answered(turn) => turn,
        outcome => panic!("unexpected outcome: {outcome:?}"),
    };
    assert_eq!(turn.tool_calls[0].name, "calculate");

    let roles: Vec<_> = view.turns().iter().map(|turn| turn.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
}

#[test(tokio::test)]
async fn test_expired_session_returns_to_login() {
    let server = MockServer::start_async().await;
    mock::signed_in(&server, "Ada").await;
    mock::json(&server, GET, mock::CAPABILITIES, 200, json!({ "capabilities": [] })).await;
    mock::unauthorized(&server, POST, mock::CHAT).await;

    let (view, session) = setup(&server);
    session.start().await;
    assert_eq!(view.screen(), Screen::Main);

    session.submit("hello").await;

    assert_eq!(view.screen(), Screen::Login);
    assert!(view.turns().iter().all(|turn| turn.role != Role::Assistant));
    assert!(!session.is_authenticated());
}

#[test(tokio::test)]
async fn test_logout_when_backend_is_down() {
    let server = MockServer::start_async().await;
    mock::signed_in(&server, "Ada").await;
    mock::json(&server, GET, mock::CAPABILITIES, 200, json!({ "capabilities": [] })).await;
    mock::json(&server, POST, mock::CHAT, 200, json!({ "response": "hi" })).await;
    mock::json(&server, POST, mock::AUTH_LOGOUT, 503, json!({ "error": "down" })).await;

    let (view, session) = setup(&server);
    session.start().await;
    session.submit("hello").await;
    assert_eq!(view.turns().len(), 2);

    session.logout().await;

    assert!(view.turns().is_empty());
    assert!(session.transcript().is_empty());
    assert_eq!(view.screen(), Screen::Login);
}
